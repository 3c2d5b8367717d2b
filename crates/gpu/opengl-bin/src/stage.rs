//! Shader stage classification.

use core::fmt;

/// `e_flags` value of an embedded vertex shader image.
pub const VERTEX_FLAGS: u32 = 0x0;

/// `e_flags` value of an embedded fragment shader image.
pub const FRAGMENT_FLAGS: u32 = 0x4;

/// Size of the vertex metadata header at the start of `.text`.
pub const VERTEX_ISA_OFFSET: usize = 2124;

/// Size of the fragment metadata header at the start of `.text`.
pub const FRAGMENT_ISA_OFFSET: usize = 3436;

/// Size of the geometry metadata header at the start of `.text`.
pub const GEOMETRY_ISA_OFFSET: usize = 3976;

/// Pipeline role of an embedded shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Vertex shader.
    Vertex,
    /// Fragment (pixel) shader.
    Fragment,
    /// Geometry shader. No `e_flags` value maps here yet.
    Geometry,
    /// Unrecognized `e_flags`; the shader is carried but not decoded.
    Invalid,
}

impl Stage {
    /// Classifies an embedded shader image by its `e_flags` field.
    ///
    /// Unknown values are not an error: they yield [`Stage::Invalid`].
    #[must_use]
    pub const fn from_flags(e_flags: u32) -> Self {
        match e_flags {
            VERTEX_FLAGS => Self::Vertex,
            FRAGMENT_FLAGS => Self::Fragment,
            _ => Self::Invalid,
        }
    }

    /// Byte offset of the ISA within `.text`, i.e. the size of this stage's
    /// fixed metadata header. `0` for [`Stage::Invalid`].
    #[must_use]
    pub const fn isa_offset(self) -> usize {
        match self {
            Self::Vertex => VERTEX_ISA_OFFSET,
            Self::Fragment => FRAGMENT_ISA_OFFSET,
            Self::Geometry => GEOMETRY_ISA_OFFSET,
            Self::Invalid => 0,
        }
    }

    /// Returns `true` for every stage except [`Stage::Invalid`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Geometry => "geometry",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_known_flags() {
        assert_eq!(Stage::from_flags(0x0), Stage::Vertex);
        assert_eq!(Stage::from_flags(0x4), Stage::Fragment);
    }

    #[test]
    fn classify_unknown_flags_as_invalid() {
        for flags in [0x1, 0x2, 0x3, 0x5, 0x8, 0xffff_ffff] {
            assert_eq!(Stage::from_flags(flags), Stage::Invalid, "flags {flags:#x}");
        }
    }

    #[test]
    fn isa_offsets() {
        assert_eq!(Stage::Vertex.isa_offset(), 2124);
        assert_eq!(Stage::Fragment.isa_offset(), 3436);
        assert_eq!(Stage::Geometry.isa_offset(), 3976);
        assert_eq!(Stage::Invalid.isa_offset(), 0);
    }

    #[test]
    fn validity_and_names() {
        assert!(Stage::Geometry.is_valid());
        assert!(!Stage::Invalid.is_valid());
        assert_eq!(Stage::Fragment.to_string(), "fragment");
    }
}
