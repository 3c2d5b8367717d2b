//! Stage-specific metadata headers stored at the start of `.text`.
//!
//! Both headers open with the same common prefix:
//!
//! | Offset | Field |
//! |-------:|-------|
//! | 0      | `size_in_bytes` |
//! | 4      | `code_len_in_bytes` |
//! | 8      | `user_element_count` |
//! | 12     | `user_elements[16]` (16 bytes each) |
//! | 268    | `vgpr_count` |
//! | 272    | `sgpr_count` |
//! | 276    | `float_mode` |
//! | 280    | `flags` |
//!
//! The stage-specific tail starts at offset 284. Bytes between the last
//! decoded field and the end of the header are reserved and ignored.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use sibin_core::{ByteReader, sb_warn};

use crate::error::DecodeError;
use crate::options::DecodeOptions;
use crate::stage::{FRAGMENT_ISA_OFFSET, Stage, VERTEX_ISA_OFFSET};

/// Capacity of the user element array in either header.
pub const MAX_USER_ELEMENTS: usize = 16;

/// Capacity of each semantic mapping array.
pub const MAX_SEMANTICS: usize = 32;

const TEXT: &str = ".text";

bitflags::bitflags! {
    /// Execution-mode bits in the common header `flags` word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderFlags: u32 {
        /// IEEE-compliant float mode.
        const IEEE_MODE        = 1 << 0;
        /// Reads the primitive id.
        const USES_PRIM_ID     = 1 << 1;
        /// Reads the vertex id.
        const USES_VERTEX_ID   = 1 << 2;
        /// Reads the instance id.
        const USES_INSTANCE_ID = 1 << 3;
        /// Needs scratch memory.
        const USES_SCRATCH     = 1 << 4;
        /// May discard fragments.
        const USES_KILL        = 1 << 5;
        /// Exports depth.
        const WRITES_DEPTH     = 1 << 6;
    }
}

/// A user data element loaded into scalar registers before launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UserElement {
    /// Kind of data (resource, sampler, constant buffer, ...).
    pub data_class: u32,
    /// API slot the data is bound to.
    pub api_slot: u32,
    /// First user SGPR the element occupies.
    pub start_user_reg: u32,
    /// Number of consecutive user SGPRs.
    pub user_reg_count: u32,
}

/// Vertex input semantic: which VGPRs receive a fetched attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InputSemantic {
    /// Semantic usage id.
    pub usage: u32,
    /// Index within the usage.
    pub usage_index: u32,
    /// First destination VGPR.
    pub data_vgpr: u32,
    /// Number of components.
    pub data_size: u32,
}

/// Vertex output semantic: which export parameter carries an output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OutputSemantic {
    /// Semantic usage id.
    pub usage: u32,
    /// Index within the usage.
    pub usage_index: u32,
    /// Export parameter index.
    pub param_index: u32,
}

/// Fragment input semantic: which interpolated input feeds a usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FragmentInputSemantic {
    /// Semantic usage id.
    pub usage: u32,
    /// Index within the usage.
    pub usage_index: u32,
    /// Interpolated input slot.
    pub input_index: u32,
    /// Interpolation mode.
    pub interp_mode: u32,
}

/// Fields shared by every stage header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CommonHeader {
    /// Header size recorded by the driver.
    pub size_in_bytes: u32,
    /// ISA length recorded by the driver.
    pub code_len_in_bytes: u32,
    /// The first `user_element_count` user elements.
    pub user_elements: Vec<UserElement>,
    /// Vector registers used.
    pub vgpr_count: u32,
    /// Scalar registers used.
    pub sgpr_count: u32,
    /// Float rounding/denorm mode.
    pub float_mode: u32,
    /// Execution-mode bits. Unknown bits are retained.
    pub flags: ShaderFlags,
}

impl CommonHeader {
    /// Byte length of the common prefix.
    pub const SIZE: usize = 284;

    fn parse(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let size_in_bytes = read_u32(r)?;
        let code_len_in_bytes = read_u32(r)?;
        let user_element_count = read_count(r, MAX_USER_ELEMENTS, "user element count exceeds 16")?;

        let mut user_elements = Vec::with_capacity(user_element_count);
        for i in 0..MAX_USER_ELEMENTS {
            let [data_class, api_slot, start_user_reg, user_reg_count] = read_words::<4>(r)?;
            if i < user_element_count {
                user_elements.push(UserElement {
                    data_class,
                    api_slot,
                    start_user_reg,
                    user_reg_count,
                });
            }
        }

        Ok(Self {
            size_in_bytes,
            code_len_in_bytes,
            user_elements,
            vgpr_count: read_u32(r)?,
            sgpr_count: read_u32(r)?,
            float_mode: read_u32(r)?,
            flags: ShaderFlags::from_bits_retain(read_u32(r)?),
        })
    }
}

/// Vertex shader header (2124 bytes).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexMetadata {
    /// Common prefix.
    pub common: CommonHeader,
    /// The first `input_semantic_count` input semantics.
    pub input_semantics: Vec<InputSemantic>,
    /// The first `output_semantic_count` output semantics.
    pub output_semantics: Vec<OutputSemantic>,
    /// `SPI_SHADER_PGM_RSRC2_VS` register value.
    pub pgm_rsrc2: u32,
    /// `PA_CL_VS_OUT_CNTL` register value.
    pub pa_cl_vs_out_cntl: u32,
    /// `SPI_VS_OUT_CONFIG` register value.
    pub spi_vs_out_config: u32,
    /// `SPI_SHADER_POS_FORMAT` register value.
    pub spi_shader_pos_format: u32,
    /// `VGT_STRMOUT_CONFIG` register value.
    pub vgt_strmout_config: u32,
}

impl VertexMetadata {
    /// Size of the header, equal to the vertex ISA offset.
    pub const SIZE: usize = VERTEX_ISA_OFFSET;

    /// Decodes the header from the start of a vertex `.text` section.
    ///
    /// # Errors
    ///
    /// [`DecodeError::SizeMismatch`] if `text` is shorter than the header,
    /// [`DecodeError::MalformedSection`] if a count exceeds its array.
    pub fn decode(text: &[u8]) -> Result<Self, DecodeError> {
        if text.len() < Self::SIZE {
            return Err(DecodeError::SizeMismatch {
                section: TEXT,
                expected: Self::SIZE,
                actual: text.len(),
            });
        }

        let mut r = ByteReader::new(&text[..Self::SIZE]);
        let common = CommonHeader::parse(&mut r)?;

        let in_count = read_count(&mut r, MAX_SEMANTICS, "input semantic count exceeds 32")?;
        let mut input_semantics = Vec::with_capacity(in_count);
        for i in 0..MAX_SEMANTICS {
            let [usage, usage_index, data_vgpr, data_size] = read_words::<4>(&mut r)?;
            if i < in_count {
                input_semantics.push(InputSemantic {
                    usage,
                    usage_index,
                    data_vgpr,
                    data_size,
                });
            }
        }

        let out_count = read_count(&mut r, MAX_SEMANTICS, "output semantic count exceeds 32")?;
        let mut output_semantics = Vec::with_capacity(out_count);
        for i in 0..MAX_SEMANTICS {
            let [usage, usage_index, param_index] = read_words::<3>(&mut r)?;
            if i < out_count {
                output_semantics.push(OutputSemantic {
                    usage,
                    usage_index,
                    param_index,
                });
            }
        }

        Ok(Self {
            common,
            input_semantics,
            output_semantics,
            pgm_rsrc2: read_u32(&mut r)?,
            pa_cl_vs_out_cntl: read_u32(&mut r)?,
            spi_vs_out_config: read_u32(&mut r)?,
            spi_shader_pos_format: read_u32(&mut r)?,
            vgt_strmout_config: read_u32(&mut r)?,
        })
    }

    /// Scalar registers used.
    #[must_use]
    pub fn sgpr_count(&self) -> u32 {
        self.common.sgpr_count
    }

    /// Vector registers used.
    #[must_use]
    pub fn vgpr_count(&self) -> u32 {
        self.common.vgpr_count
    }
}

/// Fragment shader header (3436 bytes).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FragmentMetadata {
    /// Common prefix.
    pub common: CommonHeader,
    /// The first `input_semantic_count` input semantics.
    pub input_semantics: Vec<FragmentInputSemantic>,
    /// `SPI_PS_INPUT_CNTL_n` register values.
    pub spi_ps_input_cntl: [u32; MAX_SEMANTICS],
    /// `SPI_SHADER_PGM_RSRC2_PS` register value.
    pub pgm_rsrc2: u32,
    /// `SPI_PS_INPUT_ENA` register value.
    pub spi_ps_input_ena: u32,
    /// `SPI_PS_INPUT_ADDR` register value.
    pub spi_ps_input_addr: u32,
    /// `SPI_SHADER_Z_FORMAT` register value.
    pub spi_shader_z_format: u32,
    /// `SPI_SHADER_COL_FORMAT` register value.
    pub spi_shader_col_format: u32,
    /// `CB_SHADER_MASK` register value.
    pub cb_shader_mask: u32,
    /// `DB_SHADER_CONTROL` register value.
    pub db_shader_control: u32,
}

impl FragmentMetadata {
    /// Size of the header, equal to the fragment ISA offset.
    pub const SIZE: usize = FRAGMENT_ISA_OFFSET;

    /// Decodes the header from the start of a fragment `.text` section.
    ///
    /// Stock drivers emit fragment `.text` sections that do not always
    /// cover the whole header, so by default a short section is accepted
    /// and the missing fields read as zero. With
    /// [`DecodeOptions::strict_fragment_header`] it is rejected instead.
    ///
    /// # Errors
    ///
    /// [`DecodeError::SizeMismatch`] for a short section in strict mode,
    /// [`DecodeError::MalformedSection`] if a count exceeds its array.
    pub fn decode(text: &[u8], options: &DecodeOptions) -> Result<Self, DecodeError> {
        if text.len() >= Self::SIZE {
            return Self::parse(&text[..Self::SIZE]);
        }
        if options.strict_fragment_header {
            return Err(DecodeError::SizeMismatch {
                section: TEXT,
                expected: Self::SIZE,
                actual: text.len(),
            });
        }
        sb_warn!(
            "fragment .text is {} bytes, shorter than the {}-byte header; zero-filling",
            text.len(),
            Self::SIZE
        );
        let mut padded = vec![0u8; Self::SIZE];
        padded[..text.len()].copy_from_slice(text);
        Self::parse(&padded)
    }

    fn parse(header: &[u8]) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(header);
        let common = CommonHeader::parse(&mut r)?;

        let in_count = read_count(&mut r, MAX_SEMANTICS, "input semantic count exceeds 32")?;
        let mut input_semantics = Vec::with_capacity(in_count);
        for i in 0..MAX_SEMANTICS {
            let [usage, usage_index, input_index, interp_mode] = read_words::<4>(&mut r)?;
            if i < in_count {
                input_semantics.push(FragmentInputSemantic {
                    usage,
                    usage_index,
                    input_index,
                    interp_mode,
                });
            }
        }

        Ok(Self {
            common,
            input_semantics,
            spi_ps_input_cntl: read_words(&mut r)?,
            pgm_rsrc2: read_u32(&mut r)?,
            spi_ps_input_ena: read_u32(&mut r)?,
            spi_ps_input_addr: read_u32(&mut r)?,
            spi_shader_z_format: read_u32(&mut r)?,
            spi_shader_col_format: read_u32(&mut r)?,
            cb_shader_mask: read_u32(&mut r)?,
            db_shader_control: read_u32(&mut r)?,
        })
    }
}

/// Decoded stage header. The variant always matches the shader's [`Stage`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Metadata {
    /// Vertex header.
    Vertex(Box<VertexMetadata>),
    /// Fragment header.
    Fragment(Box<FragmentMetadata>),
    /// No header: the stage was not recognized.
    #[default]
    Invalid,
}

impl Metadata {
    /// Decodes the header for `stage` from a `.text` section.
    ///
    /// Geometry has no known header layout and, like [`Stage::Invalid`],
    /// yields [`Metadata::Invalid`]. The classifier never produces it.
    ///
    /// # Errors
    ///
    /// See [`VertexMetadata::decode`] and [`FragmentMetadata::decode`].
    pub fn decode(stage: Stage, text: &[u8], options: &DecodeOptions) -> Result<Self, DecodeError> {
        Ok(match stage {
            Stage::Vertex => Self::Vertex(Box::new(VertexMetadata::decode(text)?)),
            Stage::Fragment => Self::Fragment(Box::new(FragmentMetadata::decode(text, options)?)),
            Stage::Geometry | Stage::Invalid => Self::Invalid,
        })
    }

    /// The stage this header belongs to.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Vertex(_) => Stage::Vertex,
            Self::Fragment(_) => Stage::Fragment,
            Self::Invalid => Stage::Invalid,
        }
    }

    /// The common prefix, if a header was decoded.
    #[must_use]
    pub fn common(&self) -> Option<&CommonHeader> {
        match self {
            Self::Vertex(vs) => Some(&vs.common),
            Self::Fragment(fs) => Some(&fs.common),
            Self::Invalid => None,
        }
    }

    /// Returns the vertex header, if this is one.
    #[must_use]
    pub fn as_vertex(&self) -> Option<&VertexMetadata> {
        match self {
            Self::Vertex(vs) => Some(vs),
            _ => None,
        }
    }

    /// Returns the fragment header, if this is one.
    #[must_use]
    pub fn as_fragment(&self) -> Option<&FragmentMetadata> {
        match self {
            Self::Fragment(fs) => Some(fs),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

// Callers slice the input to the full header size first, so running out of
// bytes here means the layout constants disagree with the header size.
fn read_u32(r: &mut ByteReader<'_>) -> Result<u32, DecodeError> {
    r.read_u32().ok_or(DecodeError::TruncatedRecord {
        section: TEXT,
        index: 0,
    })
}

fn read_words<const N: usize>(r: &mut ByteReader<'_>) -> Result<[u32; N], DecodeError> {
    r.read_u32_array().ok_or(DecodeError::TruncatedRecord {
        section: TEXT,
        index: 0,
    })
}

fn read_count(r: &mut ByteReader<'_>, max: usize, reason: &'static str) -> Result<usize, DecodeError> {
    let count = read_u32(r)? as usize;
    if count > max {
        return Err(DecodeError::MalformedSection {
            section: TEXT,
            reason,
        });
    }
    Ok(count)
}
