//! ELF file header parsing.
//!
//! Parses the ELF32 and ELF64 file headers from raw byte slices using safe
//! field extraction via `from_le_bytes()`. Only little-endian images are
//! accepted; GPU driver binaries are never big-endian.

use core::fmt;

/// ELF magic bytes: `\x7fELF`.
pub(crate) const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// ELF class: 32-bit.
pub(crate) const ELFCLASS32: u8 = 1;

/// ELF class: 64-bit.
pub(crate) const ELFCLASS64: u8 = 2;

/// ELF data encoding: little-endian.
pub(crate) const ELFDATA2LSB: u8 = 1;

/// Size of an ELF32 file header (52 bytes).
pub(crate) const ELF32_EHDR_SIZE: usize = 52;

/// Size of an ELF64 file header (64 bytes).
pub(crate) const ELF64_EHDR_SIZE: usize = 64;

/// Read a little-endian `u16` from `data` at byte offset `off`.
///
/// # Panics
///
/// Panics if `off + 2 > data.len()`. Callers must bounds-check first.
pub(crate) fn le_u16(data: &[u8], off: usize) -> u16 {
    u16::from_le_bytes(*data[off..].first_chunk().unwrap())
}

/// Read a little-endian `u32` from `data` at byte offset `off`.
pub(crate) fn le_u32(data: &[u8], off: usize) -> u32 {
    u32::from_le_bytes(*data[off..].first_chunk().unwrap())
}

/// Read a little-endian `u64` from `data` at byte offset `off`.
pub(crate) fn le_u64(data: &[u8], off: usize) -> u64 {
    u64::from_le_bytes(*data[off..].first_chunk().unwrap())
}

/// Errors that can occur when parsing an ELF image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfError {
    /// The image does not start with the ELF magic bytes.
    BadMagic,
    /// The ELF class byte is neither `ELFCLASS32` nor `ELFCLASS64`.
    UnsupportedClass,
    /// The ELF image is not little-endian.
    UnsupportedEncoding,
    /// The input data is too short for the declared structure.
    Truncated,
    /// A header offset or size is out of bounds.
    InvalidOffset,
}

impl fmt::Display for ElfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic => write!(f, "invalid ELF magic bytes"),
            Self::UnsupportedClass => write!(f, "unsupported ELF class"),
            Self::UnsupportedEncoding => {
                write!(f, "unsupported data encoding (expected little-endian)")
            }
            Self::Truncated => write!(f, "input data truncated"),
            Self::InvalidOffset => write!(f, "invalid header offset or size"),
        }
    }
}

/// Word size of an ELF image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElfClass {
    /// `ELFCLASS32`: 32-bit offsets, addresses and sizes.
    Elf32,
    /// `ELFCLASS64`: 64-bit offsets, addresses and sizes.
    Elf64,
}

impl ElfClass {
    /// Size of the file header for this class.
    #[must_use]
    pub const fn ehdr_size(self) -> usize {
        match self {
            Self::Elf32 => ELF32_EHDR_SIZE,
            Self::Elf64 => ELF64_EHDR_SIZE,
        }
    }

    /// Size of one section header entry for this class.
    #[must_use]
    pub const fn shdr_size(self) -> usize {
        match self {
            Self::Elf32 => 40,
            Self::Elf64 => 64,
        }
    }

    /// Size of one symbol table entry for this class.
    #[must_use]
    pub const fn sym_size(self) -> usize {
        match self {
            Self::Elf32 => 16,
            Self::Elf64 => 24,
        }
    }

    /// The `EI_CLASS` identification byte.
    #[must_use]
    pub const fn ident_byte(self) -> u8 {
        match self {
            Self::Elf32 => ELFCLASS32,
            Self::Elf64 => ELFCLASS64,
        }
    }
}

/// Parsed ELF file header, widened to 64-bit fields for both classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfHeader {
    /// Word size of the image.
    pub class: ElfClass,
    /// ELF type (`ET_EXEC`, `ET_DYN`, ...). Not validated.
    pub e_type: u16,
    /// Target machine architecture. Not validated.
    pub e_machine: u16,
    /// Virtual address of the entry point.
    pub e_entry: u64,
    /// Processor-specific flags. Shader images encode their stage here.
    pub e_flags: u32,
    /// Offset of the program header table in the file.
    pub e_phoff: u64,
    /// Number of program header entries.
    pub e_phnum: u16,
    /// Size of each program header entry.
    pub e_phentsize: u16,
    /// Offset of the section header table in the file.
    pub e_shoff: u64,
    /// Size of each section header entry.
    pub e_shentsize: u16,
    /// Number of section header entries.
    pub e_shnum: u16,
    /// Section header string table index.
    pub e_shstrndx: u16,
}

impl ElfHeader {
    /// Parse an ELF file header from raw bytes.
    ///
    /// Validates the magic, class and encoding, and that the section header
    /// table fits within `data`. Machine and type are left to the caller:
    /// driver-produced images use vendor-specific values for both.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError`] if validation fails or the data is too short.
    #[expect(clippy::similar_names, reason = "ELF spec naming convention")]
    pub fn parse(data: &[u8]) -> Result<Self, ElfError> {
        if data.len() < 6 {
            return Err(ElfError::Truncated);
        }

        if data[..4] != ELF_MAGIC {
            return Err(ElfError::BadMagic);
        }

        let class = match data[4] {
            ELFCLASS32 => ElfClass::Elf32,
            ELFCLASS64 => ElfClass::Elf64,
            _ => return Err(ElfError::UnsupportedClass),
        };

        if data[5] != ELFDATA2LSB {
            return Err(ElfError::UnsupportedEncoding);
        }

        if data.len() < class.ehdr_size() {
            return Err(ElfError::Truncated);
        }

        let e_type = le_u16(data, 16);
        let e_machine = le_u16(data, 18);

        // Offsets differ only in the width of entry/phoff/shoff.
        let (e_entry, e_phoff, e_shoff, rest) = match class {
            ElfClass::Elf32 => (
                u64::from(le_u32(data, 24)),
                u64::from(le_u32(data, 28)),
                u64::from(le_u32(data, 32)),
                36,
            ),
            ElfClass::Elf64 => (le_u64(data, 24), le_u64(data, 32), le_u64(data, 40), 48),
        };
        let e_flags = le_u32(data, rest);
        // e_ehsize at rest + 4, skipped
        let e_phentsize = le_u16(data, rest + 6);
        let e_phnum = le_u16(data, rest + 8);
        let e_shentsize = le_u16(data, rest + 10);
        let e_shnum = le_u16(data, rest + 12);
        let e_shstrndx = le_u16(data, rest + 14);

        // Validate section header table bounds (if present)
        if e_shnum > 0 {
            if (e_shentsize as usize) < class.shdr_size() {
                return Err(ElfError::InvalidOffset);
            }
            let sh_end = e_shoff
                .checked_add(u64::from(e_shnum) * u64::from(e_shentsize))
                .ok_or(ElfError::InvalidOffset)?;
            if sh_end > data.len() as u64 {
                return Err(ElfError::InvalidOffset);
            }
        }

        Ok(Self {
            class,
            e_type,
            e_machine,
            e_entry,
            e_flags,
            e_phoff,
            e_phnum,
            e_phentsize,
            e_shoff,
            e_shentsize,
            e_shnum,
            e_shstrndx,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a minimal valid ELF header with no sections.
    ///
    /// Defaults: `ET_EXEC`, machine 0, entry 0, `e_flags` as given.
    pub(crate) fn make_elf_header(class: ElfClass, e_flags: u32) -> Vec<u8> {
        let size = class.ehdr_size();
        let mut buf = vec![0u8; size];

        buf[0..4].copy_from_slice(&ELF_MAGIC);
        buf[4] = class.ident_byte();
        buf[5] = ELFDATA2LSB;
        buf[6] = 1;
        buf[16..18].copy_from_slice(&2u16.to_le_bytes());
        buf[20..24].copy_from_slice(&1u32.to_le_bytes());

        let rest = match class {
            ElfClass::Elf32 => 36,
            ElfClass::Elf64 => 48,
        };
        buf[rest..rest + 4].copy_from_slice(&e_flags.to_le_bytes());
        buf[rest + 4..rest + 6].copy_from_slice(&(size as u16).to_le_bytes());
        buf[rest + 10..rest + 12].copy_from_slice(&(class.shdr_size() as u16).to_le_bytes());

        buf
    }

    #[test]
    fn parse_valid_elf32_header() {
        let buf = make_elf_header(ElfClass::Elf32, 0x4);
        let hdr = ElfHeader::parse(&buf).expect("valid header");
        assert_eq!(hdr.class, ElfClass::Elf32);
        assert_eq!(hdr.e_type, 2);
        assert_eq!(hdr.e_flags, 0x4);
        assert_eq!(hdr.e_shnum, 0);
        assert_eq!(hdr.e_shentsize, 40);
    }

    #[test]
    fn parse_valid_elf64_header() {
        let buf = make_elf_header(ElfClass::Elf64, 0);
        let hdr = ElfHeader::parse(&buf).expect("valid header");
        assert_eq!(hdr.class, ElfClass::Elf64);
        assert_eq!(hdr.e_flags, 0);
        assert_eq!(hdr.e_shentsize, 64);
    }

    #[test]
    fn flags_read_from_class_specific_offset() {
        let mut buf = make_elf_header(ElfClass::Elf64, 0);
        buf[48..52].copy_from_slice(&0xdead_beefu32.to_le_bytes());
        assert_eq!(ElfHeader::parse(&buf).unwrap().e_flags, 0xdead_beef);

        let mut buf = make_elf_header(ElfClass::Elf32, 0);
        buf[36..40].copy_from_slice(&0x1234u32.to_le_bytes());
        assert_eq!(ElfHeader::parse(&buf).unwrap().e_flags, 0x1234);
    }

    #[test]
    fn reject_bad_magic() {
        let mut buf = make_elf_header(ElfClass::Elf32, 0);
        buf[0] = 0x00;
        assert_eq!(ElfHeader::parse(&buf), Err(ElfError::BadMagic));
    }

    #[test]
    fn reject_unknown_class() {
        let mut buf = make_elf_header(ElfClass::Elf32, 0);
        buf[4] = 3;
        assert_eq!(ElfHeader::parse(&buf), Err(ElfError::UnsupportedClass));
    }

    #[test]
    fn reject_big_endian() {
        let mut buf = make_elf_header(ElfClass::Elf64, 0);
        buf[5] = 2; // ELFDATA2MSB
        assert_eq!(ElfHeader::parse(&buf), Err(ElfError::UnsupportedEncoding));
    }

    #[test]
    fn reject_truncated_data() {
        let buf = make_elf_header(ElfClass::Elf64, 0);
        assert_eq!(ElfHeader::parse(&buf[..40]), Err(ElfError::Truncated));
        assert_eq!(ElfHeader::parse(&[]), Err(ElfError::Truncated));
    }

    #[test]
    fn reject_shdr_out_of_bounds() {
        let mut buf = make_elf_header(ElfClass::Elf32, 0);
        // Claim one section header without providing its bytes.
        buf[32..36].copy_from_slice(&52u32.to_le_bytes());
        buf[48..50].copy_from_slice(&1u16.to_le_bytes());
        assert_eq!(ElfHeader::parse(&buf), Err(ElfError::InvalidOffset));
    }

    #[test]
    fn reject_short_shentsize() {
        let mut buf = make_elf_header(ElfClass::Elf64, 0);
        buf.resize(64 + 64, 0);
        buf[40..48].copy_from_slice(&64u64.to_le_bytes());
        buf[58..60].copy_from_slice(&16u16.to_le_bytes());
        buf[60..62].copy_from_slice(&1u16.to_le_bytes());
        assert_eq!(ElfHeader::parse(&buf), Err(ElfError::InvalidOffset));
    }

    #[test]
    fn display_errors() {
        let errors = [
            ElfError::BadMagic,
            ElfError::UnsupportedClass,
            ElfError::UnsupportedEncoding,
            ElfError::Truncated,
            ElfError::InvalidOffset,
        ];
        for err in &errors {
            let msg = format!("{err}");
            assert!(!msg.is_empty());
        }
    }
}
