//! The host program binary.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use sibin_core::{sb_debug, sb_info};
use sibin_elf::{ElfFile, NamedSymbol};

use crate::error::DecodeError;
use crate::options::DecodeOptions;
use crate::shader::ShaderBinary;
use crate::stage::Stage;

/// Suffix of the symbols that point at embedded shader images.
pub const SHADER_SYMBOL_SUFFIX: &str = "ElfBinary_0_";

const SYMTAB: &str = ".symtab";

/// A driver-produced program binary and the shaders embedded in it.
///
/// Borrows the caller's buffer; every shader's ISA and ELF view point into
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramBinary<'a> {
    name: String,
    elf: ElfFile<'a>,
    shaders: Vec<ShaderBinary<'a>>,
}

impl<'a> ProgramBinary<'a> {
    /// Decodes a program binary with the default (lenient) options.
    ///
    /// # Errors
    ///
    /// See [`create_with_options`](Self::create_with_options).
    pub fn create(buffer: &'a [u8], name: &str) -> Result<Self, DecodeError> {
        Self::create_with_options(buffer, name, &DecodeOptions::default())
    }

    /// Decodes a program binary.
    ///
    /// Every symbol whose name ends in [`SHADER_SYMBOL_SUFFIX`] names an
    /// embedded shader image occupying `[st_value, st_value + st_size)` of
    /// section `st_shndx`. Shaders are returned in symbol table order. A
    /// binary without a symbol table has no shaders.
    ///
    /// # Errors
    ///
    /// [`DecodeError::NotElf`] if `buffer` is not an ELF image,
    /// [`DecodeError::TruncatedRecord`] if a shader symbol points outside
    /// its section, and any error from [`ShaderBinary::decode`]. The first
    /// error aborts the whole binary.
    pub fn create_with_options(
        buffer: &'a [u8],
        name: &str,
        options: &DecodeOptions,
    ) -> Result<Self, DecodeError> {
        let elf = ElfFile::parse(buffer)?;

        let mut shaders = Vec::new();
        for (index, sym) in elf
            .named_symbols()
            .enumerate()
            .filter(|(_, sym)| sym.name.ends_with(SHADER_SYMBOL_SUFFIX))
        {
            let image = shader_image(&elf, &sym).ok_or(DecodeError::TruncatedRecord {
                section: SYMTAB,
                index,
            })?;
            sb_debug!(
                "{name}: found {} ({} bytes in section {})",
                sym.name,
                image.len(),
                sym.symbol.st_shndx
            );
            shaders.push(ShaderBinary::decode(image, sym.name, options)?);
        }

        sb_info!("{name}: {} shader(s)", shaders.len());
        Ok(Self {
            name: name.to_string(),
            elf,
            shaders,
        })
    }

    /// Name given at creation.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The host ELF image.
    #[must_use]
    pub fn elf(&self) -> &ElfFile<'a> {
        &self.elf
    }

    /// All shaders, in symbol table order.
    #[must_use]
    pub fn shaders(&self) -> &[ShaderBinary<'a>] {
        &self.shaders
    }

    /// The shader at `index`.
    #[must_use]
    pub fn shader(&self, index: usize) -> Option<&ShaderBinary<'a>> {
        self.shaders.get(index)
    }

    /// Number of shaders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    /// Returns `true` if no shader symbols were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Shaders of one stage, in symbol table order.
    pub fn shaders_by_stage(&self, stage: Stage) -> impl Iterator<Item = &ShaderBinary<'a>> {
        self.shaders.iter().filter(move |s| s.stage() == stage)
    }
}

/// Returns the bytes a shader symbol covers, or `None` if they fall
/// outside the defining section.
fn shader_image<'a>(elf: &ElfFile<'a>, sym: &NamedSymbol<'a>) -> Option<&'a [u8]> {
    let shdr = elf.section_by_index(usize::from(sym.symbol.st_shndx))?;
    let data = elf.section_data(&shdr)?;
    let start = usize::try_from(sym.symbol.st_value).ok()?;
    let size = usize::try_from(sym.symbol.st_size).ok()?;
    data.get(start..start.checked_add(size)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FragmentHeaderBuilder, ProgramImage, ShaderImage, VertexHeaderBuilder};
    use sibin_elf::{ElfClass, ElfError, ElfWriter, SHT_PROGBITS};

    fn vertex_shader() -> Vec<u8> {
        let mut text = VertexHeaderBuilder::new().registers(8, 4).build();
        text.extend_from_slice(&[0u8; 16]);
        ShaderImage::new(0x0).text(&text).build()
    }

    fn fragment_shader() -> Vec<u8> {
        let mut text = FragmentHeaderBuilder::new().registers(16, 8).build();
        text.extend_from_slice(&[0u8; 8]);
        ShaderImage::new(0x4).text(&text).build()
    }

    #[test]
    fn shader_count_matches_marked_symbols() {
        let image = ProgramImage::new()
            .shader("vsElfBinary_0_", &vertex_shader())
            .shader("fsElfBinary_0_", &fragment_shader())
            .symbol("unrelated_symbol")
            .symbol("ElfBinary_0_suffix_not_at_end")
            .build();

        let program = ProgramBinary::create(&image, "prog").unwrap();
        assert_eq!(program.name(), "prog");
        assert_eq!(program.len(), 2);
        assert!(!program.is_empty());
        assert_eq!(program.shader(0).map(ShaderBinary::name), Some("vsElfBinary_0_"));
        assert_eq!(program.shader(1).map(ShaderBinary::stage), Some(Stage::Fragment));
        assert!(program.shader(2).is_none());
    }

    #[test]
    fn shaders_by_stage() {
        let image = ProgramImage::new()
            .shader("aElfBinary_0_", &vertex_shader())
            .shader("bElfBinary_0_", &fragment_shader())
            .shader("cElfBinary_0_", &vertex_shader())
            .build();
        let program = ProgramBinary::create(&image, "prog").unwrap();
        let names: Vec<_> = program.shaders_by_stage(Stage::Vertex).map(ShaderBinary::name).collect();
        assert_eq!(names, ["aElfBinary_0_", "cElfBinary_0_"]);
        assert_eq!(program.shaders_by_stage(Stage::Geometry).count(), 0);
    }

    #[test]
    fn vertex_dictionary_through_program() {
        let image = ProgramImage::new().shader("vsElfBinary_0_", &vertex_shader()).build();
        let program = ProgramBinary::create(&image, "prog").unwrap();
        let dict = program.shaders()[0].dictionary().unwrap();
        assert_eq!((dict.sgpr_used, dict.vgpr_used), (8, 4));
        assert_eq!(program.shaders()[0].isa().unwrap().len(), 16);
    }

    #[test]
    fn no_symbol_table_means_no_shaders() {
        let mut w = ElfWriter::new(ElfClass::Elf32);
        w.section(".data", SHT_PROGBITS, &[0; 8], 0);
        let image = w.finish();
        let program = ProgramBinary::create(&image, "empty").unwrap();
        assert!(program.is_empty());
    }

    #[test]
    fn host_must_be_elf() {
        assert_eq!(
            ProgramBinary::create(&[0x7f, b'E', b'L', b'X', 1, 1], "bad").unwrap_err(),
            DecodeError::NotElf(ElfError::BadMagic)
        );
    }

    #[test]
    fn symbol_outside_its_section() {
        let shader = vertex_shader();
        let mut w = ElfWriter::new(ElfClass::Elf32);
        let data = w.section(".data", SHT_PROGBITS, &shader, 0);
        w.symbol("vsElfBinary_0_", data, 16, shader.len() as u64);
        let image = w.finish();
        assert_eq!(
            ProgramBinary::create(&image, "prog").unwrap_err(),
            DecodeError::TruncatedRecord {
                section: ".symtab",
                index: 1,
            }
        );
    }

    #[test]
    fn embedded_error_aborts_program() {
        let broken = ShaderImage::new(0x0).text(&[0; 10]).build();
        let image = ProgramImage::new()
            .shader("okElfBinary_0_", &vertex_shader())
            .shader("badElfBinary_0_", &broken)
            .build();
        assert!(matches!(
            ProgramBinary::create(&image, "prog"),
            Err(DecodeError::SizeMismatch { section: ".text", .. })
        ));
    }

    #[test]
    fn strict_options_reach_shaders() {
        let mut text = VertexHeaderBuilder::new().build();
        text.extend_from_slice(&[0; 4]);
        let shader = ShaderImage::new(0x0).text(&text).usage_info(&[0; 16]).build();
        let image = ProgramImage::new().shader("vsElfBinary_0_", &shader).build();

        assert!(ProgramBinary::create(&image, "prog").is_ok());
        assert!(matches!(
            ProgramBinary::create_with_options(&image, "prog", &DecodeOptions::strict()),
            Err(DecodeError::SizeMismatch { section: ".usageinfo", .. })
        ));
    }

    #[test]
    fn decoding_is_idempotent() {
        let image = ProgramImage::new()
            .shader("vsElfBinary_0_", &vertex_shader())
            .shader("fsElfBinary_0_", &fragment_shader())
            .build();
        let first = ProgramBinary::create(&image, "prog").unwrap();
        let second = ProgramBinary::create(&image, "prog").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn program_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProgramBinary<'static>>();
        assert_send_sync::<ShaderBinary<'static>>();
    }
}
