//! In-memory ELF image writer.
//!
//! Produces small, well-formed little-endian ELF images with arbitrary
//! sections and an optional static symbol table. Used to build fixtures for
//! the program-binary decoder and the `sibin-dump` integration tests.
//!
//! Layout of the produced image: file header, section payloads (4-byte
//! aligned), `.symtab`, `.strtab`, `.shstrtab`, then the section header
//! table.

use alloc::string::String;
use alloc::vec::Vec;

use crate::header::{ELF_MAGIC, ELFDATA2LSB, ElfClass};
use crate::section::{SHT_STRTAB, SHT_SYMTAB, STB_GLOBAL, STT_OBJECT};

struct PendingSection {
    name: String,
    sh_type: u32,
    data: Vec<u8>,
    entsize: u64,
}

struct PendingSymbol {
    name: String,
    shndx: u16,
    value: u64,
    size: u64,
}

/// Builder for an ELF image.
pub struct ElfWriter {
    class: ElfClass,
    e_flags: u32,
    sections: Vec<PendingSection>,
    symbols: Vec<PendingSymbol>,
}

impl ElfWriter {
    /// Creates a writer for an image of the given class with `e_flags = 0`.
    #[must_use]
    pub fn new(class: ElfClass) -> Self {
        Self {
            class,
            e_flags: 0,
            sections: Vec::new(),
            symbols: Vec::new(),
        }
    }

    /// Sets the processor-specific `e_flags` field.
    pub fn flags(&mut self, e_flags: u32) -> &mut Self {
        self.e_flags = e_flags;
        self
    }

    /// Appends a section and returns its index in the section header table.
    ///
    /// Index 0 is the reserved null section, so the first call returns 1.
    pub fn section(&mut self, name: &str, sh_type: u32, data: &[u8], entsize: u64) -> u16 {
        self.sections.push(PendingSection {
            name: name.into(),
            sh_type,
            data: data.to_vec(),
            entsize,
        });
        u16::try_from(self.sections.len()).unwrap_or(u16::MAX)
    }

    /// Appends a global data symbol defined at `value` within section `shndx`.
    pub fn symbol(&mut self, name: &str, shndx: u16, value: u64, size: u64) -> &mut Self {
        self.symbols.push(PendingSymbol {
            name: name.into(),
            shndx,
            value,
            size,
        });
        self
    }

    /// Serializes the image.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "fixture images are far below 4 GiB"
    )]
    pub fn finish(&self) -> Vec<u8> {
        let class = self.class;
        let mut out = alloc::vec![0u8; class.ehdr_size()];

        // (name, type, offset, size, link, entsize)
        let mut headers: Vec<(u32, u32, u64, u64, u32, u64)> = Vec::new();
        let mut shstrtab: Vec<u8> = alloc::vec![0];
        let intern = |shstrtab: &mut Vec<u8>, name: &str| {
            let off = shstrtab.len() as u32;
            shstrtab.extend_from_slice(name.as_bytes());
            shstrtab.push(0);
            off
        };

        for sec in &self.sections {
            align(&mut out, 4);
            let name = intern(&mut shstrtab, &sec.name);
            headers.push((name, sec.sh_type, out.len() as u64, sec.data.len() as u64, 0, sec.entsize));
            out.extend_from_slice(&sec.data);
        }

        if !self.symbols.is_empty() {
            let symtab_index = headers.len() as u32 + 1;
            let mut strtab: Vec<u8> = alloc::vec![0];
            let mut symtab = alloc::vec![0u8; class.sym_size()];
            for sym in &self.symbols {
                let st_name = strtab.len() as u32;
                strtab.extend_from_slice(sym.name.as_bytes());
                strtab.push(0);
                symtab.extend_from_slice(&encode_symbol(class, st_name, sym));
            }

            align(&mut out, 8);
            let name = intern(&mut shstrtab, ".symtab");
            headers.push((
                name,
                SHT_SYMTAB,
                out.len() as u64,
                symtab.len() as u64,
                symtab_index + 1,
                class.sym_size() as u64,
            ));
            out.extend_from_slice(&symtab);

            let name = intern(&mut shstrtab, ".strtab");
            headers.push((name, SHT_STRTAB, out.len() as u64, strtab.len() as u64, 0, 0));
            out.extend_from_slice(&strtab);
        }

        let name = intern(&mut shstrtab, ".shstrtab");
        let shstrndx = headers.len() as u16 + 1;
        headers.push((name, SHT_STRTAB, out.len() as u64, 0, 0, 0));
        let shstrtab_off = out.len();
        out.extend_from_slice(&shstrtab);
        if let Some(last) = headers.last_mut() {
            last.3 = (out.len() - shstrtab_off) as u64;
        }

        align(&mut out, 8);
        let shoff = out.len() as u64;
        // Null section first.
        out.resize(out.len() + class.shdr_size(), 0);
        for &(name, sh_type, offset, size, link, entsize) in &headers {
            out.extend_from_slice(&encode_shdr(class, name, sh_type, offset, size, link, entsize));
        }

        let shnum = headers.len() as u16 + 1;
        write_ehdr(&mut out, class, self.e_flags, shoff, shnum, shstrndx);
        out
    }
}

fn align(out: &mut Vec<u8>, to: usize) {
    let rem = out.len() % to;
    if rem != 0 {
        out.resize(out.len() + to - rem, 0);
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "ELF32 fields are 32-bit by definition"
)]
fn write_ehdr(out: &mut [u8], class: ElfClass, e_flags: u32, shoff: u64, shnum: u16, shstrndx: u16) {
    out[0..4].copy_from_slice(&ELF_MAGIC);
    out[4] = class.ident_byte();
    out[5] = ELFDATA2LSB;
    out[6] = 1;
    // ET_EXEC
    out[16..18].copy_from_slice(&2u16.to_le_bytes());
    out[20..24].copy_from_slice(&1u32.to_le_bytes());

    let rest = match class {
        ElfClass::Elf32 => {
            out[32..36].copy_from_slice(&(shoff as u32).to_le_bytes());
            36
        }
        ElfClass::Elf64 => {
            out[40..48].copy_from_slice(&shoff.to_le_bytes());
            48
        }
    };
    out[rest..rest + 4].copy_from_slice(&e_flags.to_le_bytes());
    out[rest + 4..rest + 6].copy_from_slice(&(class.ehdr_size() as u16).to_le_bytes());
    out[rest + 10..rest + 12].copy_from_slice(&(class.shdr_size() as u16).to_le_bytes());
    out[rest + 12..rest + 14].copy_from_slice(&shnum.to_le_bytes());
    out[rest + 14..rest + 16].copy_from_slice(&shstrndx.to_le_bytes());
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "ELF32 fields are 32-bit by definition"
)]
fn encode_shdr(
    class: ElfClass,
    name: u32,
    sh_type: u32,
    offset: u64,
    size: u64,
    link: u32,
    entsize: u64,
) -> Vec<u8> {
    let mut b = alloc::vec![0u8; class.shdr_size()];
    b[0..4].copy_from_slice(&name.to_le_bytes());
    b[4..8].copy_from_slice(&sh_type.to_le_bytes());
    match class {
        ElfClass::Elf32 => {
            b[16..20].copy_from_slice(&(offset as u32).to_le_bytes());
            b[20..24].copy_from_slice(&(size as u32).to_le_bytes());
            b[24..28].copy_from_slice(&link.to_le_bytes());
            b[32..36].copy_from_slice(&1u32.to_le_bytes());
            b[36..40].copy_from_slice(&(entsize as u32).to_le_bytes());
        }
        ElfClass::Elf64 => {
            b[24..32].copy_from_slice(&offset.to_le_bytes());
            b[32..40].copy_from_slice(&size.to_le_bytes());
            b[40..44].copy_from_slice(&link.to_le_bytes());
            b[48..56].copy_from_slice(&1u64.to_le_bytes());
            b[56..64].copy_from_slice(&entsize.to_le_bytes());
        }
    }
    b
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "ELF32 fields are 32-bit by definition"
)]
fn encode_symbol(class: ElfClass, st_name: u32, sym: &PendingSymbol) -> Vec<u8> {
    let st_info = (STB_GLOBAL << 4) | STT_OBJECT;
    let mut b = alloc::vec![0u8; class.sym_size()];
    b[0..4].copy_from_slice(&st_name.to_le_bytes());
    match class {
        ElfClass::Elf32 => {
            b[4..8].copy_from_slice(&(sym.value as u32).to_le_bytes());
            b[8..12].copy_from_slice(&(sym.size as u32).to_le_bytes());
            b[12] = st_info;
            b[14..16].copy_from_slice(&sym.shndx.to_le_bytes());
        }
        ElfClass::Elf64 => {
            b[4] = st_info;
            b[6..8].copy_from_slice(&sym.shndx.to_le_bytes());
            b[8..16].copy_from_slice(&sym.value.to_le_bytes());
            b[16..24].copy_from_slice(&sym.size.to_le_bytes());
        }
    }
    b
}
