//! Section header, symbol table, and string table parsing.
//!
//! Provides zero-copy, zero-allocation parsing of section headers, symbol
//! tables (`.symtab`), and string tables (`.strtab`) from raw byte slices,
//! for both ELF classes.

use crate::file::ElfFile;
use crate::header::{ElfClass, le_u16, le_u32, le_u64};

/// Section type: inactive header.
pub const SHT_NULL: u32 = 0;

/// Section type: program-defined contents.
pub const SHT_PROGBITS: u32 = 1;

/// Section type: symbol table.
pub const SHT_SYMTAB: u32 = 2;

/// Section type: string table.
pub const SHT_STRTAB: u32 = 3;

/// Section type: occupies no file space.
pub const SHT_NOBITS: u32 = 8;

/// Section type: dynamic symbol table.
pub const SHT_DYNSYM: u32 = 11;

/// Symbol type: data object.
pub const STT_OBJECT: u8 = 1;

/// Symbol binding: global.
pub const STB_GLOBAL: u8 = 1;

/// Special section index: undefined.
pub const SHN_UNDEF: u16 = 0;

/// Parsed section header entry, widened to 64-bit fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    /// Offset into the section header string table for this section's name.
    pub sh_name: u32,
    /// Section type (`SHT_SYMTAB`, `SHT_STRTAB`, etc.).
    pub sh_type: u32,
    /// Section flags.
    pub sh_flags: u64,
    /// Virtual address of the section in memory (0 for non-loaded sections).
    pub sh_addr: u64,
    /// File offset of the section data.
    pub sh_offset: u64,
    /// Size of the section data in bytes.
    pub sh_size: u64,
    /// Associated section index (e.g., `.strtab` index for `.symtab`).
    pub sh_link: u32,
    /// Extra info (interpretation depends on section type).
    pub sh_info: u32,
    /// Required alignment of the section.
    pub sh_addralign: u64,
    /// Size of each entry. Some producers repurpose it as an entry count.
    pub sh_entsize: u64,
}

impl SectionHeader {
    /// Parse a section header from raw bytes at the given file offset.
    ///
    /// The caller must ensure `file_offset + class.shdr_size() <= data.len()`.
    pub(crate) fn parse(data: &[u8], file_offset: usize, class: ElfClass) -> Self {
        let b = &data[file_offset..];
        match class {
            ElfClass::Elf32 => Self {
                sh_name: le_u32(b, 0),
                sh_type: le_u32(b, 4),
                sh_flags: u64::from(le_u32(b, 8)),
                sh_addr: u64::from(le_u32(b, 12)),
                sh_offset: u64::from(le_u32(b, 16)),
                sh_size: u64::from(le_u32(b, 20)),
                sh_link: le_u32(b, 24),
                sh_info: le_u32(b, 28),
                sh_addralign: u64::from(le_u32(b, 32)),
                sh_entsize: u64::from(le_u32(b, 36)),
            },
            ElfClass::Elf64 => Self {
                sh_name: le_u32(b, 0),
                sh_type: le_u32(b, 4),
                sh_flags: le_u64(b, 8),
                sh_addr: le_u64(b, 16),
                sh_offset: le_u64(b, 24),
                sh_size: le_u64(b, 32),
                sh_link: le_u32(b, 40),
                sh_info: le_u32(b, 44),
                sh_addralign: le_u64(b, 48),
                sh_entsize: le_u64(b, 56),
            },
        }
    }
}

/// Parsed symbol table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    /// Offset into the associated string table for this symbol's name.
    pub st_name: u32,
    /// Symbol type and binding packed into one byte.
    pub st_info: u8,
    /// Section index this symbol is defined in.
    pub st_shndx: u16,
    /// Symbol value. For the binaries this crate targets, an offset into
    /// the defining section.
    pub st_value: u64,
    /// Symbol size in bytes.
    pub st_size: u64,
}

impl Symbol {
    /// Parse a symbol entry from raw bytes at the given offset.
    ///
    /// The caller must ensure `offset + class.sym_size() <= data.len()`.
    fn parse(data: &[u8], offset: usize, class: ElfClass) -> Self {
        let b = &data[offset..];
        match class {
            ElfClass::Elf32 => Self {
                st_name: le_u32(b, 0),
                st_value: u64::from(le_u32(b, 4)),
                st_size: u64::from(le_u32(b, 8)),
                st_info: b[12],
                // st_other at 13, skipped
                st_shndx: le_u16(b, 14),
            },
            ElfClass::Elf64 => Self {
                st_name: le_u32(b, 0),
                st_info: b[4],
                // st_other at 5, skipped
                st_shndx: le_u16(b, 6),
                st_value: le_u64(b, 8),
                st_size: le_u64(b, 16),
            },
        }
    }

    /// Returns the symbol type (lower 4 bits of `st_info`).
    #[must_use]
    pub fn sym_type(&self) -> u8 {
        self.st_info & 0xf
    }

    /// Returns the symbol binding (upper 4 bits of `st_info`).
    #[must_use]
    pub fn sym_bind(&self) -> u8 {
        self.st_info >> 4
    }
}

/// A symbol paired with its resolved name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedSymbol<'a> {
    /// Name from the linked string table (empty if unresolvable).
    pub name: &'a str,
    /// The raw symbol entry.
    pub symbol: Symbol,
}

/// A section paired with its index, resolved name and file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    /// 0-based index in the section header table.
    pub index: usize,
    /// Name from `.shstrtab` (empty if unresolvable).
    pub name: &'a str,
    /// The raw section header.
    pub header: SectionHeader,
    /// The section's bytes in the file (empty for `SHT_NOBITS`), or `None`
    /// if the header points outside the image.
    pub data: Option<&'a [u8]>,
}

impl Section<'_> {
    /// Returns the section length in bytes, 0 if the data is unresolvable.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.map_or(0, <[u8]>::len)
    }

    /// Returns `true` if the section holds no resolvable file bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A zero-copy wrapper around a NUL-terminated string table section.
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    data: &'a [u8],
}

impl<'a> StringTable<'a> {
    /// Creates a new string table from the raw section data.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Looks up a NUL-terminated string at the given byte offset.
    ///
    /// Returns `None` if the offset is out of bounds or the string
    /// contains invalid UTF-8.
    #[must_use]
    pub fn get(&self, offset: u32) -> Option<&'a str> {
        let start = offset as usize;
        if start >= self.data.len() {
            return None;
        }
        let remaining = &self.data[start..];
        let nul_pos = remaining.iter().position(|&b| b == 0)?;
        core::str::from_utf8(&remaining[..nul_pos]).ok()
    }
}

/// An iterator over section headers.
pub struct SectionIter<'a> {
    data: &'a [u8],
    class: ElfClass,
    shoff: usize,
    shentsize: usize,
    index: usize,
    count: usize,
}

impl Iterator for SectionIter<'_> {
    type Item = SectionHeader;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let offset = self.shoff + self.index * self.shentsize;
        if offset + self.class.shdr_size() > self.data.len() {
            return None;
        }
        let hdr = SectionHeader::parse(self.data, offset, self.class);
        self.index += 1;
        Some(hdr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

/// An iterator over symbol table entries.
pub struct SymbolIter<'a> {
    data: &'a [u8],
    class: ElfClass,
    offset: usize,
    end: usize,
}

impl Iterator for SymbolIter<'_> {
    type Item = Symbol;

    fn next(&mut self) -> Option<Self::Item> {
        let size = self.class.sym_size();
        if self.offset + size > self.end {
            return None;
        }
        let sym = Symbol::parse(self.data, self.offset, self.class);
        self.offset += size;
        Some(sym)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.offset) / self.class.sym_size();
        (remaining, Some(remaining))
    }
}

// ---------------------------------------------------------------------------
// ElfFile section/symbol methods
// ---------------------------------------------------------------------------

impl<'a> ElfFile<'a> {
    /// Returns an iterator over all section headers.
    ///
    /// Returns an empty iterator if the ELF has no sections (`e_shnum == 0`).
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "ELF fields are u32/u64, truncation checked by format"
    )]
    pub fn section_headers(&self) -> SectionIter<'a> {
        let hdr = self.header();
        SectionIter {
            data: self.raw_data(),
            class: hdr.class,
            shoff: hdr.e_shoff as usize,
            shentsize: hdr.e_shentsize as usize,
            index: 0,
            count: hdr.e_shnum as usize,
        }
    }

    /// Returns an iterator over all sections with their names and bytes.
    ///
    /// Sections whose data lies outside the image are still yielded, with
    /// [`Section::data`] set to `None`.
    pub fn sections(&self) -> impl Iterator<Item = Section<'a>> + use<'a> {
        let elf = *self;
        let shstrtab = self.section_header_strtab();
        self.section_headers()
            .enumerate()
            .map(move |(index, header)| Section {
                index,
                name: shstrtab.and_then(|t| t.get(header.sh_name)).unwrap_or(""),
                header,
                data: elf.section_data(&header),
            })
    }

    /// Finds the first section header with the given type.
    #[must_use]
    pub fn find_section_by_type(&self, sh_type: u32) -> Option<SectionHeader> {
        self.section_headers().find(|s| s.sh_type == sh_type)
    }

    /// Finds a section by name, looking up names in the section header string table.
    #[must_use]
    pub fn find_section_by_name(&self, name: &str) -> Option<Section<'a>> {
        self.sections().find(|s| s.name == name)
    }

    /// Returns the raw data slice for a given section header.
    ///
    /// `SHT_NOBITS` sections yield an empty slice. Returns `None` if the
    /// section data is out of bounds.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "ELF fields are u32/u64, truncation checked by format"
    )]
    pub fn section_data(&self, shdr: &SectionHeader) -> Option<&'a [u8]> {
        if shdr.sh_type == SHT_NOBITS || shdr.sh_type == SHT_NULL {
            return Some(&[]);
        }
        let start = shdr.sh_offset as usize;
        let size = shdr.sh_size as usize;
        let data = self.raw_data();
        if start.checked_add(size)? > data.len() {
            return None;
        }
        Some(&data[start..start + size])
    }

    /// Returns the section header at the given 0-based index.
    ///
    /// Returns `None` if the index is out of range or the section header
    /// is out of bounds in the file.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "ELF fields are u32/u64, truncation checked by format"
    )]
    pub fn section_by_index(&self, index: usize) -> Option<SectionHeader> {
        let hdr = self.header();
        if index >= hdr.e_shnum as usize {
            return None;
        }
        let offset = hdr.e_shoff as usize + index * hdr.e_shentsize as usize;
        let data = self.raw_data();
        if offset + hdr.class.shdr_size() > data.len() {
            return None;
        }
        Some(SectionHeader::parse(data, offset, hdr.class))
    }

    /// Returns an iterator over symbols in the given section (must be `SHT_SYMTAB` or `SHT_DYNSYM`).
    ///
    /// Returns `None` if the section data is out of bounds.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "ELF fields are u32/u64, truncation checked by format"
    )]
    pub fn symbols(&self, shdr: &SectionHeader) -> Option<SymbolIter<'a>> {
        let data = self.section_data(shdr)?;
        let base = shdr.sh_offset as usize;
        Some(SymbolIter {
            data: self.raw_data(),
            class: self.header().class,
            offset: base,
            end: base + data.len(),
        })
    }

    /// Returns the string table associated with a symbol table section (via `sh_link`).
    #[must_use]
    pub fn linked_strtab(&self, symtab: &SectionHeader) -> Option<StringTable<'a>> {
        let strtab_shdr = self.section_by_index(symtab.sh_link as usize)?;
        let strtab_data = self.section_data(&strtab_shdr)?;
        Some(StringTable::new(strtab_data))
    }

    /// Returns the entries of the static symbol table (`SHT_SYMTAB`) with
    /// their names, in table order.
    ///
    /// Returns an empty iterator if the image has no usable symbol table.
    pub fn named_symbols(&self) -> impl Iterator<Item = NamedSymbol<'a>> + use<'a> {
        let symtab = self.find_section_by_type(SHT_SYMTAB);
        let strtab = symtab.and_then(|s| self.linked_strtab(&s));
        let symbols = symtab.and_then(|s| self.symbols(&s));
        symbols.into_iter().flatten().map(move |symbol| NamedSymbol {
            name: strtab.and_then(|t| t.get(symbol.st_name)).unwrap_or(""),
            symbol,
        })
    }

    /// Returns the section header string table (`.shstrtab`).
    fn section_header_strtab(&self) -> Option<StringTable<'a>> {
        let hdr = self.header();
        if hdr.e_shstrndx == 0 {
            return None;
        }
        let shdr = self.section_by_index(hdr.e_shstrndx as usize)?;
        let strtab_data = self.section_data(&shdr)?;
        Some(StringTable::new(strtab_data))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
