//! Minimal ELF32/ELF64 reader for GPU program binaries.
//!
//! Parses the file header, section headers, string tables and the static
//! symbol table from raw byte slices using safe field extraction
//! (`from_le_bytes`). No unsafe code, no allocations on the read path.
//!
//! # Usage
//!
//! ```
//! use sibin_elf::ElfFile;
//!
//! fn dump(data: &[u8]) {
//!     let elf = ElfFile::parse(data).expect("valid ELF");
//!     let flags = elf.flags();
//!     if let Some(text) = elf.find_section_by_name(".text") {
//!         // text.data holds the section bytes, None if out of bounds
//!     }
//!     for sym in elf.named_symbols() {
//!         // sym.name, sym.symbol.st_value, ...
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "write")]
extern crate alloc;

pub mod file;
pub mod header;
pub mod section;
#[cfg(feature = "write")]
pub mod write;

pub use file::ElfFile;
pub use header::{ElfClass, ElfError, ElfHeader};
pub use section::{
    NamedSymbol, SHN_UNDEF, SHT_DYNSYM, SHT_NOBITS, SHT_NULL, SHT_PROGBITS, SHT_STRTAB,
    SHT_SYMTAB, Section, SectionHeader, StringTable, Symbol,
};
#[cfg(feature = "write")]
pub use write::ElfWriter;
