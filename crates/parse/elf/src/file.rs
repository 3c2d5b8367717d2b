//! [`ElfFile`], the entry point for reading an ELF image.

use crate::header::{ElfError, ElfHeader};

/// A parsed ELF image, holding a reference to the raw data and the parsed header.
///
/// Parsing is cheap: only the file header is decoded up front. Sections and
/// symbols are decoded lazily by the accessors in [`crate::section`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfFile<'a> {
    pub(crate) data: &'a [u8],
    header: ElfHeader,
}

impl<'a> ElfFile<'a> {
    /// Parse an ELF image from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError`] if the header is invalid or the data is too short.
    pub fn parse(data: &'a [u8]) -> Result<Self, ElfError> {
        let header = ElfHeader::parse(data)?;
        Ok(Self { data, header })
    }

    /// Returns the parsed file header.
    #[must_use]
    pub fn header(&self) -> &ElfHeader {
        &self.header
    }

    /// Returns the processor-specific `e_flags` field.
    #[must_use]
    pub fn flags(&self) -> u32 {
        self.header.e_flags
    }

    /// Returns the underlying raw ELF data.
    #[must_use]
    pub fn raw_data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the length of the image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the image is empty. A parsed image never is.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
