//! Decoder error type.

use core::fmt;

use sibin_elf::ElfError;

/// Errors that abort decoding of a program binary.
///
/// Every variant is a structural problem with the input; none are
/// transient, so callers should not retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The host or an embedded buffer is not a readable ELF image.
    NotElf(ElfError),
    /// A section the stage requires is absent.
    MissingSection(&'static str),
    /// A section's contents violate its format.
    MalformedSection {
        /// Section name, e.g. `.inputs`.
        section: &'static str,
        /// What was wrong.
        reason: &'static str,
    },
    /// A fixed-size section does not have the expected length.
    SizeMismatch {
        /// Section name, e.g. `.info`.
        section: &'static str,
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },
    /// A record runs past the end of its section.
    TruncatedRecord {
        /// Section name, e.g. `.outputs`.
        section: &'static str,
        /// 0-based index of the record that did not fit.
        index: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotElf(err) => write!(
                f,
                "shader binary is not ELF formatted ({err}), please upgrade your AMD driver"
            ),
            Self::MissingSection(name) => write!(f, "required section {name} not found"),
            Self::MalformedSection { section, reason } => {
                write!(f, "malformed {section} section: {reason}")
            }
            Self::SizeMismatch {
                section,
                expected,
                actual,
            } => write!(
                f,
                "{section} section size ({actual}) doesn't match expected structure size ({expected})"
            ),
            Self::TruncatedRecord { section, index } => {
                write!(f, "record {index} of {section} runs past the end of the section")
            }
        }
    }
}

impl From<ElfError> for DecodeError {
    fn from(err: ElfError) -> Self {
        Self::NotElf(err)
    }
}

impl core::error::Error for DecodeError {}
