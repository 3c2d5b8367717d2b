//! `.inputs` and `.outputs` descriptor tables.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use sibin_core::{ByteReader, sb_trace};

use crate::error::DecodeError;

const INPUTS: &str = ".inputs";
const OUTPUTS: &str = ".outputs";

/// One shader input descriptor (28 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Input {
    /// Input kind.
    pub input_type: u32,
    /// Offset within the vertex fetch.
    pub vertex_offset: u32,
    /// Offset within the parameter cache.
    pub param_offset: u32,
    /// Component swizzle selectors.
    pub swizzles: [u32; 4],
}

impl Input {
    /// Size of one record in bytes.
    pub const SIZE: usize = 28;

    /// Decodes every record of an `.inputs` section, in order.
    ///
    /// # Errors
    ///
    /// [`DecodeError::MalformedSection`] if the length is not a multiple of
    /// [`Input::SIZE`].
    pub fn decode_table(data: &[u8]) -> Result<Vec<Self>, DecodeError> {
        if data.len() % Self::SIZE != 0 {
            return Err(DecodeError::MalformedSection {
                section: INPUTS,
                reason: "length is not a multiple of the 28-byte record size",
            });
        }

        let mut r = ByteReader::new(data);
        let mut inputs = Vec::with_capacity(data.len() / Self::SIZE);
        let mut index = 0;
        while !r.is_at_end() {
            let [input_type, vertex_offset, param_offset, s0, s1, s2, s3] = r
                .read_u32_array::<7>()
                .ok_or(DecodeError::TruncatedRecord {
                    section: INPUTS,
                    index,
                })?;
            inputs.push(Self {
                input_type,
                vertex_offset,
                param_offset,
                swizzles: [s0, s1, s2, s3],
            });
            index += 1;
        }
        Ok(inputs)
    }
}

/// One shader output descriptor.
///
/// On disk every record starts with four words (`output_type`,
/// `param_offset`, `data_type`, `array_size`) followed by a NUL-terminated
/// name. An empty name marks an unnamed output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Output {
    /// A user-declared output variable.
    Named {
        /// Variable name.
        name: String,
        /// Data type id.
        data_type: u32,
        /// Number of array elements.
        array_size: u32,
    },
    /// A built-in output.
    Unnamed {
        /// Output kind.
        output_type: u32,
        /// Export parameter offset.
        param_offset: u32,
        /// Number of array elements.
        array_size: u32,
    },
}

impl Output {
    /// Size of the fixed record prefix in bytes.
    pub const PREFIX_SIZE: usize = 16;

    /// Decodes `count` variable-length records from an `.outputs` section.
    ///
    /// The driver stores the record count in the section header's
    /// `sh_entsize` field. Bytes after the last record are ignored.
    ///
    /// # Errors
    ///
    /// [`DecodeError::TruncatedRecord`] if a record runs past the end of the
    /// section, [`DecodeError::MalformedSection`] if a name is not UTF-8.
    pub fn decode_table(data: &[u8], count: usize) -> Result<Vec<Self>, DecodeError> {
        let mut r = ByteReader::new(data);
        // The count comes from the file; don't let it size the allocation.
        let mut outputs = Vec::with_capacity(count.min(data.len() / (Self::PREFIX_SIZE + 1)));

        for index in 0..count {
            let truncated = DecodeError::TruncatedRecord {
                section: OUTPUTS,
                index,
            };
            let [output_type, param_offset, data_type, array_size] =
                r.read_u32_array::<4>().ok_or(truncated)?;
            let name = r.read_cstr().ok_or(truncated)?;

            let output = if name.is_empty() {
                Self::Unnamed {
                    output_type,
                    param_offset,
                    array_size,
                }
            } else {
                let name = core::str::from_utf8(name).map_err(|_| DecodeError::MalformedSection {
                    section: OUTPUTS,
                    reason: "output name is not valid UTF-8",
                })?;
                Self::Named {
                    name: name.to_string(),
                    data_type,
                    array_size,
                }
            };
            sb_trace!("output {index}: {output:?}");
            outputs.push(output);
        }
        Ok(outputs)
    }

    /// The variable name, for named outputs.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named { name, .. } => Some(name),
            Self::Unnamed { .. } => None,
        }
    }

    /// Number of array elements.
    #[must_use]
    pub fn array_size(&self) -> u32 {
        match self {
            Self::Named { array_size, .. } | Self::Unnamed { array_size, .. } => *array_size,
        }
    }
}
