//! `.info` and `.usageinfo` blocks.

use sibin_core::{ByteReader, sb_warn};

use crate::error::DecodeError;
use crate::options::DecodeOptions;

/// Instruction statistics from `.info` (20 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Info {
    /// Driver-defined flags.
    pub flags: u32,
    /// Scratch registers required per thread.
    pub max_scratch_regs: u32,
    /// ALU instruction count.
    pub alu_instruction_count: u32,
    /// Fetch instruction count.
    pub fetch_instruction_count: u32,
    /// Export instruction count.
    pub export_instruction_count: u32,
}

impl Info {
    /// Exact size of the section.
    pub const SIZE: usize = 20;

    /// Decodes an `.info` section.
    ///
    /// # Errors
    ///
    /// [`DecodeError::SizeMismatch`] unless `data` is exactly
    /// [`Info::SIZE`] bytes.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() != Self::SIZE {
            return Err(DecodeError::SizeMismatch {
                section: ".info",
                expected: Self::SIZE,
                actual: data.len(),
            });
        }
        let words: [u32; 5] = ByteReader::new(data).read_u32_array().unwrap_or_default();
        let [
            flags,
            max_scratch_regs,
            alu_instruction_count,
            fetch_instruction_count,
            export_instruction_count,
        ] = words;
        Ok(Self {
            flags,
            max_scratch_regs,
            alu_instruction_count,
            fetch_instruction_count,
            export_instruction_count,
        })
    }
}

/// Resource usage masks from `.usageinfo` (32 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UsageInfo {
    /// Texture units read.
    pub texture_mask: u32,
    /// Sampler slots used.
    pub sampler_mask: u32,
    /// Uniform buffer bindings used.
    pub uniform_buffer_mask: u32,
    /// Storage buffer bindings used.
    pub storage_buffer_mask: u32,
    /// Image units used.
    pub image_mask: u32,
    /// Atomic counter bindings used.
    pub atomic_counter_mask: u32,
    /// Clip distances written.
    pub clip_distance_mask: u32,
    /// Driver-defined flags.
    pub flags: u32,
}

impl UsageInfo {
    /// Nominal size of the section.
    pub const SIZE: usize = 32;

    /// Decodes a `.usageinfo` section.
    ///
    /// Drivers disagree on this block's size. By default a section of the
    /// wrong size is accepted: the first `min(len, 32)` bytes are used and
    /// the rest of the block reads as zero. With
    /// [`DecodeOptions::strict_usage_info`] it is rejected.
    ///
    /// # Errors
    ///
    /// [`DecodeError::SizeMismatch`] for a wrong-size section in strict mode.
    pub fn decode(data: &[u8], options: &DecodeOptions) -> Result<Self, DecodeError> {
        if data.len() != Self::SIZE {
            if options.strict_usage_info {
                return Err(DecodeError::SizeMismatch {
                    section: ".usageinfo",
                    expected: Self::SIZE,
                    actual: data.len(),
                });
            }
            sb_warn!(
                ".usageinfo section size ({}) doesn't match expected structure size ({})",
                data.len(),
                Self::SIZE
            );
        }

        let mut block = [0u8; Self::SIZE];
        let n = data.len().min(Self::SIZE);
        block[..n].copy_from_slice(&data[..n]);

        let words: [u32; 8] = ByteReader::new(&block).read_u32_array().unwrap_or_default();
        let [
            texture_mask,
            sampler_mask,
            uniform_buffer_mask,
            storage_buffer_mask,
            image_mask,
            atomic_counter_mask,
            clip_distance_mask,
            flags,
        ] = words;
        Ok(Self {
            texture_mask,
            sampler_mask,
            uniform_buffer_mask,
            storage_buffer_mask,
            image_mask,
            atomic_counter_mask,
            clip_distance_mask,
            flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::words;

    #[test]
    fn info_fields() {
        let info = Info::decode(&words(&[1, 2, 30, 4, 5])).unwrap();
        assert_eq!(info.flags, 1);
        assert_eq!(info.max_scratch_regs, 2);
        assert_eq!(info.alu_instruction_count, 30);
        assert_eq!(info.fetch_instruction_count, 4);
        assert_eq!(info.export_instruction_count, 5);
    }

    #[test]
    fn info_must_be_exact_size() {
        for len in [0, 19, 21, 24] {
            assert_eq!(
                Info::decode(&vec![0; len]),
                Err(DecodeError::SizeMismatch {
                    section: ".info",
                    expected: 20,
                    actual: len,
                })
            );
        }
    }

    #[test]
    fn usage_info_fields() {
        let usage = UsageInfo::decode(&words(&[1, 2, 3, 4, 5, 6, 7, 8]), &DecodeOptions::default()).unwrap();
        assert_eq!(usage.texture_mask, 1);
        assert_eq!(usage.clip_distance_mask, 7);
        assert_eq!(usage.flags, 8);
    }

    #[test]
    fn short_usage_info_copies_available_bytes() {
        let usage = UsageInfo::decode(&words(&[0xf, 0x3, 0x1]), &DecodeOptions::default()).unwrap();
        assert_eq!(usage.texture_mask, 0xf);
        assert_eq!(usage.sampler_mask, 0x3);
        assert_eq!(usage.uniform_buffer_mask, 0x1);
        assert_eq!(usage.storage_buffer_mask, 0);
        assert_eq!(usage.flags, 0);
    }

    #[test]
    fn long_usage_info_is_truncated_to_block() {
        let data = words(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let usage = UsageInfo::decode(&data, &DecodeOptions::default()).unwrap();
        assert_eq!(usage.flags, 8);
    }

    #[test]
    fn wrong_size_usage_info_rejected_in_strict_mode() {
        let opts = DecodeOptions {
            strict_usage_info: true,
            ..DecodeOptions::default()
        };
        assert_eq!(
            UsageInfo::decode(&[0; 12], &opts),
            Err(DecodeError::SizeMismatch {
                section: ".usageinfo",
                expected: 32,
                actual: 12,
            })
        );
        assert!(UsageInfo::decode(&[0; 32], &opts).is_ok());
    }
}
