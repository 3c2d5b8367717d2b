//! Decode policy.

/// Knobs for the checks that are lenient by default.
///
/// The defaults accept every binary the stock driver has been observed to
/// produce. The strict modes exist to catch format drift between driver
/// versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DecodeOptions {
    /// Reject a `.usageinfo` section whose length differs from the
    /// structure size instead of copying the available bytes.
    pub strict_usage_info: bool,
    /// Reject a fragment `.text` section shorter than the fragment header
    /// instead of zero-filling the missing fields.
    pub strict_fragment_header: bool,
}

impl DecodeOptions {
    /// All strict checks enabled.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            strict_usage_info: true,
            strict_fragment_header: true,
        }
    }
}
