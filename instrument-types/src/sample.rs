//! Value transforms a store applies to a stream before returning it.

use core::fmt;
use core::str::FromStr;

/// How raw samples are turned into the returned values.
///
/// The discriminants are the store's wire numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SampleType {
    /// Raw values.
    None = 0,
    /// Mean over each sample interval.
    Average = 1,
    /// Maximum over each sample interval.
    Max = 2,
    /// Minimum over each sample interval.
    Min = 3,
    /// Per-second rate of a counter, negative steps dropped.
    #[default]
    Rate = 4,
    /// Per-second rate of a counter, negative steps kept.
    RateSigned = 5,
    /// Difference between consecutive values.
    Delta = 6,
    /// Only the most recent value.
    Latest = 7,
}

impl SampleType {
    /// Every transform, in wire order.
    pub const ALL: [SampleType; 8] = [
        SampleType::None,
        SampleType::Average,
        SampleType::Max,
        SampleType::Min,
        SampleType::Rate,
        SampleType::RateSigned,
        SampleType::Delta,
        SampleType::Latest,
    ];

    /// Lower-case name used in config files and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            SampleType::None => "none",
            SampleType::Average => "average",
            SampleType::Max => "max",
            SampleType::Min => "min",
            SampleType::Rate => "rate",
            SampleType::RateSigned => "rate_signed",
            SampleType::Delta => "delta",
            SampleType::Latest => "latest",
        }
    }

    /// Cycle to the next transform.
    pub fn next(self) -> Self {
        Self::ALL[(self as usize + 1) % Self::ALL.len()]
    }

    /// Cycle to the previous transform.
    pub fn prev(self) -> Self {
        Self::ALL[(self as usize + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognised transform name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSampleType;

impl fmt::Display for UnknownSampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown sample type")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownSampleType {}

impl FromStr for SampleType {
    type Err = UnknownSampleType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownSampleType)
    }
}
