use derive_more::Display;
use enumset::EnumSet;

/// Demand-response period category.
///
/// Variants are declared in precedence order: whenever several raw windows match at the same
/// instant, the earliest variant wins.
#[derive(Debug, Display, Hash, PartialOrd, Ord, clap::ValueEnum, enumset::EnumSetType)]
pub enum PeriodType {
    /// Utility-declared high-price window.
    #[display("PEAK")]
    Peak,

    /// Lead-in window right before a peak.
    #[display("PRE_PEAK")]
    PrePeak,

    /// Earlier lead-in window, before the pre-peak.
    #[display("PRE_PRE_PEAK")]
    PrePrePeak,
}

impl PeriodType {
    pub const PRECEDENCE: [Self; 3] = [Self::Peak, Self::PrePeak, Self::PrePrePeak];

    /// Lowest priority first, which is the order the switches get toggled in.
    pub fn ascending_priority(set: EnumSet<Self>) -> impl Iterator<Item = Self> {
        Self::PRECEDENCE.into_iter().rev().filter(move |period| set.contains(*period))
    }
}
