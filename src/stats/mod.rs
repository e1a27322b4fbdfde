//! Alpha-beta search statistics.
//!
//! [`StatsAccumulator`] counts, per search depth and per named position
//! category, how often the search terminated a node and which side the result
//! went to, alongside per-depth node visits. Counts are kept for the current
//! epoch (usually one search call) and folded into cumulative totals each time
//! a report is generated.

mod accumulator;
mod check;
mod counters;
mod error;
mod report;
mod side;
mod sink;

pub use accumulator::StatsAccumulator;
pub use check::{CheckedField, EpochSummary, Mismatch, Mismatches};
pub use counters::{CumulativeCounters, EpochCounters, SideTotal};
pub use error::StatsError;
pub use side::SideAggregate;

/// Number of distinct named position categories.
pub const POSITION_COUNT: usize = 16;
/// Number of search depths tracked (13 tricks of 4 plies).
pub const MAX_DEPTH: usize = 52;
pub const SIDE_COUNT: usize = 2;
/// Plies per trick; branching factors are sampled across this period.
pub const PLIES_PER_TRICK: usize = 4;

#[inline]
pub(crate) const fn side_index(side: bool) -> usize {
    if side { 1 } else { 0 }
}

#[inline]
pub(crate) fn depth_weight(depth: usize) -> u64 {
    u64::try_from(depth).unwrap_or(u64::MAX)
}

#[inline]
pub(crate) const fn check_depth(depth: usize) -> Result<(), StatsError> {
    if depth < MAX_DEPTH {
        Ok(())
    } else {
        Err(StatsError::DepthOutOfRange {
            depth,
            max: MAX_DEPTH,
        })
    }
}
