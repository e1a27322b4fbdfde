use super::{MAX_DEPTH, counters::add_into, depth_weight};

/// Per-side totals maintained incrementally on every recorded event.
///
/// This is kept apart from [`super::EpochCounters`] so the two can be compared
/// at report time; a divergence points at a bookkeeping bug in the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideAggregate {
    pub(crate) list: [u64; MAX_DEPTH],
    pub(crate) sum: u64,
    pub(crate) sum_weighted: u64,
    pub(crate) sum_cum: u64,
    pub(crate) sum_cum_weighted: u64,
}

impl SideAggregate {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            list: [0; MAX_DEPTH],
            sum: 0,
            sum_weighted: 0,
            sum_cum: 0,
            sum_cum_weighted: 0,
        }
    }

    pub(crate) fn record(&mut self, depth: usize) {
        let weight = depth_weight(depth);
        self.list[depth] = self.list[depth].saturating_add(1);
        self.sum = self.sum.saturating_add(1);
        self.sum_weighted = self.sum_weighted.saturating_add(weight);
        self.sum_cum = self.sum_cum.saturating_add(1);
        self.sum_cum_weighted = self.sum_cum_weighted.saturating_add(weight);
    }

    pub(crate) const fn reset_epoch(&mut self) {
        self.list = [0; MAX_DEPTH];
        self.sum = 0;
        self.sum_weighted = 0;
    }

    pub(crate) const fn reset_cumulative(&mut self) {
        self.sum_cum = 0;
        self.sum_cum_weighted = 0;
    }

    pub(crate) fn add_assign(&mut self, other: &Self) {
        add_into(&mut self.list, &other.list);
        self.sum = self.sum.saturating_add(other.sum);
        self.sum_weighted = self.sum_weighted.saturating_add(other.sum_weighted);
        self.sum_cum = self.sum_cum.saturating_add(other.sum_cum);
        self.sum_cum_weighted = self.sum_cum_weighted.saturating_add(other.sum_cum_weighted);
    }

    #[must_use]
    pub const fn at_depth(&self, depth: usize) -> u64 {
        self.list[depth]
    }

    #[must_use]
    pub const fn sum(&self) -> u64 {
        self.sum
    }

    #[must_use]
    pub const fn sum_weighted(&self) -> u64 {
        self.sum_weighted
    }

    #[must_use]
    pub const fn sum_cum(&self) -> u64 {
        self.sum_cum
    }

    #[must_use]
    pub const fn sum_cum_weighted(&self) -> u64 {
        self.sum_cum_weighted
    }
}

impl Default for SideAggregate {
    fn default() -> Self {
        Self::new()
    }
}
