use super::{MAX_DEPTH, POSITION_COUNT, SIDE_COUNT, depth_weight};

/// Event count and depth-weighted sum for one side, derived from
/// [`EpochCounters::score`] rather than from the incremental side aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideTotal {
    pub count: u64,
    pub weighted: u64,
}

/// Counters for the current measurement window, cleared by `reset_epoch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochCounters {
    pub(crate) sum_new: [u64; POSITION_COUNT],
    pub(crate) weighted_sum_new: [u64; POSITION_COUNT],
    pub(crate) counter: [[u64; MAX_DEPTH]; POSITION_COUNT],
    pub(crate) score: [[u64; MAX_DEPTH]; SIDE_COUNT],
    pub(crate) nodes: [u64; MAX_DEPTH],
    pub(crate) all_nodes: u64,
}

impl EpochCounters {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sum_new: [0; POSITION_COUNT],
            weighted_sum_new: [0; POSITION_COUNT],
            counter: [[0; MAX_DEPTH]; POSITION_COUNT],
            score: [[0; MAX_DEPTH]; SIDE_COUNT],
            nodes: [0; MAX_DEPTH],
            all_nodes: 0,
        }
    }

    pub(crate) fn record_event(&mut self, position: usize, side: usize, depth: usize) {
        self.counter[position][depth] = self.counter[position][depth].saturating_add(1);
        self.sum_new[position] = self.sum_new[position].saturating_add(1);
        self.weighted_sum_new[position] =
            self.weighted_sum_new[position].saturating_add(depth_weight(depth));
        self.score[side][depth] = self.score[side][depth].saturating_add(1);
    }

    pub(crate) fn record_node(&mut self, depth: usize) {
        self.nodes[depth] = self.nodes[depth].saturating_add(1);
        self.all_nodes = self.all_nodes.saturating_add(1);
    }

    /// Sums `score[side][d]` and `d * score[side][d]` over all depths.
    #[must_use]
    pub fn side_totals(&self) -> [SideTotal; SIDE_COUNT] {
        let mut totals = [SideTotal::default(); SIDE_COUNT];
        for (total, per_depth) in totals.iter_mut().zip(&self.score) {
            for (depth, &count) in per_depth.iter().enumerate() {
                total.count = total.count.saturating_add(count);
                total.weighted = total
                    .weighted
                    .saturating_add(depth_weight(depth).saturating_mul(count));
            }
        }
        totals
    }

    #[must_use]
    pub const fn position_count(&self, position: usize) -> u64 {
        self.sum_new[position]
    }

    #[must_use]
    pub const fn position_weighted(&self, position: usize) -> u64 {
        self.weighted_sum_new[position]
    }

    #[must_use]
    pub const fn position_at_depth(&self, position: usize, depth: usize) -> u64 {
        self.counter[position][depth]
    }

    #[must_use]
    pub const fn score(&self, side: bool, depth: usize) -> u64 {
        self.score[super::side_index(side)][depth]
    }

    #[must_use]
    pub const fn nodes(&self, depth: usize) -> u64 {
        self.nodes[depth]
    }

    #[must_use]
    pub const fn all_nodes(&self) -> u64 {
        self.all_nodes
    }

    pub(crate) fn add_assign(&mut self, other: &Self) {
        add_into(&mut self.sum_new, &other.sum_new);
        add_into(&mut self.weighted_sum_new, &other.weighted_sum_new);
        for (mine, theirs) in self.counter.iter_mut().zip(&other.counter) {
            add_into(mine, theirs);
        }
        for (mine, theirs) in self.score.iter_mut().zip(&other.score) {
            add_into(mine, theirs);
        }
        add_into(&mut self.nodes, &other.nodes);
        self.all_nodes = self.all_nodes.saturating_add(other.all_nodes);
    }
}

impl Default for EpochCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Long-run totals, cleared only by `reset_cumulative`.
///
/// `nodes_cum` grows on every node visit; the remaining fields grow when an
/// epoch is folded in at report time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeCounters {
    pub(crate) nodes_cum: [u64; MAX_DEPTH],
    pub(crate) all_nodes_cum: u64,
    pub(crate) score_cum: [u64; SIDE_COUNT],
    pub(crate) weighted_score_cum: [u64; SIDE_COUNT],
    pub(crate) counter_cum: [u64; POSITION_COUNT],
    pub(crate) weighted_counter_cum: [u64; POSITION_COUNT],
}

impl CumulativeCounters {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes_cum: [0; MAX_DEPTH],
            all_nodes_cum: 0,
            score_cum: [0; SIDE_COUNT],
            weighted_score_cum: [0; SIDE_COUNT],
            counter_cum: [0; POSITION_COUNT],
            weighted_counter_cum: [0; POSITION_COUNT],
        }
    }

    pub(crate) fn record_node(&mut self, depth: usize) {
        self.nodes_cum[depth] = self.nodes_cum[depth].saturating_add(1);
    }

    pub(crate) fn fold(&mut self, epoch: &EpochCounters, totals: &[SideTotal; SIDE_COUNT]) {
        self.all_nodes_cum = self.all_nodes_cum.saturating_add(epoch.all_nodes);
        for (side, total) in totals.iter().enumerate() {
            self.score_cum[side] = self.score_cum[side].saturating_add(total.count);
            self.weighted_score_cum[side] =
                self.weighted_score_cum[side].saturating_add(total.weighted);
        }
        add_into(&mut self.counter_cum, &epoch.sum_new);
        add_into(&mut self.weighted_counter_cum, &epoch.weighted_sum_new);
    }

    #[must_use]
    pub const fn nodes_cum(&self, depth: usize) -> u64 {
        self.nodes_cum[depth]
    }

    #[must_use]
    pub const fn all_nodes_cum(&self) -> u64 {
        self.all_nodes_cum
    }

    #[must_use]
    pub const fn side_total(&self, side: bool) -> SideTotal {
        let index = super::side_index(side);
        SideTotal {
            count: self.score_cum[index],
            weighted: self.weighted_score_cum[index],
        }
    }

    #[must_use]
    pub const fn position_count(&self, position: usize) -> u64 {
        self.counter_cum[position]
    }

    #[must_use]
    pub const fn position_weighted(&self, position: usize) -> u64 {
        self.weighted_counter_cum[position]
    }

    pub(crate) fn add_assign(&mut self, other: &Self) {
        add_into(&mut self.nodes_cum, &other.nodes_cum);
        self.all_nodes_cum = self.all_nodes_cum.saturating_add(other.all_nodes_cum);
        add_into(&mut self.score_cum, &other.score_cum);
        add_into(&mut self.weighted_score_cum, &other.weighted_score_cum);
        add_into(&mut self.counter_cum, &other.counter_cum);
        add_into(&mut self.weighted_counter_cum, &other.weighted_counter_cum);
    }
}

impl Default for CumulativeCounters {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn add_into(target: &mut [u64], source: &[u64]) {
    for (t, s) in target.iter_mut().zip(source) {
        *t = t.saturating_add(*s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_totals_weight_by_depth() {
        let mut epoch = EpochCounters::new();
        epoch.record_event(0, 1, 3);
        epoch.record_event(2, 1, 5);
        epoch.record_event(1, 0, 7);
        let totals = epoch.side_totals();
        assert_eq!(totals[1], SideTotal { count: 2, weighted: 8 });
        assert_eq!(totals[0], SideTotal { count: 1, weighted: 7 });
    }

    #[test]
    fn fold_adds_epoch_into_cumulative() {
        let mut epoch = EpochCounters::new();
        epoch.record_event(4, 0, 6);
        epoch.record_node(6);
        epoch.record_node(2);
        let mut cumulative = CumulativeCounters::new();
        let totals = epoch.side_totals();
        cumulative.fold(&epoch, &totals);
        cumulative.fold(&epoch, &totals);
        assert_eq!(cumulative.all_nodes_cum(), 4);
        assert_eq!(cumulative.position_count(4), 2);
        assert_eq!(cumulative.position_weighted(4), 12);
        assert_eq!(cumulative.side_total(false), SideTotal { count: 2, weighted: 12 });
        assert_eq!(cumulative.side_total(true), SideTotal::default());
    }

    #[test]
    fn add_assign_is_per_field() {
        let mut a = EpochCounters::new();
        a.record_event(1, 1, 9);
        a.record_node(9);
        let mut b = EpochCounters::new();
        b.record_event(1, 1, 9);
        b.record_event(3, 0, 2);
        b.record_node(2);
        a.add_assign(&b);
        assert_eq!(a.position_at_depth(1, 9), 2);
        assert_eq!(a.position_count(3), 1);
        assert_eq!(a.score(true, 9), 2);
        assert_eq!(a.score(false, 2), 1);
        assert_eq!(a.all_nodes(), 2);
    }
}
