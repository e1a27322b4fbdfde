use rand::Rng;

use super::Outcome;
use crate::stats::{PLIES_PER_TRICK, StatsAccumulator, StatsError};

/// Boolean alpha-beta over a synthetic trick game: can side 1 (the side on
/// move at the root) take `target` tricks? Hands shrink by one card per trick
/// and each trick goes to a random side.
///
/// Every visited node ends in exactly one recorded outcome.
pub struct TrickSearch<'a, R: Rng> {
    rng: &'a mut R,
    stats: &'a mut StatsAccumulator,
    max_branching: usize,
    target: usize,
}

impl<'a, R: Rng> TrickSearch<'a, R> {
    pub const fn new(
        rng: &'a mut R,
        stats: &'a mut StatsAccumulator,
        max_branching: usize,
        target: usize,
    ) -> Self {
        Self {
            rng,
            stats,
            max_branching,
            target,
        }
    }

    pub fn run(&mut self, tricks: usize) -> Result<bool, StatsError> {
        self.search(tricks.saturating_mul(PLIES_PER_TRICK), 0, true)
    }

    fn record(&mut self, outcome: Outcome, value: bool, depth: usize) -> Result<bool, StatsError> {
        self.stats.record_event(outcome.index(), value, depth)?;
        Ok(value)
    }

    fn search(&mut self, depth: usize, won: usize, maximizing: bool) -> Result<bool, StatsError> {
        self.stats.record_node_visit(depth)?;
        if depth == 0 {
            return self.record(Outcome::Terminal, won >= self.target, depth);
        }

        let tricks_left = depth.div_ceil(PLIES_PER_TRICK);
        if depth % PLIES_PER_TRICK == 0 {
            if won >= self.target {
                return self.record(Outcome::TargetReached, true, depth);
            }
            if won.saturating_add(tricks_left) < self.target {
                return self.record(Outcome::TargetUnreachable, false, depth);
            }
        }

        let trick_ends = depth % PLIES_PER_TRICK == 1;
        let moves = self.max_branching.min(tricks_left).max(1);
        for _ in 0..moves {
            let next_won = if trick_ends && self.rng.random_bool(0.5) {
                won.saturating_add(1)
            } else {
                won
            };
            let value = self.search(depth.saturating_sub(1), next_won, !maximizing)?;
            if value == maximizing {
                return self.record(Outcome::Cutoff, value, depth);
            }
        }
        self.record(Outcome::Exhausted, !maximizing, depth)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn every_node_is_accounted_for_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut stats = StatsAccumulator::new();
        for target in 1..=3 {
            TrickSearch::new(&mut rng, &mut stats, 4, target)
                .run(3)
                .unwrap();
        }
        let summary = stats.fold_epoch();
        assert!(summary.is_consistent());
        assert_eq!(stats.total_nodes(), summary.combined());
        assert!(stats.epoch().nodes(12) > 0);
    }

    #[test]
    fn trivial_target_is_reached_at_the_root() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut stats = StatsAccumulator::new();
        let reached = TrickSearch::new(&mut rng, &mut stats, 4, 0).run(2).unwrap();
        assert!(reached);
        assert_eq!(stats.total_nodes(), 1);
        assert_eq!(stats.epoch().position_count(Outcome::TargetReached.index()), 1);
        assert_eq!(stats.epoch().score(true, 8), 1);
    }

    #[test]
    fn unreachable_target_fails_at_the_root() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut stats = StatsAccumulator::new();
        let reached = TrickSearch::new(&mut rng, &mut stats, 4, 5).run(2).unwrap();
        assert!(!reached);
        assert_eq!(stats.epoch().position_count(Outcome::TargetUnreachable.index()), 1);
    }
}
