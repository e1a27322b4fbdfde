//! Synthetic trick-game search used to drive [`StatsAccumulator`] from the
//! binary. Each worker thread owns a private accumulator and merges it into
//! the shared one when its share of searches is done.

use std::{
    panic,
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

use log::debug;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    config::{SearchConfig, StatsConfig},
    stats::{StatsAccumulator, StatsError},
};

mod alpha_beta;

pub use alpha_beta::TrickSearch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Terminal,
    TargetReached,
    TargetUnreachable,
    Cutoff,
    Exhausted,
}

impl Outcome {
    pub const ALL: [Self; 5] = [
        Self::Terminal,
        Self::TargetReached,
        Self::TargetUnreachable,
        Self::Cutoff,
        Self::Exhausted,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Terminal => 0,
            Self::TargetReached => 1,
            Self::TargetUnreachable => 2,
            Self::Cutoff => 3,
            Self::Exhausted => 4,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Terminal => "Terminal",
            Self::TargetReached => "Target reached",
            Self::TargetUnreachable => "Target unreachable",
            Self::Cutoff => "Cutoff",
            Self::Exhausted => "All moves failed",
        }
    }
}

/// Accumulator with outcome labels, overridden by any configured names.
#[must_use]
pub fn configured_accumulator(config: &StatsConfig) -> StatsAccumulator {
    let mut stats = StatsAccumulator::from_config(config);
    for outcome in Outcome::ALL {
        if outcome.index() >= config.position_names.len() {
            stats.set_position_name(outcome.index(), outcome.label());
        }
    }
    stats
}

const fn worker_share(searches: usize, workers: usize, worker: usize) -> usize {
    let base = searches / workers;
    if worker < searches % workers {
        base.saturating_add(1)
    } else {
        base
    }
}

fn run_worker(
    config: &SearchConfig,
    seed: u64,
    searches: usize,
    exit_flag: &AtomicBool,
) -> Result<(StatsAccumulator, usize), StatsError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut stats = StatsAccumulator::new();
    let mut completed = 0usize;
    for _ in 0..searches {
        if exit_flag.load(Ordering::SeqCst) {
            break;
        }
        let target = rng.random_range(1..=config.tricks);
        let mut search_rng = StdRng::seed_from_u64(rng.random());
        TrickSearch::new(&mut search_rng, &mut stats, config.max_branching, target)
            .run(config.tricks)?;
        completed = completed.saturating_add(1);
    }
    Ok((stats, completed))
}

/// Runs one round of `config.searches` searches over `num_threads` workers and
/// merges every worker's counters into `shared`. Returns the number of
/// searches completed before `exit_flag` was raised.
pub fn run_session(
    config: &SearchConfig,
    round: usize,
    num_threads: usize,
    shared: &Mutex<StatsAccumulator>,
    exit_flag: &AtomicBool,
) -> Result<usize, StatsError> {
    let workers = num_threads.max(1);
    let round_index = u64::try_from(round).unwrap_or(u64::MAX);
    let round_seed = config
        .seed
        .wrapping_add(round_index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    thread::scope(|scope| -> Result<usize, StatsError> {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let seed = round_seed ^ u64::try_from(worker).unwrap_or(u64::MAX);
                let searches = worker_share(config.searches, workers, worker);
                scope.spawn(move || -> Result<usize, StatsError> {
                    let (stats, completed) = run_worker(config, seed, searches, exit_flag)?;
                    shared.lock().absorb(&stats);
                    debug!("线程 {worker} 完成 {completed} 次搜索");
                    Ok(completed)
                })
            })
            .collect();
        let mut total = 0usize;
        for handle in handles {
            let completed = handle
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload))?;
            total = total.saturating_add(completed);
        }
        Ok(total)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SearchConfig {
        SearchConfig {
            tricks: 2,
            max_branching: 3,
            searches: 10,
            rounds: 1,
            seed: 11,
            num_threads: Some(3),
        }
    }

    #[test]
    fn shares_cover_all_searches() {
        let total: usize = (0..3).map(|w| worker_share(10, 3, w)).sum();
        assert_eq!(total, 10);
        assert_eq!(worker_share(10, 3, 0), 4);
        assert_eq!(worker_share(10, 3, 2), 3);
    }

    #[test]
    fn session_merges_workers_consistently() {
        let config = small_config();
        let shared = Mutex::new(StatsAccumulator::new());
        let exit_flag = AtomicBool::new(false);
        let done = run_session(&config, 0, 3, &shared, &exit_flag).unwrap();
        assert_eq!(done, 10);
        let mut stats = shared.into_inner();
        let summary = stats.fold_epoch();
        assert!(summary.is_consistent());
        assert_eq!(stats.total_nodes(), summary.combined());
    }

    #[test]
    fn raised_exit_flag_stops_before_searching() {
        let shared = Mutex::new(StatsAccumulator::new());
        let exit_flag = AtomicBool::new(true);
        let done = run_session(&small_config(), 0, 2, &shared, &exit_flag).unwrap();
        assert_eq!(done, 0);
        assert_eq!(shared.lock().total_nodes(), 0);
    }

    #[test]
    fn configured_names_win_over_outcome_labels() {
        let config = StatsConfig {
            position_names: vec!["Leaf".to_string()],
            ..StatsConfig::default()
        };
        let stats = configured_accumulator(&config);
        assert_eq!(stats.position_name(0), Some("Leaf"));
        assert_eq!(stats.position_name(3), Some("Cutoff"));
        assert_eq!(stats.position_name(5), Some("Position 5"));
    }
}
