use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{debug, warn};

use super::{
    POSITION_COUNT, SIDE_COUNT, StatsError,
    check::{EpochSummary, check_consistency},
    check_depth,
    counters::{CumulativeCounters, EpochCounters},
    report::{ReportView, render},
    side::SideAggregate,
    side_index,
    sink::ReportSink,
};
use crate::config::StatsConfig;

/// Owns every statistics counter of one search session.
///
/// Lifecycle: construct, `record_*` from the search loop, `generate_report`,
/// then `reset_epoch` / `reset_cumulative` to start the next window.
///
/// Each report folds the current epoch into the cumulative totals. Reporting
/// twice without recording in between therefore folds the same epoch twice,
/// and the second report flags the cumulative side totals as diverging from
/// the incrementally maintained ones.
pub struct StatsAccumulator {
    names: [String; POSITION_COUNT],
    epoch: EpochCounters,
    cumulative: CumulativeCounters,
    sides: [SideAggregate; SIDE_COUNT],
    sink: ReportSink,
    details: bool,
}

impl StatsAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: std::array::from_fn(default_name),
            epoch: EpochCounters::new(),
            cumulative: CumulativeCounters::new(),
            sides: [SideAggregate::new(), SideAggregate::new()],
            sink: ReportSink::new(),
            details: cfg!(feature = "ab-details"),
        }
    }

    #[must_use]
    pub fn from_config(config: &StatsConfig) -> Self {
        let mut stats = Self::new();
        for (index, label) in config.position_names.iter().enumerate() {
            stats.set_position_name(index, label.as_str());
        }
        if let Some(path) = &config.report_file {
            stats.set_report_file(path.clone());
        }
        stats.details |= config.details;
        stats
    }

    pub fn set_position_name(&mut self, index: usize, label: impl Into<String>) {
        if let Some(name) = self.names.get_mut(index) {
            *name = label.into();
        }
    }

    #[must_use]
    pub fn position_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Takes effect only before the first report; the sink is opened once.
    pub fn set_report_file(&mut self, path: impl Into<PathBuf>) {
        self.sink.set_path(path.into());
    }

    #[must_use]
    pub fn report_file(&self) -> Option<&Path> {
        self.sink.path()
    }

    pub const fn set_details(&mut self, details: bool) {
        self.details = details;
    }

    /// Counts one terminated node. An unknown `position` is ignored.
    pub fn record_event(
        &mut self,
        position: usize,
        side: bool,
        depth: usize,
    ) -> Result<(), StatsError> {
        check_depth(depth)?;
        if position >= POSITION_COUNT {
            return Ok(());
        }
        let side = side_index(side);
        self.epoch.record_event(position, side, depth);
        self.sides[side].record(depth);
        Ok(())
    }

    pub fn record_node_visit(&mut self, depth: usize) -> Result<(), StatsError> {
        check_depth(depth)?;
        self.epoch.record_node(depth);
        self.cumulative.record_node(depth);
        Ok(())
    }

    #[must_use]
    pub const fn total_nodes(&self) -> u64 {
        self.epoch.all_nodes
    }

    #[must_use]
    pub const fn epoch(&self) -> &EpochCounters {
        &self.epoch
    }

    #[must_use]
    pub const fn cumulative(&self) -> &CumulativeCounters {
        &self.cumulative
    }

    #[must_use]
    pub const fn side_aggregate(&self, side: bool) -> &SideAggregate {
        &self.sides[side_index(side)]
    }

    pub fn reset_epoch(&mut self) {
        self.epoch = EpochCounters::new();
        for side in &mut self.sides {
            side.reset_epoch();
        }
        debug!("统计窗口已清零");
    }

    pub fn reset_cumulative(&mut self) {
        self.cumulative = CumulativeCounters::new();
        for side in &mut self.sides {
            side.reset_cumulative();
        }
        debug!("累计统计已清零");
    }

    /// Folds the epoch into the cumulative totals and cross-checks the two
    /// side accounts. Mismatches are returned, never corrected.
    pub fn fold_epoch(&mut self) -> EpochSummary {
        let totals = self.epoch.side_totals();
        self.cumulative.fold(&self.epoch, &totals);
        let mismatches = check_consistency(&self.sides, &totals, &self.cumulative);
        for mismatch in &mismatches {
            warn!("统计账目不一致: {mismatch}");
        }
        EpochSummary { totals, mismatches }
    }

    pub fn write_report(&mut self, out: &mut impl Write) -> io::Result<EpochSummary> {
        let summary = self.fold_epoch();
        let view = ReportView {
            names: &self.names,
            epoch: &self.epoch,
            cumulative: &self.cumulative,
            summary: &summary,
            details: self.details,
        };
        render(&view, out)?;
        Ok(summary)
    }

    /// Folds, checks and writes the report to the configured file, or to
    /// standard output. Write failures are logged and otherwise ignored.
    pub fn generate_report(&mut self) {
        let mut buffer = Vec::new();
        if let Err(err) = self.write_report(&mut buffer) {
            warn!("生成统计报告失败: {err}");
            return;
        }
        if let Err(err) = self.sink.write_report(&buffer) {
            warn!("写入统计报告失败: {err}");
        }
    }

    /// Adds another accumulator's counters field by field. Names, sink and
    /// detail mode of `self` are kept.
    pub fn absorb(&mut self, other: &Self) {
        self.epoch.add_assign(&other.epoch);
        self.cumulative.add_assign(&other.cumulative);
        for (mine, theirs) in self.sides.iter_mut().zip(&other.sides) {
            mine.add_assign(theirs);
        }
    }
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

fn default_name(index: usize) -> String {
    format!("Position {index}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{MAX_DEPTH, SideTotal};

    fn report(stats: &mut StatsAccumulator) -> String {
        let mut buffer = Vec::new();
        stats.write_report(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn record_event_updates_both_accounts() {
        let mut stats = StatsAccumulator::new();
        stats.record_event(3, true, 10).unwrap();
        stats.record_event(3, false, 2).unwrap();
        assert_eq!(stats.epoch().position_at_depth(3, 10), 1);
        assert_eq!(stats.epoch().position_count(3), 2);
        assert_eq!(stats.epoch().position_weighted(3), 12);
        assert_eq!(stats.epoch().score(true, 10), 1);
        let side1 = stats.side_aggregate(true);
        assert_eq!(side1.at_depth(10), 1);
        assert_eq!((side1.sum(), side1.sum_weighted()), (1, 10));
        assert_eq!((side1.sum_cum(), side1.sum_cum_weighted()), (1, 10));
    }

    #[test]
    fn unknown_position_is_ignored() {
        let mut stats = StatsAccumulator::new();
        assert_eq!(stats.record_event(POSITION_COUNT, true, 1), Ok(()));
        assert_eq!(stats.epoch(), &EpochCounters::new());
        assert_eq!(stats.side_aggregate(true), &SideAggregate::new());
    }

    #[test]
    fn out_of_range_depth_is_rejected() {
        let mut stats = StatsAccumulator::new();
        let expected = Err(StatsError::DepthOutOfRange {
            depth: MAX_DEPTH,
            max: MAX_DEPTH,
        });
        assert_eq!(stats.record_event(0, false, MAX_DEPTH), expected);
        assert_eq!(stats.record_event(POSITION_COUNT, false, MAX_DEPTH), expected);
        assert_eq!(stats.record_node_visit(MAX_DEPTH), expected);
        assert_eq!(stats.total_nodes(), 0);
        assert_eq!(stats.side_aggregate(false).sum(), 0);
    }

    #[test]
    fn node_visits_feed_epoch_and_cumulative() {
        let mut stats = StatsAccumulator::new();
        for _ in 0..3 {
            stats.record_node_visit(8).unwrap();
        }
        assert_eq!(stats.total_nodes(), 3);
        assert_eq!(stats.epoch().nodes(8), 3);
        assert_eq!(stats.cumulative().nodes_cum(8), 3);
        assert_eq!(stats.cumulative().all_nodes_cum(), 0);
    }

    #[test]
    fn position_names_respect_bounds() {
        let mut stats = StatsAccumulator::new();
        assert_eq!(stats.position_name(4), Some("Position 4"));
        stats.set_position_name(4, "Quick tricks");
        stats.set_position_name(POSITION_COUNT, "ignored");
        assert_eq!(stats.position_name(4), Some("Quick tricks"));
        assert_eq!(stats.position_name(POSITION_COUNT), None);
    }

    #[test]
    fn fold_is_consistent_for_a_clean_event_stream() {
        let mut stats = StatsAccumulator::new();
        stats.record_event(0, true, 3).unwrap();
        stats.record_event(1, false, 5).unwrap();
        let summary = stats.fold_epoch();
        assert!(summary.is_consistent());
        assert_eq!(summary.totals[1], SideTotal { count: 1, weighted: 3 });
        assert_eq!(summary.totals[0], SideTotal { count: 1, weighted: 5 });
        assert_eq!(stats.cumulative().position_count(1), 1);
    }

    #[test]
    fn second_fold_without_events_flags_cumulative_drift() {
        let mut stats = StatsAccumulator::new();
        stats.record_event(0, true, 3).unwrap();
        assert!(stats.fold_epoch().is_consistent());
        let summary = stats.fold_epoch();
        assert_eq!(summary.totals[1], SideTotal { count: 1, weighted: 3 });
        assert_eq!(stats.cumulative().side_total(true).count, 2);
        let lines: Vec<String> = summary.mismatches.iter().map(ToString::to_string).collect();
        assert_eq!(lines, vec!["1sumc 1 2", "1sumcw 3 6"]);
    }

    #[test]
    fn reset_epoch_keeps_cumulative() {
        let mut stats = StatsAccumulator::new();
        stats.record_event(2, false, 6).unwrap();
        stats.record_node_visit(6).unwrap();
        stats.fold_epoch();
        stats.reset_epoch();
        assert_eq!(stats.total_nodes(), 0);
        assert_eq!(stats.side_aggregate(false).sum(), 0);
        assert_eq!(stats.side_aggregate(false).sum_cum(), 1);
        assert_eq!(stats.cumulative().position_count(2), 1);

        let text = report(&mut stats);
        let row = text
            .lines()
            .find(|line| line.starts_with(" 2 "))
            .expect("position 2 row");
        assert!(row.contains("Position 2"));
        let fields: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(fields[3], "0");
        assert_eq!(fields[4], "1");
        assert!(!text.contains("sum"));
    }

    #[test]
    fn reset_cumulative_keeps_epoch() {
        let mut stats = StatsAccumulator::new();
        stats.record_event(2, true, 6).unwrap();
        stats.record_node_visit(6).unwrap();
        stats.fold_epoch();
        stats.reset_epoch();
        stats.reset_cumulative();
        assert_eq!(stats.cumulative(), &CumulativeCounters::new());
        assert_eq!(stats.side_aggregate(true).sum_cum(), 0);

        stats.record_event(5, true, 9).unwrap();
        stats.record_node_visit(9).unwrap();
        let summary = stats.fold_epoch();
        assert!(summary.is_consistent());
        assert_eq!(stats.cumulative().side_total(true), summary.totals[1]);
        assert_eq!(stats.cumulative().all_nodes_cum(), 1);
        assert_eq!(stats.cumulative().position_count(2), 0);
    }

    #[test]
    fn absorb_merges_worker_counters() {
        let mut merged = StatsAccumulator::new();
        merged.set_position_name(0, "Terminal");
        let mut worker = StatsAccumulator::new();
        worker.record_event(0, true, 4).unwrap();
        worker.record_node_visit(4).unwrap();
        merged.absorb(&worker);
        merged.absorb(&worker);
        assert_eq!(merged.total_nodes(), 2);
        assert_eq!(merged.side_aggregate(true).sum_cum(), 2);
        assert_eq!(merged.position_name(0), Some("Terminal"));
        assert!(merged.fold_epoch().is_consistent());
    }

    #[test]
    fn details_flag_adds_breakdown() {
        let mut stats = StatsAccumulator::new();
        stats.set_details(true);
        stats.record_event(1, false, 2).unwrap();
        let text = report(&mut stats);
        assert!(text.lines().any(|line| line.starts_with(" S ")));
    }
}
