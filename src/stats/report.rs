use std::io::{self, Write};

use super::{
    MAX_DEPTH, PLIES_PER_TRICK, POSITION_COUNT, check::EpochSummary,
    counters::CumulativeCounters, counters::EpochCounters, depth_weight,
};
use crate::utils::{ratio, to_f64};

const RULE_WIDE: &str = "-----------------------------------------------------------------";
const RULE_NODES: &str = "------------------------------------------";
const RULE_DETAILS: &str = "-----------------------------------------------------------";

/// Already folded state handed to the renderer. Rendering never mutates it.
pub(crate) struct ReportView<'a> {
    pub names: &'a [String; POSITION_COUNT],
    pub epoch: &'a EpochCounters,
    pub cumulative: &'a CumulativeCounters,
    pub summary: &'a EpochSummary,
    pub details: bool,
}

fn cell(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(String::new, |v| format!("{v:.precision$}"))
}

fn percent(part: u64, total: u64) -> Option<f64> {
    ratio(part, total).map(|r| r * 100.0)
}

fn average(weighted: u64, count: u64) -> Option<f64> {
    ratio(weighted, count)
}

pub(crate) fn render(view: &ReportView<'_>, out: &mut impl Write) -> io::Result<()> {
    for mismatch in &view.summary.mismatches {
        writeln!(out, "{mismatch}")?;
    }
    write_side_and_positions(view, out)?;
    write_nodes(view, out)?;
    write_totals(view, out)?;
    if view.details {
        write_details(view, out)?;
    }
    Ok(())
}

struct Row<'a> {
    number: String,
    label: &'a str,
    count: u64,
    percent: Option<f64>,
    avg: Option<f64>,
    cum_count: u64,
    cum_percent: Option<f64>,
    cum_avg: Option<f64>,
}

fn write_row(out: &mut impl Write, row: &Row<'_>) -> io::Result<()> {
    writeln!(
        out,
        "{number:>2} {label:<20} {count:>8} {pct:>5} {avg:>5} {cum_count:>8} {cum_pct:>5} {cum_avg:>5}",
        number = row.number,
        label = row.label,
        count = row.count,
        pct = cell(row.percent, 1),
        avg = cell(row.avg, 1),
        cum_count = row.cum_count,
        cum_pct = cell(row.cum_percent, 1),
        cum_avg = cell(row.cum_avg, 1),
    )
}

fn write_side_and_positions(view: &ReportView<'_>, out: &mut impl Write) -> io::Result<()> {
    let combined = view.summary.combined();
    let cum_side1 = view.cumulative.side_total(true);
    let cum_side0 = view.cumulative.side_total(false);
    let cum_combined = cum_side1.count.saturating_add(cum_side0.count);
    if combined == 0 && cum_combined == 0 {
        return Ok(());
    }

    writeln!(
        out,
        "{:>2} {:<20} {:>8} {:>5} {:>5} {:>8} {:>5} {:>5}",
        "No", "Return", "Count", "%", "d_avg", "Cumul", "%", "d_avg"
    )?;
    writeln!(out, "{RULE_WIDE}")?;

    for (label, side, cum) in [("Side1", 1, cum_side1), ("Side0", 0, cum_side0)] {
        let total = view.summary.totals[side];
        write_row(
            out,
            &Row {
                number: String::new(),
                label,
                count: total.count,
                percent: percent(total.count, combined),
                avg: average(total.weighted, total.count),
                cum_count: cum.count,
                cum_percent: percent(cum.count, cum_combined),
                cum_avg: average(cum.weighted, cum.count),
            },
        )?;
    }
    writeln!(out)?;

    for (position, name) in view.names.iter().enumerate() {
        let count = view.epoch.position_count(position);
        let cum_count = view.cumulative.position_count(position);
        if count == 0 && cum_count == 0 {
            continue;
        }
        write_row(
            out,
            &Row {
                number: position.to_string(),
                label: name,
                count,
                percent: percent(count, combined),
                avg: average(view.epoch.position_weighted(position), count),
                cum_count,
                cum_percent: percent(cum_count, cum_combined),
                cum_avg: average(view.cumulative.position_weighted(position), cum_count),
            },
        )?;
    }
    Ok(())
}

/// Ratio of cumulative nodes one ply into a trick to the same ply one trick
/// earlier in the search (deeper `depth` means earlier).
pub(crate) fn branching_factor(cumulative: &CumulativeCounters, depth: usize) -> Option<f64> {
    if depth % PLIES_PER_TRICK != 1 {
        return None;
    }
    let previous = depth.checked_add(PLIES_PER_TRICK).filter(|&d| d < MAX_DEPTH)?;
    ratio(cumulative.nodes_cum(depth), cumulative.nodes_cum(previous))
}

fn write_nodes(view: &ReportView<'_>, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "\n{:>5} {:>6} {:>6} {:>5} {:>5} {:>6}",
        "Depth", "Nodes", "Cumul", "Cum%", "Cumc%", "Branch"
    )?;
    writeln!(out, "{RULE_NODES}")?;

    let all_cum = view.cumulative.all_nodes_cum();
    let mut running = 0u64;
    for depth in (0..MAX_DEPTH).rev() {
        let nodes_cum = view.cumulative.nodes_cum(depth);
        if nodes_cum == 0 {
            continue;
        }
        running = running.saturating_add(nodes_cum);
        write!(
            out,
            "{depth:>5} {nodes:>6} {nodes_cum:>6} {pct:>5} {running_pct:>5}",
            nodes = view.epoch.nodes(depth),
            pct = cell(percent(nodes_cum, all_cum), 1),
            running_pct = cell(percent(running, all_cum), 1),
        )?;
        if let Some(branch) = branching_factor(view.cumulative, depth) {
            write!(out, " {branch:5.2}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn weighted_nodes(per_depth: impl Fn(usize) -> u64) -> f64 {
    (0..MAX_DEPTH)
        .map(|depth| to_f64(depth_weight(depth).saturating_mul(per_depth(depth))))
        .sum()
}

fn write_totals(view: &ReportView<'_>, out: &mut impl Write) -> io::Result<()> {
    let all_nodes = view.epoch.all_nodes();
    let all_cum = view.cumulative.all_nodes_cum();
    writeln!(out, "\n{:<5} {all_nodes:>6} {all_cum:>6}", "Total")?;

    let cum_avg = (all_cum > 0)
        .then(|| weighted_nodes(|d| view.cumulative.nodes_cum(d)) / to_f64(all_cum));
    if all_nodes > 0 {
        let avg = weighted_nodes(|d| view.epoch.nodes(d)) / to_f64(all_nodes);
        writeln!(out, "{:<5} {avg:>6.1} {cum:>6}", "d_avg", cum = cell(cum_avg, 1))?;
    } else if cum_avg.is_some() {
        writeln!(out, "\n{:<5} {:>6} {cum:>6}", "Avg", "-", cum = cell(cum_avg, 1))?;
    }

    let diff = i128::from(all_nodes)
        - i128::from(view.summary.totals[1].count)
        - i128::from(view.summary.totals[0].count);
    writeln!(out, "{:<5} {diff:>6}\n\n", "Diff")
}

fn write_details(view: &ReportView<'_>, out: &mut impl Write) -> io::Result<()> {
    write!(out, "{:>2} {:>6} {:>6}", "d", "Side1", "Side0")?;
    for position in 0..POSITION_COUNT {
        write!(out, " {position:>5}")?;
    }
    writeln!(out, "\n{RULE_DETAILS}")?;

    for depth in (0..MAX_DEPTH).rev() {
        let side1 = view.epoch.score(true, depth);
        let side0 = view.epoch.score(false, depth);
        if side1 == 0 && side0 == 0 {
            continue;
        }
        write!(out, "{depth:>2} {side1:>6} {side0:>6}")?;
        for position in 0..POSITION_COUNT {
            write!(out, " {:>5}", view.epoch.position_at_depth(position, depth))?;
        }
        writeln!(out)?;
    }

    writeln!(out, "{RULE_DETAILS}")?;
    write!(
        out,
        "{:>2} {:>6} {:>6}",
        "S", view.summary.totals[1].count, view.summary.totals[0].count
    )?;
    for position in 0..POSITION_COUNT {
        write!(out, " {:>5}", view.epoch.position_count(position))?;
    }
    writeln!(out, "\n")
}
