use std::fmt;

use smallvec::SmallVec;

use super::{SIDE_COUNT, counters::CumulativeCounters, counters::SideTotal, side::SideAggregate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckedField {
    Sum,
    SumWeighted,
    SumCum,
    SumCumWeighted,
}

impl CheckedField {
    pub const ALL: [Self; 4] = [Self::Sum, Self::SumWeighted, Self::SumCum, Self::SumCumWeighted];

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::SumWeighted => "sumw",
            Self::SumCum => "sumc",
            Self::SumCumWeighted => "sumcw",
        }
    }
}

/// A side aggregate field that disagrees with its independently derived total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub side: usize,
    pub field: CheckedField,
    pub incremental: u64,
    pub derived: u64,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{side}{tag} {incremental} {derived}",
            side = self.side,
            tag = self.field.tag(),
            incremental = self.incremental,
            derived = self.derived,
        )
    }
}

/// At most one mismatch per side and field.
pub type Mismatches = SmallVec<[Mismatch; 8]>;

/// Result of folding one epoch into the cumulative totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpochSummary {
    pub totals: [SideTotal; SIDE_COUNT],
    pub mismatches: Mismatches,
}

impl EpochSummary {
    #[must_use]
    pub const fn combined(&self) -> u64 {
        self.totals[0].count.saturating_add(self.totals[1].count)
    }

    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Compares every side aggregate field against the epoch-derived totals and
/// the already folded cumulative totals. Sides are visited 1 then 0.
pub(crate) fn check_consistency(
    sides: &[SideAggregate; SIDE_COUNT],
    totals: &[SideTotal; SIDE_COUNT],
    cumulative: &CumulativeCounters,
) -> Mismatches {
    let mut mismatches = Mismatches::new();
    for field in CheckedField::ALL {
        for side in (0..SIDE_COUNT).rev() {
            let aggregate = &sides[side];
            let (incremental, derived) = match field {
                CheckedField::Sum => (aggregate.sum, totals[side].count),
                CheckedField::SumWeighted => (aggregate.sum_weighted, totals[side].weighted),
                CheckedField::SumCum => (aggregate.sum_cum, cumulative.score_cum[side]),
                CheckedField::SumCumWeighted => {
                    (aggregate.sum_cum_weighted, cumulative.weighted_score_cum[side])
                }
            };
            if incremental != derived {
                mismatches.push(Mismatch {
                    side,
                    field,
                    incremental,
                    derived,
                });
            }
        }
    }
    mismatches
}
