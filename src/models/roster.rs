//! Roster cohort normalization.
//!
//! The engine expects every entry-year cohort it schedules to exist. These
//! helpers top cohorts up to a target size before a run.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use super::Resident;

/// Number of residents per entry year.
pub fn cohort_counts(residents: &[Resident]) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for r in residents {
        *counts.entry(r.entry_year).or_insert(0) += 1;
    }
    counts
}

/// Adds undecided residents until every entry year in `entry_years` has at
/// least `per_cohort` residents.
///
/// New residents get sequential IDs `R###` and names `Resident N`, numbered
/// from the current roster size. Returns the IDs added.
pub fn ensure_cohorts(
    residents: &mut Vec<Resident>,
    entry_years: RangeInclusive<i32>,
    per_cohort: usize,
) -> Vec<String> {
    let mut added = Vec::new();
    for entry_year in entry_years {
        let existing = residents.iter().filter(|r| r.entry_year == entry_year).count();
        for _ in existing..per_cohort {
            let n = residents.len() + 1;
            let resident =
                Resident::new(format!("R{n:03}"), entry_year).with_name(format!("Resident {n}"));
            added.push(resident.id.clone());
            residents.push(resident);
        }
    }

    if !added.is_empty() {
        tracing::debug!(added = added.len(), "Normalized roster cohorts");
    }
    added
}
