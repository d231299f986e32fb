use std::collections::{BTreeMap, BTreeSet};

use super::model::{CrashTable, Month};

/// Distinct month labels a year needs to count as complete.
pub const MONTHS_PER_YEAR: usize = Month::ALL.len();

// ---------------------------------------------------------------------------
// Year completeness: keep only years with every month represented
// ---------------------------------------------------------------------------

/// Outcome of the completeness filter.
#[derive(Debug, Clone)]
pub struct YearCompleteness {
    /// Years with [`MONTHS_PER_YEAR`] distinct month labels.
    pub complete_years: BTreeSet<i32>,
    /// Every other year, with its distinct month count.
    pub excluded_years: BTreeMap<i32, usize>,
    /// Source rows restricted to `complete_years`, in original order.
    pub table: CrashTable,
}

/// Count distinct `Month Of Year` labels per loss year.
///
/// Rows with a null year or null month don't contribute. The labels are not
/// checked against the calendar: twelve distinct labels count as twelve
/// months even when one of them is a misspelling.
pub fn months_per_year(table: &CrashTable) -> BTreeMap<i32, usize> {
    let mut months: BTreeMap<i32, BTreeSet<&str>> = BTreeMap::new();
    for record in &table.records {
        let Some(year) = record.loss_year else {
            continue;
        };
        let entry = months.entry(year).or_default();
        if let Some(month) = record.month.as_deref() {
            entry.insert(month);
        }
    }
    months
        .into_iter()
        .map(|(year, labels)| (year, labels.len()))
        .collect()
}

/// Split years into complete / excluded and restrict the table to the
/// complete ones. Partial years are dropped entirely.
pub fn filter_complete_years(table: &CrashTable) -> YearCompleteness {
    let (complete, excluded): (BTreeMap<i32, usize>, BTreeMap<i32, usize>) =
        months_per_year(table)
            .into_iter()
            .partition(|(_, n)| *n == MONTHS_PER_YEAR);

    let complete_years: BTreeSet<i32> = complete.into_keys().collect();

    log::info!("Years with all {MONTHS_PER_YEAR} months: {complete_years:?}");
    for (year, n) in &excluded {
        log::warn!("Excluding {year}: only {n} distinct months present");
    }

    let filtered = table.restrict_to_years(&complete_years);
    if filtered.is_empty() {
        log::warn!("No year has all {MONTHS_PER_YEAR} months; every aggregate will be empty");
    }
    log::debug!(
        "Completeness filter kept {} of {} rows",
        filtered.len(),
        table.len()
    );

    YearCompleteness {
        complete_years,
        excluded_years: excluded,
        table: filtered,
    }
}
