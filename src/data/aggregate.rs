use std::collections::{BTreeMap, BTreeSet};

use super::model::{CrashRecord, CrashTable, Month, TimeBand, Weekday, cmp_by_order};
use crate::error::CrashDataError;

// ---------------------------------------------------------------------------
// Day × time totals
// ---------------------------------------------------------------------------

/// Sum of `Total Crashes` for one (day, time band) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTimeTotal {
    pub day: String,
    pub time_band: String,
    pub total: u64,
}

/// Sum crashes per (day of week, time category). Rows with either key null
/// are skipped; pairs with no rows are omitted rather than zero-filled.
///
/// Output follows the weekday table, then the time-band table.
pub fn crashes_by_day_time(table: &CrashTable) -> Vec<DayTimeTotal> {
    let mut sums: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for record in &table.records {
        if let (Some(day), Some(time)) = (
            record.day_of_week.as_deref(),
            record.time_category.as_deref(),
        ) {
            *sums.entry((day, time)).or_default() += record.crashes();
        }
    }

    let mut totals: Vec<DayTimeTotal> = sums
        .into_iter()
        .map(|((day, time_band), total)| DayTimeTotal {
            day: day.to_string(),
            time_band: time_band.to_string(),
            total,
        })
        .collect();
    totals.sort_by(|a, b| {
        cmp_by_order(&a.day, &b.day, Weekday::from_label)
            .then_with(|| cmp_by_order(&a.time_band, &b.time_band, TimeBand::from_label))
    });
    totals
}

/// Distinct values of `key` across `totals`, in first-seen order.
pub fn distinct_in_order<'a>(
    totals: &'a [DayTimeTotal],
    key: impl Fn(&'a DayTimeTotal) -> &'a str,
) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    totals
        .iter()
        .map(key)
        .filter(|v| seen.insert(*v))
        .collect()
}

/// Time bands for the grouped bar legend: every known band in display order,
/// then any unrecognised bands found in `totals`, sorted.
pub fn time_band_order(totals: &[DayTimeTotal]) -> Vec<&str> {
    let mut bands: Vec<&str> = TimeBand::ALL.iter().map(|t| t.label()).collect();
    let mut unknown: Vec<&str> = distinct_in_order(totals, |t| t.time_band.as_str())
        .into_iter()
        .filter(|b| TimeBand::from_label(b).is_none())
        .collect();
    unknown.sort_unstable();
    bands.extend(unknown);
    bands
}

// ---------------------------------------------------------------------------
// Average monthly totals
// ---------------------------------------------------------------------------

/// Mean across years of the per-(year, month) crash sums.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAverage {
    pub month: String,
    /// 1-based calendar number; `None` for labels outside the month table.
    pub month_number: Option<u32>,
    pub average: f64,
    /// How many (year, month) sums went into `average`.
    pub years: usize,
}

impl MonthlyAverage {
    /// Value printed next to the marker: nearest integer, ties to even.
    pub fn rounded(&self) -> f64 {
        self.average.round_ties_even()
    }
}

/// Sum crashes per (year, month), then average those sums per month.
///
/// Output is chronological; unknown month labels come last.
pub fn average_crashes_per_month(table: &CrashTable) -> Vec<MonthlyAverage> {
    let mut per_year_month: BTreeMap<(i32, &str), u64> = BTreeMap::new();
    for record in &table.records {
        if let (Some(year), Some(month)) = (record.loss_year, record.month.as_deref()) {
            *per_year_month.entry((year, month)).or_default() += record.crashes();
        }
    }

    let mut per_month: BTreeMap<&str, (u64, usize)> = BTreeMap::new();
    for ((_, month), sum) in per_year_month {
        let acc = per_month.entry(month).or_default();
        acc.0 += sum;
        acc.1 += 1;
    }

    let mut averages: Vec<MonthlyAverage> = per_month
        .into_iter()
        .map(|(month, (sum, years))| MonthlyAverage {
            month: month.to_string(),
            month_number: Month::from_label(month).map(Month::number),
            average: sum as f64 / years as f64,
            years,
        })
        .collect();
    averages.sort_by(|a, b| cmp_by_order(&a.month, &b.month, Month::from_label));
    averages
}

// ---------------------------------------------------------------------------
// Severity distribution
// ---------------------------------------------------------------------------

/// Number of rows carrying one severity label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityCount {
    pub severity: String,
    pub count: u64,
}

/// Count rows per severity label, most frequent first (ties by label).
/// Rows with a null severity are not counted.
pub fn severity_distribution(table: &CrashTable) -> Vec<SeverityCount> {
    count_severities(table.records.iter())
}

fn count_severities<'a>(records: impl Iterator<Item = &'a CrashRecord>) -> Vec<SeverityCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        if let Some(severity) = record.severity.as_deref() {
            *counts.entry(severity).or_default() += 1;
        }
    }
    let mut out: Vec<SeverityCount> = counts
        .into_iter()
        .map(|(severity, count)| SeverityCount {
            severity: severity.to_string(),
            count,
        })
        .collect();
    // BTreeMap iteration is label-ordered, and the sort is stable
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// Each count as a percentage of the total.
pub fn percentages(counts: &[SeverityCount]) -> Vec<(String, f64)> {
    let total: u64 = counts.iter().map(|c| c.count).sum();
    counts
        .iter()
        .map(|c| (c.severity.clone(), c.count as f64 / total as f64 * 100.0))
        .collect()
}

// ---------------------------------------------------------------------------
// Severity by road-user involvement
// ---------------------------------------------------------------------------

/// Subsets selected by a `"Yes"` flag. A crash may belong to both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Involvement {
    Cyclist,
    Pedestrian,
}

impl Involvement {
    pub const ALL: [Involvement; 2] = [Involvement::Cyclist, Involvement::Pedestrian];

    pub fn label(self) -> &'static str {
        match self {
            Involvement::Cyclist => "Cyclist Crashes",
            Involvement::Pedestrian => "Pedestrian Crashes",
        }
    }

    pub fn matches(self, record: &CrashRecord) -> bool {
        match self {
            Involvement::Cyclist => record.involves_cyclist(),
            Involvement::Pedestrian => record.involves_pedestrian(),
        }
    }
}

/// Severity mix of one involvement subset.
#[derive(Debug, Clone, PartialEq)]
pub struct InvolvementRow {
    pub involvement: Involvement,
    /// Rows in the subset with a severity label.
    pub rows: u64,
    /// Severity label → percentage of `rows`.
    pub percentages: BTreeMap<String, f64>,
}

impl InvolvementRow {
    /// Percentage for `severity`, 0 when the subset has none.
    pub fn percentage(&self, severity: &str) -> f64 {
        self.percentages.get(severity).copied().unwrap_or(0.0)
    }
}

/// Two-row table: one row per [`Involvement`], one column per severity.
#[derive(Debug, Clone, PartialEq)]
pub struct InvolvementSeverity {
    /// Sorted union of the severity labels of both subsets.
    pub severities: Vec<String>,
    pub rows: Vec<InvolvementRow>,
}

/// Severity percentages for cyclist-flagged and pedestrian-flagged rows,
/// each subset normalised independently.
///
/// Fails with [`CrashDataError::EmptySubset`] if either subset has no rows
/// with a severity label.
pub fn involvement_severity(table: &CrashTable) -> Result<InvolvementSeverity, CrashDataError> {
    let rows = Involvement::ALL
        .into_iter()
        .map(|involvement| {
            let counts = count_severities(table.records.iter().filter(|r| involvement.matches(r)));
            let total: u64 = counts.iter().map(|c| c.count).sum();
            if total == 0 {
                return Err(CrashDataError::EmptySubset(involvement.label()));
            }
            log::debug!("{}: {total} rows", involvement.label());
            Ok(InvolvementRow {
                involvement,
                rows: total,
                percentages: percentages(&counts).into_iter().collect(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let severities: BTreeSet<&String> = rows.iter().flat_map(|r| r.percentages.keys()).collect();
    let severities = severities.into_iter().cloned().collect();

    Ok(InvolvementSeverity { severities, rows })
}
