use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Column names – exact, case-sensitive header labels
// ---------------------------------------------------------------------------

pub const COL_YEAR: &str = "Date Of Loss Year";
pub const COL_MONTH: &str = "Month Of Year";
pub const COL_DAY: &str = "Day Of Week";
pub const COL_TIME: &str = "Time Category";
pub const COL_TOTAL: &str = "Total Crashes";
pub const COL_SEVERITY: &str = "Crash Severity";
pub const COL_CYCLIST: &str = "Cyclist Flag";
pub const COL_PEDESTRIAN: &str = "Pedestrian Flag";

/// Every column the analysis reads, in preview order.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_YEAR,
    COL_MONTH,
    COL_DAY,
    COL_TIME,
    COL_TOTAL,
    COL_SEVERITY,
    COL_CYCLIST,
    COL_PEDESTRIAN,
];

/// Flag value marking a crash as involving a cyclist / pedestrian.
pub const FLAG_YES: &str = "Yes";

// ---------------------------------------------------------------------------
// CrashRecord – one row of the source table
// ---------------------------------------------------------------------------

/// One crash-aggregate bucket. Empty cells are `None`, so null keys drop out
/// of groupings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CrashRecord {
    #[serde(rename = "Date Of Loss Year")]
    pub loss_year: Option<i32>,
    #[serde(rename = "Month Of Year")]
    pub month: Option<String>,
    #[serde(rename = "Day Of Week")]
    pub day_of_week: Option<String>,
    #[serde(rename = "Time Category")]
    pub time_category: Option<String>,
    #[serde(rename = "Total Crashes")]
    pub total_crashes: Option<u64>,
    #[serde(rename = "Crash Severity")]
    pub severity: Option<String>,
    #[serde(rename = "Cyclist Flag")]
    pub cyclist_flag: Option<String>,
    #[serde(rename = "Pedestrian Flag")]
    pub pedestrian_flag: Option<String>,
}

impl CrashRecord {
    /// Crash count contributed to sums (null counts as zero).
    pub fn crashes(&self) -> u64 {
        self.total_crashes.unwrap_or(0)
    }

    pub fn involves_cyclist(&self) -> bool {
        self.cyclist_flag.as_deref() == Some(FLAG_YES)
    }

    pub fn involves_pedestrian(&self) -> bool {
        self.pedestrian_flag.as_deref() == Some(FLAG_YES)
    }

    /// Cell text for a required column, used by the data preview.
    pub fn cell(&self, column: &str) -> String {
        fn text(v: &Option<String>) -> String {
            v.clone().unwrap_or_default()
        }
        match column {
            COL_YEAR => self.loss_year.map(|y| y.to_string()).unwrap_or_default(),
            COL_MONTH => text(&self.month),
            COL_DAY => text(&self.day_of_week),
            COL_TIME => text(&self.time_category),
            COL_TOTAL => self
                .total_crashes
                .map(|t| t.to_string())
                .unwrap_or_default(),
            COL_SEVERITY => text(&self.severity),
            COL_CYCLIST => text(&self.cyclist_flag),
            COL_PEDESTRIAN => text(&self.pedestrian_flag),
            _ => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// CrashTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Loaded rows in file order, plus the header as it appeared in the file.
#[derive(Debug, Clone, Default)]
pub struct CrashTable {
    pub records: Vec<CrashRecord>,
    pub column_names: Vec<String>,
}

impl CrashTable {
    pub fn new(records: Vec<CrashRecord>, column_names: Vec<String>) -> Self {
        CrashTable {
            records,
            column_names,
        }
    }

    /// Keep only rows whose loss year is in `years`, preserving row order.
    pub fn restrict_to_years(&self, years: &BTreeSet<i32>) -> CrashTable {
        let records = self
            .records
            .iter()
            .filter(|r| r.loss_year.is_some_and(|y| years.contains(&y)))
            .cloned()
            .collect();
        CrashTable {
            records,
            column_names: self.column_names.clone(),
        }
    }

    /// Distinct loss years present (nulls excluded).
    pub fn years(&self) -> BTreeSet<i32> {
        self.records.iter().filter_map(|r| r.loss_year).collect()
    }

    pub fn total_crashes(&self) -> u64 {
        self.records.iter().map(CrashRecord::crashes).sum()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Fixed display orderings
// ---------------------------------------------------------------------------

/// Days of the week in chart order (Monday first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Monday => "MONDAY",
            Weekday::Tuesday => "TUESDAY",
            Weekday::Wednesday => "WEDNESDAY",
            Weekday::Thursday => "THURSDAY",
            Weekday::Friday => "FRIDAY",
            Weekday::Saturday => "SATURDAY",
            Weekday::Sunday => "SUNDAY",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }
}

/// The eight 3-hour bands used by `Time Category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeBand {
    Night,
    EarlyMorning,
    Morning,
    LateMorning,
    Afternoon,
    LateAfternoon,
    Evening,
    LateEvening,
}

impl TimeBand {
    pub const ALL: [TimeBand; 8] = [
        TimeBand::Night,
        TimeBand::EarlyMorning,
        TimeBand::Morning,
        TimeBand::LateMorning,
        TimeBand::Afternoon,
        TimeBand::LateAfternoon,
        TimeBand::Evening,
        TimeBand::LateEvening,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeBand::Night => "00:00-02:59",
            TimeBand::EarlyMorning => "03:00-05:59",
            TimeBand::Morning => "06:00-08:59",
            TimeBand::LateMorning => "09:00-11:59",
            TimeBand::Afternoon => "12:00-14:59",
            TimeBand::LateAfternoon => "15:00-17:59",
            TimeBand::Evening => "18:00-20:59",
            TimeBand::LateEvening => "21:00-23:59",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

/// Calendar months in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Month::January => "JANUARY",
            Month::February => "FEBRUARY",
            Month::March => "MARCH",
            Month::April => "APRIL",
            Month::May => "MAY",
            Month::June => "JUNE",
            Month::July => "JULY",
            Month::August => "AUGUST",
            Month::September => "SEPTEMBER",
            Month::October => "OCTOBER",
            Month::November => "NOVEMBER",
            Month::December => "DECEMBER",
        }
    }

    /// 1-based calendar number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.label() == label)
    }
}

/// Compare two labels by their position in a fixed ordering; labels the
/// ordering doesn't know sort after known ones, alphabetically.
pub fn cmp_by_order<T: Ord>(a: &str, b: &str, lookup: impl Fn(&str) -> Option<T>) -> Ordering {
    match (lookup(a), lookup(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn month_numbers_are_chronological() {
        assert_eq!(Month::January.number(), 1);
        assert_eq!(Month::December.number(), 12);
        assert_eq!(Month::from_label("SEPTEMBER"), Some(Month::September));
        assert_eq!(Month::from_label("September"), None);
    }

    #[test]
    fn unknown_labels_sort_after_known() {
        let mut days = vec!["SUNDAY", "UNKNOWN", "MONDAY", "ANYDAY", "FRIDAY"];
        days.sort_by(|a, b| cmp_by_order(a, b, Weekday::from_label));
        assert_eq!(days, vec!["MONDAY", "FRIDAY", "SUNDAY", "ANYDAY", "UNKNOWN"]);
    }

    #[test]
    fn time_bands_start_at_midnight() {
        assert_eq!(TimeBand::ALL[0].label(), "00:00-02:59");
        assert_eq!(TimeBand::ALL[7].label(), "21:00-23:59");
        assert_eq!(TimeBand::from_label("12:00-14:59"), Some(TimeBand::Afternoon));
    }

    #[test]
    fn restrict_keeps_row_order_and_drops_null_years() {
        let mut rows = vec![
            record(2019, "MAY", "MONDAY", "00:00-02:59", 1, "A", false, false),
            record(2018, "MAY", "MONDAY", "00:00-02:59", 2, "A", false, false),
            record(2019, "JUNE", "MONDAY", "00:00-02:59", 3, "A", false, false),
        ];
        rows.push(CrashRecord {
            loss_year: None,
            ..rows[0].clone()
        });
        let t = table(rows);

        let kept = t.restrict_to_years(&BTreeSet::from([2019]));
        let totals: Vec<u64> = kept.records.iter().map(CrashRecord::crashes).collect();
        assert_eq!(totals, vec![1, 3]);
        assert_eq!(t.years(), BTreeSet::from([2018, 2019]));
    }

    #[test]
    fn flags_match_yes_exactly() {
        let mut r = record(2018, "MAY", "MONDAY", "00:00-02:59", 1, "A", true, false);
        assert!(r.involves_cyclist());
        assert!(!r.involves_pedestrian());
        r.cyclist_flag = Some("yes".into());
        assert!(!r.involves_cyclist());
    }
}
