use std::collections::{BTreeMap, BTreeSet};

use crate::data::aggregate::{
    DayTimeTotal, InvolvementSeverity, MonthlyAverage, SeverityCount, average_crashes_per_month,
    crashes_by_day_time, involvement_severity, severity_distribution,
};
use crate::data::filter::filter_complete_years;
use crate::data::model::CrashTable;
use crate::error::CrashDataError;

// ---------------------------------------------------------------------------
// Full analysis of one loaded table
// ---------------------------------------------------------------------------

/// Everything the charts need, computed once per loaded table.
#[derive(Debug, Clone)]
pub struct CrashAnalysis {
    pub complete_years: BTreeSet<i32>,
    pub excluded_years: BTreeMap<i32, usize>,
    pub source_rows: usize,
    pub filtered_rows: usize,
    pub day_time: Vec<DayTimeTotal>,
    pub monthly: Vec<MonthlyAverage>,
    pub severity: Vec<SeverityCount>,
    pub involvement: InvolvementSeverity,
}

/// Filter to complete years, then run the four aggregations over the
/// filtered rows. The source table is not modified.
pub fn analyze(table: &CrashTable) -> Result<CrashAnalysis, CrashDataError> {
    let completeness = filter_complete_years(table);
    let filtered = &completeness.table;

    let analysis = CrashAnalysis {
        day_time: crashes_by_day_time(filtered),
        monthly: average_crashes_per_month(filtered),
        severity: severity_distribution(filtered),
        involvement: involvement_severity(filtered)?,
        source_rows: table.len(),
        filtered_rows: filtered.len(),
        complete_years: completeness.complete_years,
        excluded_years: completeness.excluded_years,
    };

    log::info!(
        "Analysed {} of {} rows: {} day/time groups, {} months, {} severity labels",
        analysis.filtered_rows,
        analysis.source_rows,
        analysis.day_time.len(),
        analysis.monthly.len(),
        analysis.severity.len()
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::test_support::{full_year, record, table};

    #[test]
    fn partial_year_is_excluded_from_every_aggregate() {
        let mut rows = full_year(2018, 2);
        rows.push(record(
            2018,
            "JULY",
            "FRIDAY",
            "18:00-20:59",
            3,
            "CASUALTY CRASH",
            true,
            true,
        ));
        for month in ["JANUARY", "FEBRUARY", "MARCH", "APRIL", "MAY", "JUNE"] {
            rows.push(record(
                2019,
                month,
                "SATURDAY",
                "03:00-05:59",
                100,
                "FATAL",
                true,
                true,
            ));
        }
        let t = table(rows);

        let analysis = analyze(&t).expect("analysis");
        assert_eq!(analysis.complete_years, BTreeSet::from([2018]));
        assert_eq!(analysis.excluded_years, BTreeMap::from([(2019, 6)]));
        assert_eq!(analysis.source_rows, 19);
        assert_eq!(analysis.filtered_rows, 13);

        assert!(analysis.day_time.iter().all(|g| g.day != "SATURDAY"));
        let day_time_sum: u64 = analysis.day_time.iter().map(|g| g.total).sum();
        assert_eq!(day_time_sum, 12 * 2 + 3);

        let july = analysis
            .monthly
            .iter()
            .find(|m| m.month == "JULY")
            .expect("july");
        assert_eq!(july.average, 5.0);

        assert!(analysis.severity.iter().all(|s| s.severity != "FATAL"));
        assert_eq!(analysis.involvement.severities, vec!["CASUALTY CRASH"]);
    }

    #[test]
    fn empty_subset_propagates() {
        let t = table(full_year(2018, 1));
        assert!(matches!(
            analyze(&t),
            Err(CrashDataError::EmptySubset(_))
        ));
    }

    #[test]
    fn csv_on_disk_runs_through_load_filter_and_aggregate() {
        use std::fmt::Write as _;
        use std::io::Write as _;

        use crate::data::model::Month;

        let mut body = String::from(
            "Date Of Loss Year,Month Of Year,Day Of Week,Time Category,\
Total Crashes,Crash Severity,Cyclist Flag,Pedestrian Flag\n",
        );
        for month in Month::ALL {
            writeln!(body, "2018,{},MONDAY,00:00-02:59,2,PROPERTY DAMAGE,No,No", month.label())
                .expect("format row");
        }
        body.push_str("2018,JULY,FRIDAY,18:00-20:59,3,CASUALTY CRASH,Yes,Yes\n");
        for month in Month::ALL.iter().take(6) {
            writeln!(body, "2019,{},SATURDAY,03:00-05:59,100,FATAL,Yes,Yes", month.label())
                .expect("format row");
        }

        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp file");
        file.write_all(body.as_bytes()).expect("write csv");

        let loaded = crate::data::loader::load_file(file.path()).expect("load");
        let analysis = analyze(&loaded).expect("analysis");

        assert_eq!(analysis.complete_years, BTreeSet::from([2018]));
        assert_eq!(analysis.excluded_years, BTreeMap::from([(2019, 6)]));
        assert_eq!(analysis.source_rows, 19);
        assert_eq!(analysis.filtered_rows, 13);

        let day_time: Vec<(&str, &str, u64)> = analysis
            .day_time
            .iter()
            .map(|g| (g.day.as_str(), g.time_band.as_str(), g.total))
            .collect();
        assert_eq!(
            day_time,
            vec![("MONDAY", "00:00-02:59", 24), ("FRIDAY", "18:00-20:59", 3)]
        );

        let average = |name: &str| {
            analysis
                .monthly
                .iter()
                .find(|m| m.month == name)
                .map(|m| m.average)
        };
        assert_eq!(analysis.monthly.len(), 12);
        assert_eq!(average("JANUARY"), Some(2.0));
        assert_eq!(average("JULY"), Some(5.0));

        let severity: Vec<(&str, u64)> = analysis
            .severity
            .iter()
            .map(|s| (s.severity.as_str(), s.count))
            .collect();
        assert_eq!(severity, vec![("PROPERTY DAMAGE", 12), ("CASUALTY CRASH", 1)]);

        assert_eq!(analysis.involvement.severities, vec!["CASUALTY CRASH"]);
        for row in &analysis.involvement.rows {
            assert_eq!(row.rows, 1);
            assert_eq!(row.percentage("CASUALTY CRASH"), 100.0);
        }
    }
}
