use anyhow::Result;

use crate::analysis::{CrashAnalysis, analyze};
use crate::color::ColorMap;
use crate::config::ViewerConfig;
use crate::data::aggregate::time_band_order;
use crate::data::model::CrashTable;

// ---------------------------------------------------------------------------
// Chart sequence
// ---------------------------------------------------------------------------

/// The four charts, in the order they are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    DayTime,
    MonthlyAverage,
    SeverityDistribution,
    InvolvementSeverity,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::DayTime,
        ChartKind::MonthlyAverage,
        ChartKind::SeverityDistribution,
        ChartKind::InvolvementSeverity,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::DayTime => "Total Number of Crashes by Day and Time",
            ChartKind::MonthlyAverage => "Average Total Crashes by Month",
            ChartKind::SeverityDistribution => "Distribution of Crash Severity",
            ChartKind::InvolvementSeverity => {
                "Percentage of Casualties in Crashes Involving Cyclists and Pedestrians"
            }
        }
    }

    /// Short label for the chart tabs.
    pub fn tab_label(self) -> &'static str {
        match self {
            ChartKind::DayTime => "Day & Time",
            ChartKind::MonthlyAverage => "Monthly Average",
            ChartKind::SeverityDistribution => "Severity",
            ChartKind::InvolvementSeverity => "Cyclists & Pedestrians",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.position() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.position()
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Source table as loaded.
    pub table: CrashTable,

    /// Aggregates over the complete years of `table`.
    pub analysis: CrashAnalysis,

    /// Chart shown in the central panel.
    pub active_chart: ChartKind,

    /// Colours per time band.
    pub time_band_colors: ColorMap,

    /// Colours per severity label, shared by the pie and stacked bar.
    pub severity_colors: ColorMap,
}

impl AppState {
    /// Analyse `table` and build the colour maps. An analysis failure is
    /// returned as is; there is no partially initialised state.
    pub fn new(config: ViewerConfig, table: CrashTable) -> Result<Self> {
        let analysis = analyze(&table)?;

        let time_band_colors = ColorMap::new(time_band_order(&analysis.day_time));

        // Pie order first so the largest slices get the first hues.
        let severity_colors = ColorMap::new(
            analysis
                .severity
                .iter()
                .map(|s| s.severity.as_str())
                .chain(analysis.involvement.severities.iter().map(String::as_str)),
        );

        Ok(Self {
            config,
            table,
            analysis,
            active_chart: ChartKind::default(),
            time_band_colors,
            severity_colors,
        })
    }

    pub fn next_chart(&mut self) {
        if let Some(next) = self.active_chart.next() {
            self.active_chart = next;
        }
    }

    pub fn previous_chart(&mut self) {
        if let Some(previous) = self.active_chart.previous() {
            self.active_chart = previous;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};

    use eframe::egui::Color32;

    use super::*;
    use crate::data::model::TimeBand;
    use crate::data::model::test_support::{full_year, record, table};
    use crate::error::CrashDataError;

    fn analysable_table() -> CrashTable {
        let mut rows = full_year(2018, 1);
        rows.push(record(
            2018,
            "MAY",
            "MONDAY",
            "00:00-02:59",
            1,
            "CASUALTY CRASH",
            true,
            true,
        ));
        table(rows)
    }

    #[test]
    fn charts_step_in_fixed_order() {
        let mut state =
            AppState::new(ViewerConfig::default(), analysable_table()).expect("analysable");
        assert_eq!(state.active_chart, ChartKind::DayTime);
        state.previous_chart();
        assert_eq!(state.active_chart, ChartKind::DayTime);

        let mut seen = vec![state.active_chart];
        for _ in 0..5 {
            state.next_chart();
            seen.push(state.active_chart);
        }
        assert_eq!(
            seen,
            vec![
                ChartKind::DayTime,
                ChartKind::MonthlyAverage,
                ChartKind::SeverityDistribution,
                ChartKind::InvolvementSeverity,
                ChartKind::InvolvementSeverity,
                ChartKind::InvolvementSeverity,
            ]
        );
    }

    #[test]
    fn new_state_computes_analysis_and_colours() {
        let state =
            AppState::new(ViewerConfig::default(), analysable_table()).expect("analysable");

        assert_eq!(state.analysis.complete_years, BTreeSet::from([2018]));
        assert_eq!(state.table.len(), 13);

        // Every band gets its own colour, including bands with no rows.
        let band_colors: HashSet<_> = TimeBand::ALL
            .iter()
            .map(|t| state.time_band_colors.color_for(t.label()))
            .collect();
        assert_eq!(band_colors.len(), TimeBand::ALL.len());
        assert!(!band_colors.contains(&Color32::GRAY));

        assert_ne!(
            state.severity_colors.color_for("CASUALTY CRASH"),
            state.severity_colors.color_for("PROPERTY DAMAGE")
        );
        assert_eq!(state.severity_colors.color_for("FATAL"), Color32::GRAY);
    }

    #[test]
    fn analysis_failure_is_returned_to_caller() {
        let err = AppState::new(ViewerConfig::default(), table(full_year(2019, 1)))
            .err()
            .expect("no cyclist rows");
        assert!(matches!(
            err.downcast_ref::<CrashDataError>(),
            Some(CrashDataError::EmptySubset("Cyclist Crashes"))
        ));
    }
}
