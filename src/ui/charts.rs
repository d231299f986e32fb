use std::f64::consts::TAU;

use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, Corner, Legend, Line, MarkerShape, Plot, PlotPoint, PlotPoints, Points,
    Polygon, Text, uniform_grid_spacer,
};

use crate::analysis::CrashAnalysis;
use crate::color::ColorMap;
use crate::data::aggregate::{
    InvolvementSeverity, SeverityCount, distinct_in_order, percentages, time_band_order,
};
use crate::data::model::Month;
use crate::state::{AppState, ChartKind};

/// Share of a day cluster's slot covered by its bars.
pub const GROUP_WIDTH: f64 = 0.8;
/// Horizontal shift of the monthly value labels, in month units.
pub const LABEL_OFFSET_X: f64 = 0.2;
/// Angle of the first pie wedge's leading edge, counter-clockwise from +x.
pub const PIE_START_DEG: f64 = 140.0;
const PIE_PCT_RADIUS: f64 = 0.6;
const PIE_LABEL_RADIUS: f64 = 1.1;
/// Largest arc drawn as one polygon; keeps every piece convex.
const MAX_PIECE_ANGLE: f64 = TAU / 4.0;
const STACKED_BAR_WIDTH: f64 = 0.5;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the active chart in the central panel.
pub fn chart_panel(ui: &mut Ui, state: &AppState) {
    let analysis = &state.analysis;
    let chart = state.active_chart;
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new(chart.title()).strong());
    });
    ui.add_space(4.0);

    match chart {
        ChartKind::DayTime => day_time_chart(ui, analysis, &state.time_band_colors),
        ChartKind::MonthlyAverage => monthly_average_chart(ui, analysis),
        ChartKind::SeverityDistribution => {
            severity_pie_chart(ui, &analysis.severity, &state.severity_colors)
        }
        ChartKind::InvolvementSeverity => {
            involvement_chart(ui, &analysis.involvement, &state.severity_colors)
        }
    }
}

/// Axis label for integer positions of a categorical axis.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Grouped bar chart: crashes by day and time
// ---------------------------------------------------------------------------

/// Centre of bar `band_idx` (of `n_bands`) within the cluster at `day_idx`.
pub fn grouped_bar_x(day_idx: usize, band_idx: usize, n_bands: usize) -> f64 {
    let width = GROUP_WIDTH / n_bands.max(1) as f64;
    day_idx as f64 - GROUP_WIDTH / 2.0 + width * (band_idx as f64 + 0.5)
}

fn day_time_chart(ui: &mut Ui, analysis: &CrashAnalysis, colors: &ColorMap) {
    let totals = &analysis.day_time;
    let days = distinct_in_order(totals, |t| t.day.as_str());
    // One series per band so the legend lists all of them; bands without
    // rows keep an empty slot in each cluster.
    let bands = time_band_order(totals);
    let bar_width = GROUP_WIDTH / bands.len().max(1) as f64;

    let charts: Vec<BarChart> = bands
        .iter()
        .enumerate()
        .map(|(band_idx, band)| {
            let bars = totals
                .iter()
                .filter(|t| t.time_band == *band)
                .filter_map(|t| {
                    let day_idx = days.iter().position(|d| *d == t.day)?;
                    Some(
                        Bar::new(
                            grouped_bar_x(day_idx, band_idx, bands.len()),
                            t.total as f64,
                        )
                        .width(bar_width)
                        .name(format!("{} {band}", t.day)),
                    )
                })
                .collect();
            BarChart::new(bars)
                .name(*band)
                .color(colors.color_for(band))
        })
        .collect();

    let day_labels: Vec<String> = days.iter().map(|d| d.to_string()).collect();

    Plot::new("day_time_chart")
        .legend(Legend::default().position(Corner::RightTop))
        .x_axis_label("Day of Week")
        .y_axis_label("Total Crashes")
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(move |mark, _range| category_label(&day_labels, mark.value))
        .include_y(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Line chart: average crashes per month
// ---------------------------------------------------------------------------

fn monthly_average_chart(ui: &mut Ui, analysis: &CrashAnalysis) {
    let points: Vec<[f64; 2]> = analysis
        .monthly
        .iter()
        .filter_map(|m| Some([m.month_number? as f64, m.average]))
        .collect();
    let labels: Vec<(PlotPoint, String)> = analysis
        .monthly
        .iter()
        .filter_map(|m| {
            let x = m.month_number? as f64 - LABEL_OFFSET_X;
            Some((PlotPoint::new(x, m.average), format!("{:.0}", m.rounded())))
        })
        .collect();
    let text_color = ui.visuals().strong_text_color();
    let line_color = Color32::from_rgb(31, 119, 180);

    Plot::new("monthly_average_chart")
        .x_axis_label("Month")
        .y_axis_label("Average Total Crashes")
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 3.0, 12.0]))
        .x_axis_formatter(|mark, _range| month_tick(mark.value))
        .include_x(0.5)
        .include_x(12.5)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Average Total Crashes")
                    .color(line_color)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points.clone()))
                    .shape(MarkerShape::Circle)
                    .radius(4.0)
                    .filled(true)
                    .color(line_color),
            );
            for (position, label) in labels {
                plot_ui.text(
                    Text::new(position, label)
                        .anchor(Align2::CENTER_BOTTOM)
                        .color(text_color),
                );
            }
        });
}

/// Month name for tick positions 1..=12.
fn month_tick(value: f64) -> String {
    let n = value.round();
    if (value - n).abs() > 1e-6 || !(1.0..=12.0).contains(&n) {
        return String::new();
    }
    Month::ALL[n as usize - 1].label().to_string()
}

// ---------------------------------------------------------------------------
// Pie chart: severity distribution
// ---------------------------------------------------------------------------

/// One pie slice, angles in radians counter-clockwise from +x.
#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    pub label: String,
    pub percent: f64,
    pub start: f64,
    pub end: f64,
}

impl Wedge {
    pub fn mid_angle(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Lay out wedges in count order starting at [`PIE_START_DEG`].
pub fn pie_wedges(counts: &[SeverityCount]) -> Vec<Wedge> {
    let mut angle = PIE_START_DEG.to_radians();
    percentages(counts)
        .into_iter()
        .map(|(label, percent)| {
            let start = angle;
            angle += percent / 100.0 * TAU;
            Wedge {
                label,
                percent,
                start,
                end: angle,
            }
        })
        .collect()
}

/// Outline of a wedge split into convex pieces of at most a quarter turn.
fn wedge_pieces(wedge: &Wedge) -> Vec<Vec<[f64; 2]>> {
    let sweep = wedge.end - wedge.start;
    let n_pieces = (sweep / MAX_PIECE_ANGLE).ceil().max(1.0) as usize;
    let piece = sweep / n_pieces as f64;
    (0..n_pieces)
        .map(|i| {
            let from = wedge.start + piece * i as f64;
            let steps = ((piece.to_degrees()).ceil() as usize).max(2);
            let mut outline = vec![[0.0, 0.0]];
            outline.extend((0..=steps).map(|s| {
                let a = from + piece * s as f64 / steps as f64;
                [a.cos(), a.sin()]
            }));
            outline
        })
        .collect()
}

fn severity_pie_chart(ui: &mut Ui, counts: &[SeverityCount], colors: &ColorMap) {
    let wedges = pie_wedges(counts);
    let text_color = ui.visuals().strong_text_color();

    Plot::new("severity_pie_chart")
        .legend(Legend::default().position(Corner::RightTop))
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-1.6)
        .include_x(1.6)
        .include_y(-1.3)
        .include_y(1.3)
        .show(ui, |plot_ui| {
            for wedge in &wedges {
                let color = colors.color_for(&wedge.label);
                for piece in wedge_pieces(wedge) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(piece))
                            .name(&wedge.label)
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, color)),
                    );
                }

                let mid = wedge.mid_angle();
                let (sin, cos) = mid.sin_cos();
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(PIE_PCT_RADIUS * cos, PIE_PCT_RADIUS * sin),
                        format!("{:.1}%", wedge.percent),
                    )
                    .color(text_color),
                );
                let anchor = if cos >= 0.0 {
                    Align2::LEFT_CENTER
                } else {
                    Align2::RIGHT_CENTER
                };
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(PIE_LABEL_RADIUS * cos, PIE_LABEL_RADIUS * sin),
                        wedge.label.clone(),
                    )
                    .anchor(anchor)
                    .color(text_color),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Stacked bar chart: severity share by involvement
// ---------------------------------------------------------------------------

/// One stacked segment: bar `row`, from `base` up by `value` percent.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub row: usize,
    pub severity: String,
    pub base: f64,
    pub value: f64,
}

/// Stack each row's percentages in severity-column order. Severities the
/// row lacks get a zero-height segment.
pub fn stacked_segments(involvement: &InvolvementSeverity) -> Vec<Segment> {
    involvement
        .rows
        .iter()
        .enumerate()
        .flat_map(|(row_idx, row)| {
            let mut base = 0.0;
            involvement
                .severities
                .iter()
                .map(move |severity| {
                    let value = row.percentage(severity);
                    let segment = Segment {
                        row: row_idx,
                        severity: severity.clone(),
                        base,
                        value,
                    };
                    base += value;
                    segment
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn involvement_chart(ui: &mut Ui, involvement: &InvolvementSeverity, colors: &ColorMap) {
    let segments = stacked_segments(involvement);
    let row_labels: Vec<String> = involvement
        .rows
        .iter()
        .map(|r| r.involvement.label().to_string())
        .collect();
    let text_color = ui.visuals().strong_text_color();

    let charts: Vec<BarChart> = involvement
        .severities
        .iter()
        .map(|severity| {
            let bars = segments
                .iter()
                .filter(|s| s.severity == *severity && s.value > 0.0)
                .map(|s| {
                    Bar::new(s.row as f64, s.value)
                        .base_offset(s.base)
                        .width(STACKED_BAR_WIDTH)
                        .name(format!(
                            "{} {severity} (of {} rows)",
                            row_labels[s.row], involvement.rows[s.row].rows
                        ))
                })
                .collect();
            BarChart::new(bars)
                .name(severity)
                .color(colors.color_for(severity))
        })
        .collect();

    Plot::new("involvement_chart")
        .legend(Legend::default().position(Corner::RightTop))
        .x_axis_label("Crash Type")
        .y_axis_label("Percentage")
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(move |mark, _range| category_label(&row_labels, mark.value))
        .include_x(-0.6)
        .include_x(1.6)
        .include_y(0.0)
        .include_y(105.0)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
            for s in segments.iter().filter(|s| s.value > 0.0) {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(s.row as f64, s.base + s.value / 2.0),
                        format!("{:.1}", s.value),
                    )
                    .color(text_color),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::aggregate::{Involvement, InvolvementRow};

    fn counts(pairs: &[(&str, u64)]) -> Vec<SeverityCount> {
        pairs
            .iter()
            .map(|(s, c)| SeverityCount {
                severity: s.to_string(),
                count: *c,
            })
            .collect()
    }

    #[test]
    fn grouped_bars_stay_inside_their_cluster() {
        let first = grouped_bar_x(2, 0, 8);
        let last = grouped_bar_x(2, 7, 8);
        assert!(first > 2.0 - GROUP_WIDTH / 2.0);
        assert!(last < 2.0 + GROUP_WIDTH / 2.0);
        assert!((grouped_bar_x(0, 0, 1) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn pie_wedges_cover_full_turn_from_start_angle() {
        let wedges = pie_wedges(&counts(&[("A", 3), ("B", 1)]));
        assert_eq!(wedges.len(), 2);
        assert!((wedges[0].start - PIE_START_DEG.to_radians()).abs() < 1e-12);
        assert!((wedges[0].percent - 75.0).abs() < 1e-12);
        assert!((wedges[1].start - wedges[0].end).abs() < 1e-12);
        assert!((wedges[1].end - wedges[0].start - TAU).abs() < 1e-9);
    }

    #[test]
    fn large_wedges_split_into_convex_pieces() {
        let wedges = pie_wedges(&counts(&[("A", 9), ("B", 1)]));
        let pieces = wedge_pieces(&wedges[0]);
        assert_eq!(pieces.len(), 4);
        for piece in &pieces {
            assert_eq!(piece[0], [0.0, 0.0]);
            for p in &piece[1..] {
                assert!((p[0].hypot(p[1]) - 1.0).abs() < 1e-9);
            }
        }
        assert_eq!(wedge_pieces(&wedges[1]).len(), 1);
    }

    #[test]
    fn segments_stack_to_one_hundred() {
        let row = |involvement, pcts: &[(&str, f64)]| InvolvementRow {
            involvement,
            rows: 4,
            percentages: pcts
                .iter()
                .map(|(s, p)| (s.to_string(), *p))
                .collect::<BTreeMap<_, _>>(),
        };
        let involvement = InvolvementSeverity {
            severities: vec!["CASUALTY CRASH".into(), "FATAL".into(), "PROPERTY DAMAGE".into()],
            rows: vec![
                row(
                    Involvement::Cyclist,
                    &[("CASUALTY CRASH", 75.0), ("PROPERTY DAMAGE", 25.0)],
                ),
                row(Involvement::Pedestrian, &[("FATAL", 50.0), ("CASUALTY CRASH", 50.0)]),
            ],
        };

        let segments = stacked_segments(&involvement);
        assert_eq!(segments.len(), 6);

        let cyclist: Vec<(f64, f64)> = segments
            .iter()
            .filter(|s| s.row == 0)
            .map(|s| (s.base, s.value))
            .collect();
        assert_eq!(cyclist, vec![(0.0, 75.0), (75.0, 0.0), (75.0, 25.0)]);

        let top = segments
            .iter()
            .filter(|s| s.row == 1)
            .map(|s| s.base + s.value)
            .fold(0.0, f64::max);
        assert!((top - 100.0).abs() < 1e-9);
    }

    #[test]
    fn axis_labels_only_on_integer_positions() {
        let labels = vec!["MONDAY".to_string(), "TUESDAY".to_string()];
        assert_eq!(category_label(&labels, 1.0), "TUESDAY");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(month_tick(1.0), "JANUARY");
        assert_eq!(month_tick(12.0), "DECEMBER");
        assert_eq!(month_tick(13.0), "");
    }
}
