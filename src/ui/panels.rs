use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::REQUIRED_COLUMNS;
use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Left side panel – dataset overview
// ---------------------------------------------------------------------------

/// Render the left panel: year coverage and a preview of the source rows.
pub fn side_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Dataset");
    ui.separator();

    let (table, analysis) = (&state.table, &state.analysis);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.label(format!(
                "{} rows loaded, {} in complete years",
                analysis.source_rows, analysis.filtered_rows
            ));
            ui.label(format!(
                "{} crashes in total across {} years",
                table.total_crashes(),
                table.years().len()
            ));
            ui.separator();

            ui.strong("Complete years");
            if analysis.complete_years.is_empty() {
                ui.label(RichText::new("none").italics());
            }
            for year in &analysis.complete_years {
                ui.label(year.to_string());
            }

            if !analysis.excluded_years.is_empty() {
                ui.add_space(4.0);
                ui.strong("Excluded years");
                for (year, months) in &analysis.excluded_years {
                    ui.label(
                        RichText::new(format!("{year}  ({months}/12 months)"))
                            .color(Color32::from_rgb(200, 120, 40)),
                    );
                }
            }
            ui.separator();

            egui::CollapsingHeader::new(RichText::new("Preview").strong())
                .id_salt("preview")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    preview_table(ui, state);
                });
        });
}

/// First rows of the source table, required columns only.
fn preview_table(ui: &mut Ui, state: &AppState) {
    let table = &state.table;
    let n_rows = table.len().min(state.config.preview_rows);

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(Column::auto().resizable(true), REQUIRED_COLUMNS.len())
            .header(20.0, |mut header| {
                for name in REQUIRED_COLUMNS {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, n_rows, |mut row| {
                    let record = &table.records[row.index()];
                    for name in REQUIRED_COLUMNS {
                        row.col(|ui: &mut Ui| {
                            ui.label(record.cell(name));
                        });
                    }
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the toolbar: chart tabs between Previous / Next buttons.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        if ui
            .add_enabled(state.active_chart.previous().is_some(), egui::Button::new("◀"))
            .clicked()
        {
            state.previous_chart();
        }
        for chart in ChartKind::ALL {
            if ui
                .selectable_label(state.active_chart == chart, chart.tab_label())
                .clicked()
            {
                state.active_chart = chart;
            }
        }
        if ui
            .add_enabled(state.active_chart.next().is_some(), egui::Button::new("▶"))
            .clicked()
        {
            state.next_chart();
        }
    });
}
