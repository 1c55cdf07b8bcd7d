use eframe::egui::{Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::MatchResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Results (central panel)
// ---------------------------------------------------------------------------

/// Render the outcome of the last search in the central panel.
pub fn results_view(ui: &mut Ui, state: &AppState) {
    let outcome = match &state.outcome {
        Some(outcome) => outcome,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Upload files and enter a Job ID, then click Process Files");
            });
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                let color = if outcome.has_matches() {
                    Color32::DARK_GREEN
                } else {
                    Color32::from_rgb(200, 140, 0)
                };
                ui.label(RichText::new(outcome.headline()).color(color).strong());
                if ui.small_button("Copy summary").clicked() {
                    ui.ctx().copy_text(outcome.summary());
                }
            });

            if outcome.has_matches() {
                ui.add_space(6.0);
                ui.heading("Matched Files:");
                ui.label(outcome.matched_files());

                for (idx, result) in outcome.values.iter().enumerate() {
                    ui.separator();
                    ui.push_id(idx, |ui: &mut Ui| match_details(ui, result));
                }
            }

            if !outcome.failures.is_empty() {
                ui.separator();
                ui.heading("Unreadable files");
                for failure in &outcome.failures {
                    ui.label(RichText::new(failure.to_string()).color(Color32::RED));
                }
            }
        });
}

fn match_details(ui: &mut Ui, result: &MatchResult) {
    ui.heading(result.heading());
    ui.label(result.columns_line());
    ui.add_space(4.0);

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(120.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Column");
            });
            header.col(|ui| {
                ui.strong("Value");
            });
        })
        .body(|mut body| {
            for (column, value) in result.record.iter() {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(column);
                    });
                    row.col(|ui| {
                        if value.is_null() {
                            ui.weak(value.to_string());
                        } else {
                            ui.monospace(value.to_string());
                        }
                    });
                });
            }
        });
}
