use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::aggregate::EXPORT_FILE_NAME;
use crate::data::loader::SUPPORTED_EXTENSIONS;
use crate::state::AppState;

const INSTRUCTIONS: &str = "\
1. Upload one or more Excel (.xlsx, .xls) or CSV files.
2. Enter the exact Job ID you want to search for.
3. Click 'Process Files' to search for the Job ID in all uploaded files.
4. Matched file names (without extensions) are listed first, followed by details for each file.
5. Download all results as a single JSON file.";

// ---------------------------------------------------------------------------
// Left side panel – uploads and job id
// ---------------------------------------------------------------------------

/// Render the left input panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Files");
    ui.separator();

    if ui.button("Choose Excel or CSV files…").clicked() {
        open_files_dialog(state);
    }

    let mut remove = None;
    ScrollArea::vertical()
        .max_height(240.0)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            if state.files.is_empty() {
                ui.label("No files uploaded.");
            }
            for (idx, file) in state.files.iter().enumerate() {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("✕").clicked() {
                        remove = Some(idx);
                    }
                    ui.label(file.name.as_str());
                });
            }
        });
    if let Some(idx) = remove {
        state.remove_file(idx);
    }

    ui.add_space(8.0);
    ui.strong("Job ID");
    let response = ui.text_edit_singleline(&mut state.job_id);
    let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

    ui.add_space(4.0);
    if ui.button("Process Files").clicked() || submitted {
        state.process();
    }

    ui.add_space(12.0);
    egui::CollapsingHeader::new(RichText::new("Instructions").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.label(INSTRUCTIONS);
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_files_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.can_export(), egui::Button::new("Download JSON…"))
                .clicked()
            {
                save_export_dialog(state);
                ui.close_menu();
            }
            if ui.button("Clear").clicked() {
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("{} file(s) uploaded", state.files.len()));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_files_dialog(state: &mut AppState) {
    let picked = rfd::FileDialog::new()
        .set_title("Choose Excel or CSV files")
        .add_filter("Supported files", SUPPORTED_EXTENSIONS)
        .add_filter("Excel", &["xlsx", "xls"])
        .add_filter("CSV", &["csv"])
        .pick_files();

    if let Some(paths) = picked {
        state.add_paths(paths);
    }
}

pub fn save_export_dialog(state: &mut AppState) {
    let target = rfd::FileDialog::new()
        .set_title("Download JSON")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = target {
        if let Err(e) = state.write_export(&path) {
            log::error!("Failed to export results: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
