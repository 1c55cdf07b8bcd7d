use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::aggregate::{aggregate, BatchOutcome};
use crate::data::model::UploadedFile;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Files picked by the user, in upload order.
    pub files: Vec<UploadedFile>,

    /// Identifier text as typed.
    pub job_id: String,

    /// Result of the last "Process Files" click.
    pub outcome: Option<BatchOutcome>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Read the picked paths into memory and append them to the upload list.
    pub fn add_paths(&mut self, paths: Vec<PathBuf>) {
        for path in paths {
            match read_upload(&path) {
                Ok(file) => {
                    log::info!("Added {} ({} bytes)", file.name, file.bytes.len());
                    self.files.push(file);
                }
                Err(e) => {
                    log::error!("Failed to add file: {e:#}");
                    self.status_message = Some(format!("Error: {e:#}"));
                }
            }
        }
    }

    pub fn remove_file(&mut self, idx: usize) {
        if idx < self.files.len() {
            self.files.remove(idx);
        }
    }

    /// Drop the uploads and any previous result.
    pub fn clear(&mut self) {
        self.files.clear();
        self.outcome = None;
        self.status_message = None;
    }

    /// Search every uploaded file for the current job id.
    pub fn process(&mut self) {
        match aggregate(&self.files, &self.job_id) {
            Ok(outcome) => {
                self.outcome = Some(outcome);
                self.status_message = None;
            }
            Err(e) => {
                self.outcome = None;
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Whether there is anything worth exporting.
    pub fn can_export(&self) -> bool {
        self.outcome.as_ref().is_some_and(BatchOutcome::has_matches)
    }

    /// Write the export document of the last outcome to `path`.
    pub fn write_export(&self, path: &Path) -> Result<()> {
        let outcome = self
            .outcome
            .as_ref()
            .context("nothing has been processed yet")?;
        let json = outcome.to_json_pretty().context("serializing results")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported results to {}", path.display());
        Ok(())
    }
}

fn read_upload(path: &Path) -> Result<UploadedFile> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} is not a file", path.display()))?;
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(UploadedFile::new(name, bytes))
}
