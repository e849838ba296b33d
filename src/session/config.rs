use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{
    edit::request::TrimMode,
    foundation::error::{EditError, EditResult},
};

/// Options controlling an [`crate::EditorSession`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum undo entries kept. `0` keeps everything.
    pub history_limit: usize,
    /// Trim philosophy used when a trim request names none.
    pub trim_mode: TrimMode,
    /// Re-range compositors with an origin clip whenever that clip moves.
    pub compositors_follow_clips: bool,
    /// Worker threads for background render jobs.
    pub job_workers: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            trim_mode: TrimMode::Insert,
            compositors_follow_clips: true,
            job_workers: 2,
        }
    }
}

impl EditorConfig {
    /// Parse options from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> EditResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| EditError::serde(format!("parse editor config JSON: {e}")))
    }

    /// Parse options from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> EditResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            EditError::validation(format!("open editor config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
