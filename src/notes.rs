use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Content of the optional notes file. Reading it never fails; a missing
/// or unreadable file is just another state to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Notes {
    Present { text: String },
    Missing { path: PathBuf },
    Unreadable { path: PathBuf, reason: String },
}

pub fn read_notes(path: &Path) -> Notes {
    match std::fs::read_to_string(path) {
        Ok(text) => Notes::Present { text },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("no notes file at {}", path.display());
            Notes::Missing {
                path: path.to_path_buf(),
            }
        }
        Err(e) => {
            log::warn!("couldn't read {}: {e}", path.display());
            Notes::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}
