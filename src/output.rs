//! Persistence Boundary
//!
//! The compiled document is always returned in memory. It reaches disk only
//! when the commit flag is set. A failed write is reported once, never retried.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::SceneError;
use crate::scene::SceneDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub commit: bool,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub json: String,
    pub written: Option<PathBuf>,
    pub status: String,
}

/// Destination must be a `.json`/`.js` file inside an existing directory.
/// A `;` or more than one `:` (beyond a drive prefix) marks a malformed name.
pub fn check_destination(path: &Path) -> Result<(), SceneError> {
    let text = path.to_string_lossy();
    if text.contains(';') || text.matches(':').count() > 1 {
        return Err(SceneError::InvalidDestination(format!(
            "{} is not a valid file name",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    if !matches!(extension.as_deref(), Some("json") | Some("js")) {
        return Err(SceneError::InvalidDestination(format!(
            "{} is not a .json or .js file",
            path.display()
        )));
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.is_dir() {
            return Err(SceneError::InvalidDestination(format!(
                "directory {} does not exist",
                dir.display()
            )));
        }
    }
    Ok(())
}

/// Write the full text; the file handle is released on every exit path
pub fn write_scene(text: &str, path: &Path) -> Result<(), SceneError> {
    let io_err = |source: std::io::Error| SceneError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes()).map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    Ok(())
}

pub fn publish(
    document: &SceneDocument,
    target: &OutputTarget,
    pretty: bool,
) -> Result<PublishOutcome, SceneError> {
    let json = document.to_json(pretty)?;

    if !target.commit {
        return Ok(PublishOutcome {
            json,
            written: None,
            status: "Scene compiled but not written: set the commit flag to write it to disk"
                .to_string(),
        });
    }

    check_destination(&target.path)?;
    write_scene(&json, &target.path)?;
    info!(path = %target.path.display(), bytes = json.len(), "Scene written");

    Ok(PublishOutcome {
        status: format!("Scene written successfully to {}", target.path.display()),
        written: Some(target.path.clone()),
        json,
    })
}
