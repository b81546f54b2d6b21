use crate::api::types::ActivityId;
use crate::common::ApiError;
use std::path::{Path, PathBuf};

/// File formats Garmin Connect accepts
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["fit", "gpx", "tcx"];

/// A local activity file and the metadata to apply after upload
#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub path: PathBuf,
    /// Lower-cased, picks the upload endpoint
    pub extension: String,
    /// None until uploaded
    pub id: Option<ActivityId>,
    pub name: Option<String>,
    pub activity_type: Option<String>,
}

impl Activity {
    pub fn new(
        path: impl Into<PathBuf>,
        name: Option<String>,
        activity_type: Option<String>,
    ) -> Result<Self, ApiError> {
        let path = path.into();
        let extension = supported_extension(&path).ok_or_else(|| {
            ApiError::InvalidActivity(format!(
                "{} is not a .fit, .gpx or .tcx file",
                path.display()
            ))
        })?;

        if !path.is_file() {
            return Err(ApiError::InvalidActivity(format!(
                "{} does not exist or is not a file",
                path.display()
            )));
        }

        Ok(Self {
            path,
            extension,
            id: None,
            name: name.filter(|n| !n.trim().is_empty()),
            activity_type: activity_type.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn is_uploaded(&self) -> bool {
        self.id.is_some()
    }

    /// File name for logs and progress output
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

fn supported_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Expand CLI arguments into activity files
///
/// Files are kept as given (validated later by `Activity::new`).
/// Directories contribute their supported files, sorted, non-recursive.
pub fn collect_activity_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ApiError> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let entries = std::fs::read_dir(path).map_err(|e| {
                ApiError::InvalidActivity(format!("cannot read {}: {e}", path.display()))
            })?;

            let mut found: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .filter(|p| {
                    let keep = supported_extension(p).is_some();
                    if !keep {
                        tracing::debug!(path = %p.display(), "skipping unsupported file");
                    }
                    keep
                })
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    Ok(files)
}
