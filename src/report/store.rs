//! Report persistence

use std::path::Path;

use super::model::ComparisonReport;
use super::ReportError;
use crate::infra::FileSystem;

/// Write `report` as pretty-printed JSON
pub fn save_json<FS: FileSystem>(
    fs: &FS,
    path: &Path,
    report: &ComparisonReport,
) -> Result<(), ReportError> {
    let mut json = serde_json::to_string_pretty(report).map_err(ReportError::Encode)?;
    json.push('\n');
    write(fs, path, &json)
}

/// Write an already rendered Markdown report
pub fn save_markdown<FS: FileSystem>(
    fs: &FS,
    path: &Path,
    rendered: &str,
) -> Result<(), ReportError> {
    write(fs, path, rendered)
}

/// Load a report previously written by [`save_json`]
pub fn load_json<FS: FileSystem>(fs: &FS, path: &Path) -> Result<ComparisonReport, ReportError> {
    let raw = fs.read_to_string(path).map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ReportError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn write<FS: FileSystem>(fs: &FS, path: &Path, contents: &str) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.create_dir_all(parent)
            .map_err(|source| ReportError::Write {
                path: path.to_path_buf(),
                source,
            })?;
    }
    fs.write(path, contents).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("wrote {}", path.display());
    Ok(())
}
