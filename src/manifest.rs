use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assets::{AssetKind, FACTIONS_SUBDIR};
use crate::error::ManifestError;

pub const MANIFEST_VERSION: &str = "1.0";
pub const MANIFEST_FILENAME: &str = "image-manifest.json";

/// Manifest-facing projection of a materialized asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub name: String,
    pub filename: String,
    /// Logical path for the presentation layer, not a filesystem path
    pub path: String,
}

/// Structured description of everything present in the output tree
///
/// Rebuilt from scratch on every run; field order fixes the JSON key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub timestamp: String,
    pub heroes: Vec<AssetRecord>,
    pub backgrounds: Vec<AssetRecord>,
    pub factions: Vec<AssetRecord>,
}

/// Scan the output tree and describe it, stamped with the current UTC time
pub fn build(output_root: &Path) -> Result<Manifest, ManifestError> {
    Ok(Manifest {
        version: MANIFEST_VERSION.to_owned(),
        timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        heroes: scan_records(output_root, AssetKind::Hero.subdir(), AssetKind::Hero.extension())?,
        backgrounds: scan_records(
            output_root,
            AssetKind::Background.subdir(),
            AssetKind::Background.extension(),
        )?,
        factions: scan_records(output_root, FACTIONS_SUBDIR, "png")?,
    })
}

/// Write a manifest to its fixed filename under the output root
pub fn write(manifest: &Manifest, output_root: &Path) -> Result<PathBuf, ManifestError> {
    let path = output_root.join(MANIFEST_FILENAME);
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, json).map_err(|source| ManifestError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// List matching files in one asset directory, sorted by filename
fn scan_records(
    output_root: &Path,
    subdir: &str,
    extension: &str,
) -> Result<Vec<AssetRecord>, ManifestError> {
    let dir = output_root.join(subdir);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(&dir).map_err(|source| ManifestError::Scan {
        path: dir.clone(),
        source,
    })?;

    let mut filenames: Vec<String> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            if !path.is_file() {
                return None;
            }
            if path.extension().and_then(OsStr::to_str) != Some(extension) {
                return None;
            }
            path.file_name().and_then(OsStr::to_str).map(str::to_owned)
        })
        .collect();
    filenames.sort();

    Ok(filenames
        .into_iter()
        .map(|filename| {
            let name = Path::new(&filename)
                .file_stem()
                .and_then(OsStr::to_str)
                .unwrap_or(&filename)
                .to_owned();
            AssetRecord {
                path: format!("images/{}/{}", subdir, filename),
                name,
                filename,
            }
        })
        .collect())
}
