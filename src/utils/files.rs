use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::assets::{AssetKind, FACTIONS_SUBDIR};

/// Ensure the per-kind output directories exist under the output root
pub fn ensure_directories(output_root: &Path) -> io::Result<()> {
    let dirs_to_create = vec![
        output_root.join(AssetKind::Hero.subdir()),
        output_root.join(AssetKind::Background.subdir()),
        output_root.join(FACTIONS_SUBDIR),
    ];

    // Check which directories don't exist
    let missing_dirs: Vec<PathBuf> = dirs_to_create
        .into_par_iter()
        .filter(|dir| !dir.exists())
        .collect();

    // Create missing directories in parallel
    missing_dirs
        .par_iter()
        .try_for_each(|dir| -> io::Result<()> {
            fs::create_dir_all(dir)?;
            println!("Created directory: {}", dir.display());
            Ok(())
        })?;

    Ok(())
}

/// Cache probe: true if the asset is already materialized at its canonical path
pub fn exists(local_path: &Path) -> bool {
    local_path.is_file()
}
