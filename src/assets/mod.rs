use std::path::{Path, PathBuf};

use crate::utils::images::TransformProfile;

// Official image resources
pub const HERO_IMAGES_SOURCE: &str = "https://idle-heroes.com/assets/images/heroes/";
pub const BACKGROUND_IMAGES_SOURCE: &str = "https://idle-heroes.com/assets/images/backgrounds/";
/// Faction icon source; defined for parity with the remote layout but no
/// fetch path uses it yet.
#[allow(dead_code)]
pub const FACTION_ICONS_SOURCE: &str = "https://idle-heroes.com/assets/images/factions/";

/// Directory under the output root reserved for faction icons
pub const FACTIONS_SUBDIR: &str = "factions";

/// Class of a remote asset, driving its URL, local layout and transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Hero,
    Background,
}

impl AssetKind {
    /// Subdirectory under the output root for this kind
    pub fn subdir(self) -> &'static str {
        match self {
            AssetKind::Hero => "heroes",
            AssetKind::Background => "backgrounds",
        }
    }

    /// File extension used by the remote source for this kind
    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Hero => "png",
            AssetKind::Background => "jpg",
        }
    }

    /// Post-processing profile applied after a successful fetch
    pub fn profile(self) -> TransformProfile {
        match self {
            AssetKind::Hero => TransformProfile::hero(),
            AssetKind::Background => TransformProfile::background(),
        }
    }
}

// Unified request structure for both heroes and backgrounds
#[derive(Debug, Clone)]
pub struct AssetRequest {
    pub name: String,
    pub kind: AssetKind,
    pub remote_url: String,
    pub local_path: PathBuf,
}

impl AssetRequest {
    /// Derive the canonical URL and local path for a named asset
    pub fn new(name: &str, kind: AssetKind, output_root: &Path) -> Self {
        let base = match kind {
            AssetKind::Hero => HERO_IMAGES_SOURCE,
            AssetKind::Background => BACKGROUND_IMAGES_SOURCE,
        };
        let filename = format!("{}.{}", name, kind.extension());

        AssetRequest {
            name: name.to_owned(),
            kind,
            remote_url: format!("{}{}", base, filename),
            local_path: output_root.join(kind.subdir()).join(filename),
        }
    }
}

// Re-export asset-class modules
pub mod backgrounds;
pub mod heroes;
