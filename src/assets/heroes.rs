use std::path::Path;

use super::{AssetKind, AssetRequest};

/// Canonical hero roster used when no explicit list is supplied
pub const DEFAULT_HEROES: [&str; 10] = [
    "horus",
    "garuda",
    "tix",
    "russell",
    "ithaqua",
    "carrie",
    "sherlock",
    "delacium",
    "drake",
    "rogan",
];

/// Build fetch requests for the given hero names, or the canonical roster
pub fn requests(names: Option<&[String]>, output_root: &Path) -> Vec<AssetRequest> {
    match names {
        Some(names) => names
            .iter()
            .map(|name| AssetRequest::new(name, AssetKind::Hero, output_root))
            .collect(),
        None => DEFAULT_HEROES
            .iter()
            .map(|name| AssetRequest::new(name, AssetKind::Hero, output_root))
            .collect(),
    }
}
