use std::path::Path;

use super::{AssetKind, AssetRequest};

/// Fixed ordered list of page backgrounds available on the remote source
pub const CANONICAL_BACKGROUNDS: [&str; 3] = ["hero-bg", "faction-bg", "summon-bg"];

/// Build fetch requests for the first `count` canonical backgrounds
pub fn requests(count: usize, output_root: &Path) -> Vec<AssetRequest> {
    CANONICAL_BACKGROUNDS
        .iter()
        .take(count)
        .map(|name| AssetRequest::new(name, AssetKind::Background, output_root))
        .collect()
}
