use futures::stream::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Duration;

use crate::assets::{backgrounds, heroes, AssetKind, AssetRequest};
use crate::auth;
use crate::error::PipelineError;
use crate::manifest;
use crate::utils::files;
use crate::utils::http::AssetSource;
use crate::utils::images;

/// Explicit run context; no process-wide state, so repeated runs in one
/// process stay independent
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub output_root: PathBuf,
    /// Specific hero names, or the canonical roster when absent
    pub hero_names: Option<Vec<String>>,
    pub background_count: usize,
    pub security_key: Option<String>,
    pub concurrency: usize,
    pub request_timeout: Duration,
}

/// What happened to one requested asset
#[derive(Debug, Clone, PartialEq)]
pub enum AssetOutcome {
    Fetched,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct AssetReport {
    pub name: String,
    pub kind: AssetKind,
    pub outcome: AssetOutcome,
}

/// Structured summary of a completed run
#[derive(Debug)]
pub struct PipelineReport {
    /// Result of the advisory authorization check
    pub verified: bool,
    pub assets: Vec<AssetReport>,
    pub manifest_path: PathBuf,
}

impl PipelineReport {
    pub fn fetched(&self) -> usize {
        self.count(|outcome| matches!(outcome, AssetOutcome::Fetched))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, AssetOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, AssetOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&AssetOutcome) -> bool) -> usize {
        self.assets
            .iter()
            .filter(|asset| predicate(&asset.outcome))
            .count()
    }
}

/// Run the full pipeline: probe, fetch, transform, manifest
///
/// Per-asset failures are isolated; the manifest is generated only after
/// every fetch/transform task has settled.
pub async fn run<S: AssetSource>(
    config: &PipelineConfig,
    source: &S,
) -> Result<PipelineReport, PipelineError> {
    files::ensure_directories(&config.output_root)?;

    let verified = auth::check(config.security_key.as_deref());

    let mut requests = heroes::requests(config.hero_names.as_deref(), &config.output_root);
    requests.extend(backgrounds::requests(
        config.background_count,
        &config.output_root,
    ));

    // Batch-probe the cache before any network work
    let (cached, pending): (Vec<AssetRequest>, Vec<AssetRequest>) = requests
        .into_par_iter()
        .partition(|request| files::exists(&request.local_path));

    if !cached.is_empty() {
        println!("Skipping {} assets that already exist", cached.len());
    }
    println!(
        "Fetching {} new assets using {} workers",
        pending.len(),
        config.concurrency
    );

    let mut assets: Vec<AssetReport> = cached
        .into_iter()
        .map(|request| AssetReport {
            name: request.name,
            kind: request.kind,
            outcome: AssetOutcome::Skipped,
        })
        .collect();

    let pb = ProgressBar::new(pending.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .unwrap()
            .progress_chars("#>-"),
    );

    let downloads = pending.into_iter().map(|request| {
        let pb = pb.clone();
        async move {
            let outcome = process_asset(source, &request).await;
            pb.inc(1);
            AssetReport {
                name: request.name,
                kind: request.kind,
                outcome,
            }
        }
    });

    // The collect is the join barrier: manifest generation only starts once
    // every asset has settled
    let processed: Vec<AssetReport> = futures::stream::iter(downloads)
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;
    pb.finish_and_clear();
    assets.extend(processed);

    let failed = assets
        .iter()
        .filter(|asset| matches!(asset.outcome, AssetOutcome::Failed(_)))
        .count();
    if failed > 0 {
        eprintln!("Warning: {} assets failed", failed);
    }

    let manifest = manifest::build(&config.output_root)?;
    println!(
        "Generated image manifest with {} heroes and {} backgrounds",
        manifest.heroes.len(),
        manifest.backgrounds.len()
    );
    let manifest_path = manifest::write(&manifest, &config.output_root)?;

    Ok(PipelineReport {
        verified,
        assets,
        manifest_path,
    })
}

/// Fetch-then-transform for one asset; the two steps never interleave with
/// another asset's work on the same file
async fn process_asset<S: AssetSource>(source: &S, request: &AssetRequest) -> AssetOutcome {
    if let Err(e) = source.fetch(&request.remote_url, &request.local_path).await {
        eprintln!("  Failed to fetch {}: {}", request.name, e);
        return AssetOutcome::Failed(e.to_string());
    }

    // Transform failures leave the fetched raw file in place
    if let Err(e) = images::transform_in_place(&request.local_path, &request.kind.profile()) {
        eprintln!("  Error processing {}: {}", request.name, e);
        return AssetOutcome::Failed(e.to_string());
    }

    AssetOutcome::Fetched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{BACKGROUND_IMAGES_SOURCE, HERO_IMAGES_SOURCE};
    use crate::error::FetchError;
    use crate::manifest::Manifest;
    use std::collections::HashMap;
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Mutex;

    /// In-process stand-in for the HTTP source: known URLs succeed with
    /// canned bytes, everything else is a 404
    struct MockSource {
        bodies: HashMap<String, Vec<u8>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockSource {
        fn new() -> Self {
            MockSource {
                bodies: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_body(mut self, url: String, bytes: Vec<u8>) -> Self {
            self.bodies.insert(url, bytes);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl AssetSource for MockSource {
        async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
            self.calls.lock().unwrap().push(url.to_owned());
            match self.bodies.get(url) {
                Some(bytes) => {
                    fs::write(dest, bytes).map_err(|e| FetchError::io(dest, e))?;
                    Ok(())
                }
                None => Err(FetchError::BadStatus(404)),
            }
        }
    }

    fn hero_url(name: &str) -> String {
        format!("{}{}.png", HERO_IMAGES_SOURCE, name)
    }

    fn background_url(name: &str) -> String {
        format!("{}{}.jpg", BACKGROUND_IMAGES_SOURCE, name)
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([90, 120, 180]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([180, 160, 140]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    fn test_config(
        output_root: &Path,
        hero_names: Vec<&str>,
        background_count: usize,
    ) -> PipelineConfig {
        PipelineConfig {
            output_root: output_root.to_path_buf(),
            hero_names: Some(hero_names.into_iter().map(str::to_owned).collect()),
            background_count,
            security_key: None,
            concurrency: 4,
            request_timeout: Duration::from_secs(5),
        }
    }

    fn read_manifest(output_root: &Path) -> Manifest {
        let json = fs::read_to_string(output_root.join("image-manifest.json")).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[tokio::test]
    async fn missing_asset_does_not_abort_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let source =
            MockSource::new().with_body(hero_url("horus"), png_bytes(800, 600));
        let config = test_config(dir.path(), vec!["horus", "unknown-hero"], 0);

        let report = run(&config, &source).await.unwrap();

        assert_eq!(report.fetched(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 0);
        // No key supplied; the advisory gate reports unverified but the
        // pipeline still ran
        assert!(!report.verified);

        let hero_path = dir.path().join("heroes/horus.png");
        assert!(hero_path.exists());
        let img = image::open(&hero_path).unwrap();
        assert_eq!(image::GenericImageView::dimensions(&img), (512, 384));

        assert!(!dir.path().join("heroes/unknown-hero.png").exists());

        let manifest = read_manifest(dir.path());
        assert_eq!(manifest.heroes.len(), 1);
        assert_eq!(manifest.heroes[0].name, "horus");
    }

    #[tokio::test]
    async fn cached_assets_short_circuit_the_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let hero_path = dir.path().join("heroes/horus.png");
        fs::create_dir_all(hero_path.parent().unwrap()).unwrap();
        fs::write(&hero_path, b"original-bytes").unwrap();

        let source = MockSource::new().with_body(hero_url("horus"), png_bytes(64, 64));
        let config = test_config(dir.path(), vec!["horus"], 0);

        let report = run(&config, &source).await.unwrap();

        assert_eq!(report.skipped(), 1);
        assert_eq!(report.fetched(), 0);
        assert!(source.calls().is_empty());
        assert_eq!(fs::read(&hero_path).unwrap(), b"original-bytes");
    }

    #[tokio::test]
    async fn one_failure_never_blocks_the_remaining_assets() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSource::new()
            .with_body(hero_url("horus"), png_bytes(64, 64))
            .with_body(hero_url("garuda"), png_bytes(64, 64));
        let config = test_config(dir.path(), vec!["horus", "unknown-hero", "garuda"], 0);

        let report = run(&config, &source).await.unwrap();

        assert_eq!(report.fetched(), 2);
        assert_eq!(report.failed(), 1);
        assert!(source.calls().contains(&hero_url("garuda")));
        assert!(dir.path().join("heroes/garuda.png").exists());

        let failed: Vec<&str> = report
            .assets
            .iter()
            .filter(|asset| matches!(asset.outcome, AssetOutcome::Failed(_)))
            .map(|asset| asset.name.as_str())
            .collect();
        assert_eq!(failed, vec!["unknown-hero"]);
    }

    #[tokio::test]
    async fn backgrounds_produce_dark_variants_and_manifest_entries() {
        let dir = tempfile::tempdir().unwrap();
        let source =
            MockSource::new().with_body(background_url("hero-bg"), jpeg_bytes(128, 96));
        let config = test_config(dir.path(), vec![], 1);

        let report = run(&config, &source).await.unwrap();

        assert_eq!(report.fetched(), 1);
        assert!(dir.path().join("backgrounds/hero-bg.jpg").exists());
        assert!(dir.path().join("backgrounds/hero-bg-dark.jpg").exists());

        let manifest = read_manifest(dir.path());
        assert_eq!(manifest.backgrounds.len(), 2);
        assert_eq!(manifest.backgrounds[0].filename, "hero-bg-dark.jpg");
        assert_eq!(manifest.backgrounds[1].filename, "hero-bg.jpg");
    }

    #[tokio::test]
    async fn second_run_skips_everything_and_rebuilds_the_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSource::new()
            .with_body(hero_url("horus"), png_bytes(64, 64))
            .with_body(background_url("hero-bg"), jpeg_bytes(64, 64));
        let config = test_config(dir.path(), vec!["horus"], 1);

        let first = run(&config, &source).await.unwrap();
        assert_eq!(first.fetched(), 2);
        let first_manifest = read_manifest(dir.path());

        let second = run(&config, &source).await.unwrap();
        assert_eq!(second.fetched(), 0);
        assert_eq!(second.skipped(), 2);
        assert_eq!(source.calls().len(), 2);

        let second_manifest = read_manifest(dir.path());
        assert_eq!(second_manifest.heroes, first_manifest.heroes);
        assert_eq!(second_manifest.backgrounds, first_manifest.backgrounds);
        assert_eq!(second_manifest.factions, first_manifest.factions);
    }

    #[tokio::test]
    async fn valid_security_key_is_reported_verified() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockSource::new();
        let mut config = test_config(dir.path(), vec![], 0);
        config.security_key = Some("ih-accounts.github.io:ci".to_owned());

        let report = run(&config, &source).await.unwrap();

        assert!(report.verified);
        assert!(report.assets.is_empty());
        assert_eq!(
            report.manifest_path,
            dir.path().join("image-manifest.json")
        );
    }

    #[tokio::test]
    async fn undecodable_body_is_reported_but_left_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let source =
            MockSource::new().with_body(hero_url("horus"), b"not an image".to_vec());
        let config = test_config(dir.path(), vec!["horus"], 0);

        let report = run(&config, &source).await.unwrap();

        assert_eq!(report.failed(), 1);
        // The raw fetch is left in place, so the scan still lists it
        assert!(dir.path().join("heroes/horus.png").exists());
        let manifest = read_manifest(dir.path());
        assert_eq!(manifest.heroes.len(), 1);
    }
}
