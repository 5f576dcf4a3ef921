use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb};
use std::ffi::OsStr;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::TransformError;

/// JPEG re-encode quality for processed assets
const JPEG_QUALITY: u8 = 85;

/// A single post-processing step applied to a pixel buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformStep {
    /// Downscale to fit the cap box, preserving aspect ratio; never upscales
    Resize { max_width: u32, max_height: u32 },
    /// Gaussian blur
    Blur { sigma: f32 },
    /// Multiplicative brightness scaling (factor < 1.0 darkens)
    Brighten { factor: f32 },
}

/// Ordered post-processing policy for one asset kind
#[derive(Debug, Clone, PartialEq)]
pub struct TransformProfile {
    pub steps: Vec<TransformStep>,
    /// Brightness factor for a second `-dark` file derived from the buffer
    /// captured before the primary brightness step
    pub dark_variant: Option<f32>,
}

impl TransformProfile {
    /// Hero portraits: cap at 512px, no filters, no variant
    pub fn hero() -> Self {
        TransformProfile {
            steps: vec![TransformStep::Resize {
                max_width: 512,
                max_height: 512,
            }],
            dark_variant: None,
        }
    }

    /// Page backgrounds: cap at 1920x1080, soften and darken for text
    /// overlay, plus a dimmer `-dark` rendition
    pub fn background() -> Self {
        TransformProfile {
            steps: vec![
                TransformStep::Resize {
                    max_width: 1920,
                    max_height: 1080,
                },
                TransformStep::Blur { sigma: 2.0 },
                TransformStep::Brighten { factor: 0.8 },
            ],
            dark_variant: Some(0.5),
        }
    }
}

/// Apply a transform profile to a fetched image, overwriting it in place
///
/// The dark variant, when configured, restarts from the buffer as it was
/// before the first `Brighten` step, so both renditions derive from the
/// same blurred source rather than from each other.
pub fn transform_in_place(path: &Path, profile: &TransformProfile) -> Result<(), TransformError> {
    let mut img = image::open(path).map_err(|e| TransformError::Decode {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut variant_base: Option<DynamicImage> = None;
    for step in &profile.steps {
        if profile.dark_variant.is_some()
            && variant_base.is_none()
            && matches!(step, TransformStep::Brighten { .. })
        {
            variant_base = Some(img.clone());
        }
        img = apply_step(img, step);
    }

    save_optimized(&img, path)?;

    if let Some(factor) = profile.dark_variant {
        let base = variant_base.unwrap_or_else(|| img.clone());
        let dark = scale_brightness(&base, factor);
        save_optimized(&dark, &variant_path(path))?;
    }

    Ok(())
}

/// Apply a single transform step to a pixel buffer
pub fn apply_step(img: DynamicImage, step: &TransformStep) -> DynamicImage {
    match step {
        TransformStep::Resize {
            max_width,
            max_height,
        } => {
            let (width, height) = img.dimensions();
            if width > *max_width || height > *max_height {
                img.resize(*max_width, *max_height, image::imageops::FilterType::Lanczos3)
            } else {
                img
            }
        }
        TransformStep::Blur { sigma } => img.blur(*sigma),
        TransformStep::Brighten { factor } => scale_brightness(&img, *factor),
    }
}

/// Scale per-channel brightness multiplicatively
fn scale_brightness(img: &DynamicImage, factor: f32) -> DynamicImage {
    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut new_img = ImageBuffer::new(width, height);

    for (x, y, pixel) in rgb_img.enumerate_pixels() {
        let r = (pixel[0] as f32 * factor).clamp(0.0, 255.0) as u8;
        let g = (pixel[1] as f32 * factor).clamp(0.0, 255.0) as u8;
        let b = (pixel[2] as f32 * factor).clamp(0.0, 255.0) as u8;

        new_img.put_pixel(x, y, Rgb([r, g, b]));
    }

    DynamicImage::ImageRgb8(new_img)
}

/// Sibling path for the dark rendition: `<stem>-dark.<ext>`
fn variant_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(OsStr::to_str).unwrap_or_default();
    let ext = path.extension().and_then(OsStr::to_str).unwrap_or_default();
    path.with_file_name(format!("{}-dark.{}", stem, ext))
}

/// Re-encode a processed buffer over `path`, lossy at quality 85 for JPEG
fn save_optimized(img: &DynamicImage, path: &Path) -> Result<(), TransformError> {
    let is_jpeg = matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .as_deref(),
        Some("jpg" | "jpeg")
    );

    if is_jpeg {
        let file = fs::File::create(path).map_err(|e| TransformError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        let encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
        img.to_rgb8()
            .write_with_encoder(encoder)
            .map_err(|e| TransformError::Encode {
                path: path.to_path_buf(),
                source: e,
            })?;
        writer.flush().map_err(|e| TransformError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    } else {
        img.save(path).map_err(|e| TransformError::Encode {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    Ok(())
}
