//! Image preprocessing for the leaf classifier
//!
//! Produces an NHWC batch of one, `(1, S, S, 3)` f32. Two paths exist:
//!
//! - fast: decode, resize (nearest), divide by 255. Crops and backbone
//!   normalizations are skipped.
//! - full: decode with orientation metadata applied, optional leaf-centric
//!   crop, optional center square crop, bicubic resize, then the configured
//!   normalization.
//!
//! The leaf crop and the backbone normalizations are best-effort. They report
//! [`Unchanged`] instead of failing, and the caller carries on with its
//! previous state.

use crate::artifact::ModelInput;
use crate::config::ClassifierConfig;
use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Minimum green advantage over red and blue for a leaf pixel
const LEAF_CHANNEL_MARGIN: i16 = 10;

/// Minimum green intensity for a leaf pixel
const LEAF_MIN_GREEN: i16 = 40;

/// Mask must cover strictly more than this share of the image
const LEAF_MIN_COVERAGE: f64 = 0.01;

/// Bounding-box padding per side, as a share of the box extent
const LEAF_MARGIN: f64 = 0.05;

/// Per-channel means subtracted in the caffe (ResNet50) convention, BGR order
const CAFFE_MEAN_BGR: [f32; 3] = [103.939, 116.779, 123.68];

/// Pixel normalization matching a pretrained backbone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// Raw 0..255; the network rescales internally
    EfficientNet,
    /// BGR with ImageNet channel means subtracted
    ResNet50,
    /// Scaled to [-1, 1]
    MobileNetV2,
    /// Divide by 255
    #[default]
    Rescale,
}

impl Normalization {
    pub fn from_setting(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "efficientnet" => Some(Normalization::EfficientNet),
            "resnet50" => Some(Normalization::ResNet50),
            "mobilenet_v2" => Some(Normalization::MobileNetV2),
            "none" => Some(Normalization::Rescale),
            _ => None,
        }
    }

    /// Apply the strategy; named strategies may refuse and leave the pixels alone
    pub fn apply(&self, image: &RgbImage) -> Result<Vec<f32>, Unchanged> {
        let raw = image.as_raw();
        if raw.len() != image.width() as usize * image.height() as usize * 3 {
            return Err(Unchanged::new("pixel buffer does not match RGB dimensions"));
        }

        let values: Vec<f32> = match self {
            Normalization::Rescale => return Ok(rescale(image)),
            Normalization::EfficientNet => raw.iter().map(|&v| v as f32).collect(),
            Normalization::MobileNetV2 => raw.iter().map(|&v| v as f32 / 127.5 - 1.0).collect(),
            Normalization::ResNet50 => raw
                .chunks_exact(3)
                .flat_map(|px| {
                    [
                        px[2] as f32 - CAFFE_MEAN_BGR[0],
                        px[1] as f32 - CAFFE_MEAN_BGR[1],
                        px[0] as f32 - CAFFE_MEAN_BGR[2],
                    ]
                })
                .collect(),
        };

        if values.iter().any(|v| !v.is_finite()) {
            return Err(Unchanged::new("normalization produced non-finite values"));
        }
        Ok(values)
    }
}

/// A best-effort step declined to modify its input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unchanged {
    pub reason: String,
}

impl Unchanged {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Unchanged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Converts an image file into the classifier's input batch
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    size: u32,
    fast_loader: bool,
    auto_leaf_crop: bool,
    center_crop: bool,
    normalization: Normalization,
}

impl ImagePreprocessor {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            size: config.image_size,
            fast_loader: config.fast_loader,
            auto_leaf_crop: config.auto_leaf_crop,
            center_crop: config.center_crop,
            normalization: config.normalization,
        }
    }

    pub fn input_shape(&self) -> Vec<usize> {
        let s = self.size as usize;
        vec![1, s, s, 3]
    }

    /// Load an image from disk and build the batch
    pub fn load(&self, path: &Path) -> Result<ModelInput> {
        if self.fast_loader {
            let image = image::open(path)
                .with_context(|| format!("Failed to open image {}", path.display()))?;
            return self.fast(&image);
        }
        let image = decode_oriented(path)?;
        self.prepare(&image)
    }

    /// Simplified path: resize and divide by 255 only
    pub fn fast(&self, image: &DynamicImage) -> Result<ModelInput> {
        let resized = image
            .resize_exact(self.size, self.size, FilterType::Nearest)
            .to_rgb8();
        ModelInput::new(self.input_shape(), rescale(&resized))
    }

    /// Full path on an already decoded, correctly oriented image
    pub fn prepare(&self, image: &DynamicImage) -> Result<ModelInput> {
        let mut rgb = image.to_rgb8();
        if rgb.width() == 0 || rgb.height() == 0 {
            anyhow::bail!("Image has no pixels");
        }

        if self.auto_leaf_crop {
            match leaf_crop(&rgb) {
                Ok(cropped) => {
                    debug!(width = cropped.width(), height = cropped.height(), "Leaf crop applied");
                    rgb = cropped;
                }
                Err(unchanged) => debug!(reason = %unchanged, "Leaf crop skipped"),
            }
        }

        if self.center_crop {
            rgb = center_square(&rgb);
        }

        let resized = imageops::resize(&rgb, self.size, self.size, FilterType::CatmullRom);

        let values = match self.normalization.apply(&resized) {
            Ok(values) => values,
            Err(unchanged) => {
                debug!(
                    strategy = ?self.normalization,
                    reason = %unchanged,
                    "Normalization fell back to divide-by-255"
                );
                rescale(&resized)
            }
        };

        ModelInput::new(self.input_shape(), values)
    }
}

fn decode_oriented(path: &Path) -> Result<DynamicImage> {
    let mut decoder = ImageReader::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .with_guessed_format()
        .context("Failed to detect image format")?
        .into_decoder()
        .context("Unsupported image format")?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut image = DynamicImage::from_decoder(decoder).context("Failed to decode image")?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// Crop to the padded bounding box of green-dominant pixels
pub fn leaf_crop(image: &RgbImage) -> Result<RgbImage, Unchanged> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Unchanged::new("empty image"));
    }

    let mut count: u64 = 0;
    let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0u32, 0u32);
    for (x, y, px) in image.enumerate_pixels() {
        let [r, g, b] = px.0.map(i16::from);
        if g > r + LEAF_CHANNEL_MARGIN && g > b + LEAF_CHANNEL_MARGIN && g > LEAF_MIN_GREEN {
            count += 1;
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
    }

    let total = width as u64 * height as u64;
    if count as f64 <= LEAF_MIN_COVERAGE * total as f64 {
        return Err(Unchanged::new("leaf mask below coverage threshold"));
    }

    let pad_x = (LEAF_MARGIN * (x1 - x0 + 1) as f64) as u32;
    let pad_y = (LEAF_MARGIN * (y1 - y0 + 1) as f64) as u32;
    let left = x0.saturating_sub(pad_x);
    let top = y0.saturating_sub(pad_y);
    let right = (x1 + pad_x).min(width);
    let bottom = (y1 + pad_y).min(height);

    if right <= left || bottom <= top {
        return Err(Unchanged::new("degenerate leaf bounding box"));
    }

    Ok(imageops::crop_imm(image, left, top, right - left, bottom - top).to_image())
}

/// Largest centered square
pub fn center_square(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let side = width.min(height);
    if width == height {
        return image.clone();
    }
    let left = (width - side) / 2;
    let top = (height - side) / 2;
    imageops::crop_imm(image, left, top, side, side).to_image()
}

fn rescale(image: &RgbImage) -> Vec<f32> {
    image.as_raw().iter().map(|&v| v as f32 / 255.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    const GRAY: Rgb<u8> = Rgb([200, 200, 200]);
    const LEAF: Rgb<u8> = Rgb([30, 180, 30]);

    fn leaf_on_gray() -> RgbImage {
        RgbImage::from_fn(100, 100, |x, y| {
            if (20..60).contains(&x) && (20..60).contains(&y) {
                LEAF
            } else {
                GRAY
            }
        })
    }

    fn preprocessor(configure: impl FnOnce(&mut ClassifierConfig)) -> ImagePreprocessor {
        let mut config = ClassifierConfig {
            image_size: 8,
            fast_loader: false,
            ..ClassifierConfig::default()
        };
        configure(&mut config);
        ImagePreprocessor::new(&config)
    }

    #[test]
    fn test_leaf_crop_pads_bounding_box() {
        let cropped = leaf_crop(&leaf_on_gray()).unwrap();
        // box 20..=59, extent 40, pad 2 -> [18, 61)
        assert_eq!(cropped.dimensions(), (43, 43));
        assert_eq!(*cropped.get_pixel(2, 2), LEAF);
    }

    #[test]
    fn test_leaf_crop_clamps_to_image() {
        let image = RgbImage::from_fn(50, 50, |x, _| if x < 40 { LEAF } else { GRAY });
        let cropped = leaf_crop(&image).unwrap();
        assert_eq!(cropped.height(), 50);
        assert_eq!(cropped.width(), 41);
    }

    #[test]
    fn test_leaf_crop_unchanged_without_leaf() {
        let image = RgbImage::from_pixel(64, 64, GRAY);
        assert!(leaf_crop(&image).is_err());
    }

    #[test]
    fn test_leaf_crop_requires_more_than_one_percent() {
        // exactly 1% of 100x100 is not enough
        let image = RgbImage::from_fn(100, 100, |x, y| if x < 10 && y < 10 { LEAF } else { GRAY });
        assert!(leaf_crop(&image).is_err());
    }

    #[test]
    fn test_dark_green_is_not_leaf() {
        let image = RgbImage::from_pixel(10, 10, Rgb([0, 35, 0]));
        assert!(leaf_crop(&image).is_err());
    }

    #[test]
    fn test_center_square() {
        let image = RgbImage::from_fn(300, 200, |x, _| Rgb([(x / 2) as u8, 0, 0]));
        let square = center_square(&image);
        assert_eq!(square.dimensions(), (200, 200));
        assert_eq!(square.get_pixel(0, 0)[0], 25);
    }

    #[test]
    fn test_normalizations() {
        let image = RgbImage::from_pixel(1, 1, Rgb([255, 0, 51]));

        assert_eq!(Normalization::Rescale.apply(&image).unwrap(), vec![1.0, 0.0, 0.2]);
        assert_eq!(
            Normalization::EfficientNet.apply(&image).unwrap(),
            vec![255.0, 0.0, 51.0]
        );

        let mobilenet = Normalization::MobileNetV2.apply(&image).unwrap();
        assert!((mobilenet[0] - 1.0).abs() < 1e-6);
        assert!((mobilenet[1] + 1.0).abs() < 1e-6);

        let resnet = Normalization::ResNet50.apply(&image).unwrap();
        assert!((resnet[0] - (51.0 - 103.939)).abs() < 1e-4);
        assert!((resnet[1] - (0.0 - 116.779)).abs() < 1e-4);
        assert!((resnet[2] - (255.0 - 123.68)).abs() < 1e-4);
    }

    #[test]
    fn test_normalization_settings() {
        assert_eq!(Normalization::from_setting("ResNet50"), Some(Normalization::ResNet50));
        assert_eq!(Normalization::from_setting("none"), Some(Normalization::Rescale));
        assert_eq!(Normalization::from_setting("inception"), None);
    }

    #[test]
    fn test_prepare_shape_and_range() {
        let pre = preprocessor(|c| c.auto_leaf_crop = true);
        let input = pre.prepare(&DynamicImage::ImageRgb8(leaf_on_gray())).unwrap();
        assert_eq!(input.shape, vec![1, 8, 8, 3]);
        assert_eq!(input.values.len(), 8 * 8 * 3);
        assert!(input.values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_prepare_leaf_crop_keeps_only_leaf() {
        let pre = preprocessor(|c| {
            c.auto_leaf_crop = true;
            c.image_size = 4;
        });
        let input = pre.prepare(&DynamicImage::ImageRgb8(leaf_on_gray())).unwrap();
        // center pixel of a tightly cropped leaf is green
        let idx = (2 * 4 + 2) * 3;
        assert!(input.values[idx + 1] > input.values[idx]);
    }

    #[test]
    fn test_prepare_applies_named_normalization() {
        let pre = preprocessor(|c| c.normalization = Normalization::MobileNetV2);
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([0, 0, 0])));
        let input = pre.prepare(&image).unwrap();
        assert!(input.values.iter().all(|v| (v + 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_load_fast_and_full_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leaf.png");
        leaf_on_gray().save(&path).unwrap();

        let fast = preprocessor(|c| {
            c.fast_loader = true;
            c.normalization = Normalization::EfficientNet;
        });
        let input = fast.load(&path).unwrap();
        assert_eq!(input.shape, vec![1, 8, 8, 3]);
        // fast path always divides by 255
        assert!(input.values.iter().all(|v| (0.0..=1.0).contains(v)));

        let full = preprocessor(|c| c.normalization = Normalization::EfficientNet);
        let input = full.load(&path).unwrap();
        assert!(input.values.iter().any(|v| *v > 1.0));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let pre = preprocessor(|_| {});
        assert!(pre.load(Path::new("/no/such/leaf.jpg")).is_err());
    }
}
