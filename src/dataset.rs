//! Batch descriptor extraction for the training pipeline.
//!
//! Extraction has no cross-image state, so the batch fans out across a rayon
//! pool. An unreadable or malformed file never aborts the batch; it is
//! logged and excluded from the result set.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use log::warn;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::features::extract_descriptor;
use crate::types::{FaceImage, Label, IMAGE_SIZE};

/// Decode an image file and resize it to the fixed 128x128 RGB
/// representation the extractors expect.
pub fn load_face_image<P: AsRef<Path>>(path: P) -> Result<FaceImage> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|e| Error::InvalidImage(format!("{}: {}", path.display(), e)))?;
    let resized = img
        .resize_exact(IMAGE_SIZE, IMAGE_SIZE, FilterType::Triangle)
        .to_rgb8();
    FaceImage::from_rgb(resized.into_raw())
}

/// Extract descriptors for a labeled file list in parallel.
///
/// Files that fail to decode are skipped with a warning; the returned set
/// contains only successful extractions, in an unspecified order.
pub fn extract_batch(entries: &[(PathBuf, Label)]) -> Vec<(Vec<f64>, Label)> {
    entries
        .par_iter()
        .filter_map(|(path, label)| match load_face_image(path) {
            Ok(face) => Some((extract_descriptor(&face), *label)),
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::DESCRIPTOR_LEN;

    #[test]
    fn load_resizes_any_input_to_fixed_dimensions() {
        let temp_path = std::env::temp_dir().join("veriface_test_load.png");
        let img = image::RgbImage::from_fn(64, 48, |x, y| {
            image::Rgb([x as u8, y as u8, 100])
        });
        img.save(&temp_path).unwrap();

        let face = load_face_image(&temp_path).unwrap();
        std::fs::remove_file(&temp_path).ok();

        assert_eq!(face.width(), IMAGE_SIZE);
        assert_eq!(face.height(), IMAGE_SIZE);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = load_face_image("/nonexistent/veriface.png").unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn batch_skips_unreadable_files() {
        let dir = std::env::temp_dir();
        let good = dir.join("veriface_test_batch_good.png");
        let bad = dir.join("veriface_test_batch_bad.png");

        image::RgbImage::from_fn(32, 32, |x, y| image::Rgb([x as u8, y as u8, 0]))
            .save(&good)
            .unwrap();
        std::fs::write(&bad, b"not an image").unwrap();

        let entries = vec![
            (good.clone(), Label::Real),
            (bad.clone(), Label::AiGenerated),
            (dir.join("veriface_test_batch_missing.png"), Label::Real),
        ];
        let batch = extract_batch(&entries);

        std::fs::remove_file(&good).ok();
        std::fs::remove_file(&bad).ok();

        assert_eq!(batch.len(), 1);
        let (descriptor, label) = &batch[0];
        assert_eq!(descriptor.len(), DESCRIPTOR_LEN);
        assert_eq!(*label, Label::Real);
    }
}
