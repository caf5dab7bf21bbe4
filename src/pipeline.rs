//! The end-to-end inference pipeline.
//!
//! A [`Predictor`] owns the two artifacts (standardizer and classifier),
//! loaded once and shared read-only. Each call is a pure, single-threaded,
//! CPU-bound computation: extract descriptor, standardize, classify, fuse.

use std::path::Path;

use log::info;

use crate::error::{Error, Result};
use crate::features::{extract_descriptor, DESCRIPTOR_LEN};
use crate::fusion::{fuse, FusionConfig};
use crate::model::Classifier;
use crate::scaler::Standardizer;
use crate::signal::laplacian_variance;
use crate::types::{FaceImage, Verdict};

/// Classifies face images as REAL or AI-GENERATED.
#[derive(Debug)]
pub struct Predictor {
    standardizer: Standardizer,
    classifier: Classifier,
    fusion: FusionConfig,
}

impl Predictor {
    /// Assemble a predictor from loaded artifacts.
    ///
    /// Refuses to proceed when the standardizer, the classifier, and the
    /// feature composer disagree on the descriptor length; a mismatch means
    /// the artifacts were trained against a different extraction pipeline.
    pub fn new(standardizer: Standardizer, classifier: Classifier) -> Result<Self> {
        if standardizer.len() != classifier.feature_count() {
            return Err(Error::InvalidArtifact(format!(
                "standardizer covers {} dimensions but the classifier was trained on {}",
                standardizer.len(),
                classifier.feature_count()
            )));
        }
        if classifier.feature_count() != DESCRIPTOR_LEN {
            return Err(Error::InvalidArtifact(format!(
                "classifier was trained on {} features but this pipeline extracts {}",
                classifier.feature_count(),
                DESCRIPTOR_LEN
            )));
        }
        Ok(Self {
            standardizer,
            classifier,
            fusion: FusionConfig::default(),
        })
    }

    /// Replace the default fusion calibration.
    pub fn with_fusion_config(mut self, fusion: FusionConfig) -> Self {
        self.fusion = fusion;
        self
    }

    /// Load both artifacts from disk and assemble a predictor.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(scaler_path: P, model_path: Q) -> Result<Self> {
        let standardizer = Standardizer::load(&scaler_path)?;
        let classifier = Classifier::load(&model_path)?;
        info!(
            "loaded artifacts: {} descriptor dimensions, {} trees, threshold {:?}",
            standardizer.len(),
            classifier.num_trees(),
            classifier.threshold()
        );
        Self::new(standardizer, classifier)
    }

    /// Raw classifier probability of the AI-GENERATED class for one image:
    /// extract, standardize, classify.
    pub fn probability(&self, image: &FaceImage) -> Result<f64> {
        let descriptor = extract_descriptor(image);
        let standardized = self.standardizer.transform(&descriptor)?;
        self.classifier.predict(&standardized)
    }

    /// Full inference: probability plus decision fusion with an externally
    /// computed sharpness signal.
    ///
    /// The sharpness signal should come from the full-resolution grayscale
    /// image when available (see [`laplacian_variance`]); the serving path
    /// computes it before resizing to 128x128, matching the training-time
    /// distribution.
    pub fn classify(&self, image: &FaceImage, sharpness: f64) -> Result<Verdict> {
        let probability = self.probability(image)?;
        Ok(fuse(
            probability,
            sharpness,
            self.classifier.threshold(),
            &self.fusion,
        ))
    }

    /// Convenience variant computing the sharpness signal from the 128x128
    /// image itself, for callers without access to the original resolution.
    pub fn classify_resized(&self, image: &FaceImage) -> Result<Verdict> {
        let sharpness = laplacian_variance(&image.to_gray());
        self.classify(image, sharpness)
    }

    pub fn fusion_config(&self) -> &FusionConfig {
        &self.fusion
    }
}
