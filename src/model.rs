use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tree::TreeEnsemble;

/// Free-form provenance recorded by the training pipeline: the label mapping
/// and the hyperparameters used for the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Class index to label name, e.g. 0 -> "REAL", 1 -> "AI-GENERATED".
    pub label_mapping: BTreeMap<u8, String>,
    /// Training hyperparameters, stringly typed on purpose.
    pub hyperparameters: BTreeMap<String, String>,
}

/// The persisted classifier artifact.
///
/// Holds the boosted tree ensemble, the descriptor length it was trained on,
/// an optional calibrated decision threshold, and provenance metadata. Loaded
/// once at startup and shared read-only across inference calls.
///
/// # Usage
///
/// ```ignore
/// let model = Classifier::load("model.bin")?;
/// let probability = model.predict(&standardized_descriptor)?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifier {
    ensemble: TreeEnsemble,

    /// Descriptor length recorded at training time. `predict` refuses any
    /// other length; a mismatch signals training/inference skew.
    feature_count: usize,

    /// Calibrated decision threshold, if the training run persisted one.
    threshold: Option<f64>,

    metadata: ModelMetadata,
}

impl Classifier {
    /// Load a classifier from a binary file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let model: Self = bincode::deserialize(&bytes)?;
        model.validate()?;
        Ok(model)
    }

    /// Save the classifier to a binary file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let bytes = bincode::serialize(self)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Descriptor length this classifier expects.
    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// The persisted calibrated threshold, if any.
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn num_trees(&self) -> usize {
        self.ensemble.trees.len()
    }

    /// Probability of the AI-GENERATED class for a standardized descriptor.
    ///
    /// Fails fast on a dimension mismatch; the ensemble is never consulted
    /// with a descriptor of the wrong length.
    pub fn predict(&self, descriptor: &[f64]) -> Result<f64> {
        if descriptor.len() != self.feature_count {
            return Err(Error::DimensionMismatch {
                expected: self.feature_count,
                actual: descriptor.len(),
            });
        }
        Ok(self.ensemble.predict(descriptor))
    }

    fn validate(&self) -> Result<()> {
        if self.ensemble.trees.is_empty() {
            return Err(Error::InvalidArtifact(
                "classifier ensemble has no trees".into(),
            ));
        }
        if self.feature_count == 0 {
            return Err(Error::InvalidArtifact(
                "classifier records a zero feature count".into(),
            ));
        }
        for tree in &self.ensemble.trees {
            if !tree.is_well_formed() {
                return Err(Error::InvalidArtifact(
                    "tree has an empty node vector or a split child index that is \
                     out of range or not strictly forward"
                        .into(),
                ));
            }
            if let Some(max) = tree.max_feature_index() {
                if max as usize >= self.feature_count {
                    return Err(Error::InvalidArtifact(format!(
                        "tree references feature {} but the artifact records {} features",
                        max, self.feature_count
                    )));
                }
            }
        }
        if let Some(t) = self.threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(Error::InvalidArtifact(format!(
                    "decision threshold {} outside [0, 1]",
                    t
                )));
            }
        }
        Ok(())
    }
}

/// Builder for assembling a [`Classifier`], used by the training driver and
/// by tests that need synthetic artifacts.
pub struct ClassifierBuilder {
    ensemble: Option<TreeEnsemble>,
    feature_count: Option<usize>,
    threshold: Option<f64>,
    metadata: ModelMetadata,
}

impl ClassifierBuilder {
    pub fn new() -> Self {
        Self {
            ensemble: None,
            feature_count: None,
            threshold: None,
            metadata: ModelMetadata::default(),
        }
    }

    pub fn ensemble(mut self, ensemble: TreeEnsemble) -> Self {
        self.ensemble = Some(ensemble);
        self
    }

    pub fn feature_count(mut self, count: usize) -> Self {
        self.feature_count = Some(count);
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn label(mut self, class: u8, name: impl Into<String>) -> Self {
        self.metadata.label_mapping.insert(class, name.into());
        self
    }

    pub fn hyperparameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .hyperparameters
            .insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Classifier> {
        let ensemble = self
            .ensemble
            .ok_or_else(|| Error::InvalidArtifact("missing tree ensemble".into()))?;
        let feature_count = self
            .feature_count
            .ok_or_else(|| Error::InvalidArtifact("missing feature count".into()))?;

        let model = Classifier {
            ensemble,
            feature_count,
            threshold: self.threshold,
            metadata: self.metadata,
        };
        model.validate()?;
        Ok(model)
    }
}

impl Default for ClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}
