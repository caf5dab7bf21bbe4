//! Per-dimension standardization artifact.
//!
//! Fit once by the training pipeline, persisted, and loaded read-only at
//! inference. The core only depends on the `transform` contract, never on
//! how the parameters were fit.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Centers and scales each descriptor dimension: `(x - center) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standardizer {
    center: Vec<f64>,
    scale: Vec<f64>,
}

impl Standardizer {
    /// Create a standardizer from fitted parameters. Both sequences must
    /// have the same length and contain only finite values.
    pub fn new(center: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let scaler = Self { center, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    fn validate(&self) -> Result<()> {
        if self.center.len() != self.scale.len() {
            return Err(Error::InvalidArtifact(format!(
                "standardizer center/scale length mismatch: {} vs {}",
                self.center.len(),
                self.scale.len()
            )));
        }
        if self
            .center
            .iter()
            .chain(self.scale.iter())
            .any(|v| !v.is_finite())
        {
            return Err(Error::InvalidArtifact(
                "standardizer parameters contain non-finite values".into(),
            ));
        }
        Ok(())
    }

    /// An identity transform of the given dimension.
    pub fn identity(len: usize) -> Self {
        Self {
            center: vec![0.0; len],
            scale: vec![1.0; len],
        }
    }

    /// Number of descriptor dimensions this artifact was fit for.
    pub fn len(&self) -> usize {
        self.center.len()
    }

    pub fn is_empty(&self) -> bool {
        self.center.is_empty()
    }

    /// Standardize a descriptor. Fails fast on a dimension mismatch.
    ///
    /// A zero scale entry (constant training dimension) divides by 1 instead,
    /// matching the convention of the fitting pipeline.
    pub fn transform(&self, descriptor: &[f64]) -> Result<Vec<f64>> {
        if descriptor.len() != self.len() {
            return Err(Error::DimensionMismatch {
                expected: self.len(),
                actual: descriptor.len(),
            });
        }
        Ok(descriptor
            .iter()
            .zip(self.center.iter().zip(self.scale.iter()))
            .map(|(&x, (&c, &s))| {
                let s = if s == 0.0 { 1.0 } else { s };
                (x - c) / s
            })
            .collect())
    }

    /// Load the artifact from a binary file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let scaler: Self = bincode::deserialize(&bytes)?;
        scaler.validate()?;
        Ok(scaler)
    }

    /// Save the artifact to a binary file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let bytes = bincode::serialize(self)?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}
