//! # veriface
//!
//! Classifies a face image as REAL or AI-GENERATED.
//!
//! Three layers:
//! - **Descriptor extraction**: four deterministic numeric transforms
//!   (gradient orientations, local texture patterns, color histograms,
//!   statistical texture) composed into one fixed-length descriptor.
//! - **Classification**: a boosted ensemble of decision trees over
//!   standardized descriptors, loaded from a persisted artifact.
//! - **Decision fusion**: a Laplacian-variance sharpness signal that may
//!   override the learned model for unnaturally smooth images, with an
//!   explanation naming the rule that fired.
//!
//! The standardizer and classifier artifacts are produced by a separate
//! training pipeline and loaded once, read-only; each inference call is a
//! pure, single-threaded computation.
//!
//! ## Quick Start
//!
//! ```rust
//! use veriface::{
//!     ClassifierBuilder, DecisionTree, FaceImage, Predictor, Standardizer,
//!     TreeEnsemble, TreeNode, DESCRIPTOR_LEN,
//! };
//!
//! // Load trained artifacts...
//! // let predictor = Predictor::load("models/scaler.bin", "models/classifier.bin")?;
//!
//! // ...or assemble a synthetic model for development.
//! let tree = DecisionTree::new(vec![TreeNode::Leaf { weight: 0.0 }]);
//! let classifier = ClassifierBuilder::new()
//!     .ensemble(TreeEnsemble::new(vec![tree], 0.0))
//!     .feature_count(DESCRIPTOR_LEN)
//!     .threshold(0.42)
//!     .build()
//!     .unwrap();
//! let predictor = Predictor::new(Standardizer::identity(DESCRIPTOR_LEN), classifier).unwrap();
//!
//! let face = FaceImage::uniform([128, 128, 128]);
//! let verdict = predictor.classify(&face, 512.0).unwrap();
//! println!("{} ({:.2}): {}", verdict.label, verdict.confidence, verdict.explanation);
//! ```

mod dataset;
mod error;
mod features;
mod fusion;
mod hist;
mod model;
mod pipeline;
mod scaler;
mod signal;
mod tree;
mod types;

pub use dataset::{extract_batch, load_face_image};
pub use error::{Error, Result};
pub use features::{
    color_histogram, extract_descriptor, gradient_descriptor, statistical_texture,
    texture_pattern_histogram, COLOR_HIST_LEN, DESCRIPTOR_LEN, GRADIENT_LEN,
    TEXTURE_PATTERN_LEN, TEXTURE_STATS_LEN,
};
pub use fusion::{fuse, FusionConfig};
pub use model::{Classifier, ClassifierBuilder, ModelMetadata};
pub use pipeline::Predictor;
pub use scaler::Standardizer;
pub use signal::laplacian_variance;
pub use tree::{DecisionTree, TreeEnsemble, TreeNode};
pub use types::{FaceImage, GrayImage, Label, Verdict, IMAGE_SIZE};
