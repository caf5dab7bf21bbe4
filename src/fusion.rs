//! Decision-fusion engine.
//!
//! Combines the classifier probability with the independently computed
//! sharpness signal. The tree ensemble alone proved insufficiently sensitive
//! to oversmoothed generated faces, so two deterministic smoothness rules are
//! consulted before the learned threshold. The rule order is a calibrated
//! contract; do not reorder it.

use crate::types::{Label, Verdict};

/// Calibrated fusion constants. These are tuned values, not derived
/// quantities; recalibration means changing this configuration, not code.
#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// Sharpness below this is treated as AI-generated outright.
    pub absolute_smooth_cutoff: f64,
    /// Sharpness below this plus weak model suspicion is treated as
    /// AI-generated.
    pub soft_smooth_cutoff: f64,
    /// Minimum classifier probability counting as suspicion for the soft
    /// smoothness rule.
    pub suspicion_floor: f64,
    /// Confidence reported when the absolute smoothness rule fires.
    pub absolute_smooth_confidence: f64,
    /// Confidence reported when the soft smoothness rule fires.
    pub soft_smooth_confidence: f64,
    /// Decision threshold used when the classifier artifact carries none.
    pub fallback_threshold: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            absolute_smooth_cutoff: 100.0,
            soft_smooth_cutoff: 350.0,
            suspicion_floor: 0.20,
            absolute_smooth_confidence: 0.98,
            soft_smooth_confidence: 0.85,
            fallback_threshold: 0.42,
        }
    }
}

/// Fuse the classifier probability and the sharpness signal into a verdict.
///
/// Rules are evaluated in strict priority order; the first match wins:
///
/// 1. Sharpness below the absolute cutoff: AI-GENERATED, fixed high
///    confidence, classifier ignored.
/// 2. Sharpness below the soft cutoff and probability above the suspicion
///    floor: AI-GENERATED, fixed medium confidence.
/// 3. Probability above the decision threshold: AI-GENERATED at the model's
///    confidence.
/// 4. Otherwise: REAL at `1 - probability`.
///
/// `threshold` is the artifact's calibrated threshold; pass `None` to fall
/// back to the configured default.
pub fn fuse(
    probability: f64,
    sharpness: f64,
    threshold: Option<f64>,
    config: &FusionConfig,
) -> Verdict {
    let threshold = threshold.unwrap_or(config.fallback_threshold);

    let (label, confidence, explanation) = if sharpness < config.absolute_smooth_cutoff {
        (
            Label::AiGenerated,
            config.absolute_smooth_confidence,
            format!(
                "Image is unnaturally smooth (variance {:.1} < {})",
                sharpness, config.absolute_smooth_cutoff
            ),
        )
    } else if sharpness < config.soft_smooth_cutoff && probability > config.suspicion_floor {
        (
            Label::AiGenerated,
            config.soft_smooth_confidence,
            format!(
                "Smooth texture (variance {:.1}) + model suspicion ({:.2})",
                sharpness, probability
            ),
        )
    } else if probability > threshold {
        (
            Label::AiGenerated,
            probability,
            format!(
                "Model confidence ({:.2}) > threshold ({:.2})",
                probability, threshold
            ),
        )
    } else {
        (
            Label::Real,
            1.0 - probability,
            format!(
                "Model confidence ({:.2}) <= threshold ({:.2})",
                probability, threshold
            ),
        )
    };

    Verdict {
        label,
        confidence,
        explanation,
        sharpness,
        probability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FusionConfig {
        FusionConfig::default()
    }

    #[test]
    fn absolute_smoothness_overrides_the_model() {
        // Rule 1 ignores the probability entirely.
        let v = fuse(0.0, 50.0, Some(0.5), &config());
        assert_eq!(v.label, Label::AiGenerated);
        assert_eq!(v.confidence, 0.98);
        assert!(v.explanation.contains("unnaturally smooth"));
    }

    #[test]
    fn soft_smoothness_needs_model_suspicion() {
        let v = fuse(0.25, 200.0, Some(0.5), &config());
        assert_eq!(v.label, Label::AiGenerated);
        assert_eq!(v.confidence, 0.85);
        assert!(v.explanation.contains("model suspicion"));

        // Same sharpness without suspicion falls through to rule 4.
        let v = fuse(0.10, 200.0, Some(0.5), &config());
        assert_eq!(v.label, Label::Real);
        assert!((v.confidence - 0.90).abs() < 1e-12);
    }

    #[test]
    fn sharp_image_defers_to_the_threshold() {
        let v = fuse(0.6, 1000.0, Some(0.5), &config());
        assert_eq!(v.label, Label::AiGenerated);
        assert!((v.confidence - 0.6).abs() < 1e-12);

        let v = fuse(0.3, 1000.0, Some(0.5), &config());
        assert_eq!(v.label, Label::Real);
        assert!((v.confidence - 0.7).abs() < 1e-12);
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        // Probability exactly at the threshold classifies as REAL.
        let v = fuse(0.5, 1000.0, Some(0.5), &config());
        assert_eq!(v.label, Label::Real);
    }

    #[test]
    fn missing_threshold_uses_fallback() {
        let v = fuse(0.45, 1000.0, None, &config());
        assert_eq!(v.label, Label::AiGenerated);
        assert!(v.explanation.contains("0.42"));

        let v = fuse(0.40, 1000.0, None, &config());
        assert_eq!(v.label, Label::Real);
    }

    #[test]
    fn verdict_carries_raw_signals() {
        let v = fuse(0.33, 512.0, Some(0.5), &config());
        assert_eq!(v.probability, 0.33);
        assert_eq!(v.sharpness, 512.0);
    }

    #[test]
    fn rule_one_outranks_rule_two() {
        // Sharpness qualifies for both smoothness rules; the absolute rule
        // must win and report its fixed confidence.
        let v = fuse(0.9, 50.0, Some(0.5), &config());
        assert_eq!(v.confidence, 0.98);
    }
}
