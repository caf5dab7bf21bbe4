//! Histogram and entropy utilities shared by the descriptor extractors.

/// Additive guard used when normalizing histograms so constant images
/// (all mass in one bin, or an empty accumulation) stay finite.
pub const HIST_EPS: f64 = 1e-7;

/// Number of bins used for per-channel color and entropy histograms.
pub const COLOR_BINS: usize = 32;

/// 32-bin histogram of 8-bit samples over [0, 256). Bin width is 8.
pub fn channel_histogram(samples: impl Iterator<Item = u8>) -> [f64; COLOR_BINS] {
    let mut hist = [0.0f64; COLOR_BINS];
    for v in samples {
        hist[v as usize / 8] += 1.0;
    }
    hist
}

/// Normalize counts to a probability distribution, guarding the denominator
/// with `HIST_EPS` so a zero histogram maps to zeros instead of NaN.
pub fn normalize_sum(hist: &mut [f64]) {
    let sum: f64 = hist.iter().sum();
    let denom = sum + HIST_EPS;
    for v in hist.iter_mut() {
        *v /= denom;
    }
}

/// Scale a vector to unit L2 norm. A (near-)zero vector is left as zeros.
pub fn normalize_l2(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > HIST_EPS {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Shannon entropy in bits of a probability distribution. Zero-probability
/// bins contribute nothing.
pub fn shannon_entropy(p: &[f64]) -> f64 {
    -p.iter()
        .filter(|&&x| x > 0.0)
        .map(|&x| x * x.log2())
        .sum::<f64>()
}
