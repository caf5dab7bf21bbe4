//! Descriptor extractors and the feature composer.
//!
//! Four independent transforms turn a [`FaceImage`] into numeric sub-vectors:
//!
//! 1. Gradient-orientation descriptor (HOG-style, 8x8 cells, 9 bins, 2x2
//!    block L2-Hys normalization): 8100 values.
//! 2. Uniform rotation-invariant local binary pattern histogram (P=8, R=1):
//!    10 values.
//! 3. Per-channel 32-bin color histogram, L2-normalized per channel: 96
//!    values.
//! 4. Per-channel statistical texture (mean, variance, entropy): 9 values.
//!
//! [`extract_descriptor`] concatenates them in exactly that order. The layout
//! is a deterministic function of the fixed 128x128 image size and the
//! constants below; training and inference must agree on it bit for bit.

use crate::hist::{
    channel_histogram, normalize_l2, normalize_sum, shannon_entropy, COLOR_BINS,
};
use crate::types::{FaceImage, GrayImage, IMAGE_SIZE};

/// Side length of a gradient-histogram cell in pixels.
const CELL_SIZE: usize = 8;
/// Cells per block side for block normalization.
const BLOCK_SIZE: usize = 2;
/// Unsigned orientation bins over [0, 180) degrees.
const ORIENTATION_BINS: usize = 9;
/// Epsilon used by the L2-Hys block norm.
const BLOCK_NORM_EPS: f64 = 1e-5;
/// Clipping ceiling applied between the two L2 passes.
const BLOCK_NORM_CLIP: f64 = 0.2;

/// Sampling points on the LBP circle.
const LBP_POINTS: usize = 8;
/// LBP sampling radius in pixels.
const LBP_RADIUS: f64 = 1.0;
/// One bin per uniform pattern (0..=LBP_POINTS ones) plus a non-uniform
/// catch-all.
const LBP_BINS: usize = LBP_POINTS + 2;

const CELLS_PER_SIDE: usize = IMAGE_SIZE as usize / CELL_SIZE;
const BLOCKS_PER_SIDE: usize = CELLS_PER_SIDE - BLOCK_SIZE + 1;

/// Length of the gradient-orientation segment.
pub const GRADIENT_LEN: usize =
    BLOCKS_PER_SIDE * BLOCKS_PER_SIDE * BLOCK_SIZE * BLOCK_SIZE * ORIENTATION_BINS;
/// Length of the local-texture-pattern segment.
pub const TEXTURE_PATTERN_LEN: usize = LBP_BINS;
/// Length of the color-histogram segment.
pub const COLOR_HIST_LEN: usize = 3 * COLOR_BINS;
/// Length of the statistical-texture segment.
pub const TEXTURE_STATS_LEN: usize = 9;

/// Total descriptor length. The classifier artifact records this at training
/// time and inference refuses to run against a different value.
pub const DESCRIPTOR_LEN: usize =
    GRADIENT_LEN + TEXTURE_PATTERN_LEN + COLOR_HIST_LEN + TEXTURE_STATS_LEN;

/// Concatenate all four sub-vectors into one descriptor.
///
/// Pure function: the same image buffer always yields a bit-identical
/// descriptor. No scaling or clipping happens here; that is the
/// standardizer's job.
pub fn extract_descriptor(image: &FaceImage) -> Vec<f64> {
    let mut descriptor = Vec::with_capacity(DESCRIPTOR_LEN);
    descriptor.extend(gradient_descriptor(image));
    descriptor.extend(texture_pattern_histogram(image));
    descriptor.extend(color_histogram(image));
    descriptor.extend(statistical_texture(image));
    debug_assert_eq!(descriptor.len(), DESCRIPTOR_LEN);
    descriptor
}

/// Gradient-orientation descriptor.
///
/// Square-root contrast transform on intensities, centered-difference
/// gradients (zero on the one-pixel border), per-cell 9-bin magnitude
/// histograms over [0, 180) degrees, then overlapping 2x2-cell blocks
/// normalized with L2-Hys.
pub fn gradient_descriptor(image: &FaceImage) -> Vec<f64> {
    let gray = image.to_gray();
    let n = IMAGE_SIZE as usize;

    let intensity: Vec<f64> = (0..n * n)
        .map(|i| (gray.get_pixel((i % n) as i32, (i / n) as i32) as f64).sqrt())
        .collect();
    let at = |x: usize, y: usize| intensity[y * n + x];

    let mut cell_hist = vec![[0.0f64; ORIENTATION_BINS]; CELLS_PER_SIDE * CELLS_PER_SIDE];
    for y in 1..n - 1 {
        for x in 1..n - 1 {
            let gx = at(x + 1, y) - at(x - 1, y);
            let gy = at(x, y + 1) - at(x, y - 1);
            let magnitude = (gx * gx + gy * gy).sqrt();
            if magnitude == 0.0 {
                continue;
            }
            // Fold the signed angle into the unsigned [0, 180) range.
            let mut angle = gy.atan2(gx).to_degrees();
            if angle < 0.0 {
                angle += 180.0;
            }
            if angle >= 180.0 {
                angle -= 180.0;
            }
            let bin = ((angle / (180.0 / ORIENTATION_BINS as f64)) as usize)
                .min(ORIENTATION_BINS - 1);
            let cell = (y / CELL_SIZE) * CELLS_PER_SIDE + x / CELL_SIZE;
            cell_hist[cell][bin] += magnitude;
        }
    }

    let mut out = Vec::with_capacity(GRADIENT_LEN);
    for by in 0..BLOCKS_PER_SIDE {
        for bx in 0..BLOCKS_PER_SIDE {
            let mut block = [0.0f64; BLOCK_SIZE * BLOCK_SIZE * ORIENTATION_BINS];
            for cy in 0..BLOCK_SIZE {
                for cx in 0..BLOCK_SIZE {
                    let cell = (by + cy) * CELLS_PER_SIDE + bx + cx;
                    let base = (cy * BLOCK_SIZE + cx) * ORIENTATION_BINS;
                    block[base..base + ORIENTATION_BINS]
                        .copy_from_slice(&cell_hist[cell]);
                }
            }
            l2_hys(&mut block);
            out.extend_from_slice(&block);
        }
    }
    out
}

/// L2 norm with epsilon, clip at `BLOCK_NORM_CLIP`, then renormalize.
fn l2_hys(block: &mut [f64]) {
    let norm = |v: &[f64]| (v.iter().map(|x| x * x).sum::<f64>() + BLOCK_NORM_EPS * BLOCK_NORM_EPS).sqrt();

    let n1 = norm(block);
    for x in block.iter_mut() {
        *x = (*x / n1).min(BLOCK_NORM_CLIP);
    }
    let n2 = norm(block);
    for x in block.iter_mut() {
        *x /= n2;
    }
}

/// Uniform rotation-invariant local binary pattern histogram.
///
/// Each pixel is compared against 8 samples on the radius-1 circle (bilinear
/// interpolation for the diagonal samples; out-of-bounds samples read 0).
/// Codes with at most two circular 0/1 transitions map to their popcount,
/// everything else lands in the catch-all bin.
pub fn texture_pattern_histogram(image: &FaceImage) -> Vec<f64> {
    let gray = image.to_gray();
    let n = IMAGE_SIZE as i32;

    // Circle sample offsets, counter-clockwise from the positive x axis.
    let offsets: Vec<(f64, f64)> = (0..LBP_POINTS)
        .map(|k| {
            let theta = 2.0 * std::f64::consts::PI * k as f64 / LBP_POINTS as f64;
            (LBP_RADIUS * theta.cos(), -LBP_RADIUS * theta.sin())
        })
        .collect();

    let mut hist = [0.0f64; LBP_BINS];
    for y in 0..n {
        for x in 0..n {
            let center = gray.get_pixel(x, y) as f64;
            let mut bits = [false; LBP_POINTS];
            for (k, &(dx, dy)) in offsets.iter().enumerate() {
                let sample = sample_bilinear(&gray, x as f64 + dx, y as f64 + dy);
                bits[k] = sample >= center;
            }
            let transitions = (0..LBP_POINTS)
                .filter(|&k| bits[k] != bits[(k + 1) % LBP_POINTS])
                .count();
            let code = if transitions <= 2 {
                bits.iter().filter(|&&b| b).count()
            } else {
                LBP_POINTS + 1
            };
            hist[code] += 1.0;
        }
    }

    normalize_sum(&mut hist);
    hist.to_vec()
}

/// Sample a grayscale pixel with bilinear interpolation for sub-pixel
/// accuracy. Out-of-bounds neighbors contribute 0.
#[inline]
fn sample_bilinear(image: &GrayImage, x: f64, y: f64) -> f64 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = image.get_pixel(x0, y0) as f64;
    let p10 = image.get_pixel(x0 + 1, y0) as f64;
    let p01 = image.get_pixel(x0, y0 + 1) as f64;
    let p11 = image.get_pixel(x0 + 1, y0 + 1) as f64;

    let top = p00 * (1.0 - fx) + p10 * fx;
    let bottom = p01 * (1.0 - fx) + p11 * fx;
    top * (1.0 - fy) + bottom * fy
}

/// Per-channel 32-bin color histogram over [0, 256), each channel
/// L2-normalized independently, concatenated R then G then B.
pub fn color_histogram(image: &FaceImage) -> Vec<f64> {
    let mut out = Vec::with_capacity(COLOR_HIST_LEN);
    for c in 0..3 {
        let mut hist = channel_histogram(image.channel(c));
        normalize_l2(&mut hist);
        out.extend_from_slice(&hist);
    }
    out
}

/// Per-channel mean, population variance, and Shannon entropy (bits) of the
/// epsilon-normalized 32-bin histogram, emitted R then G then B.
pub fn statistical_texture(image: &FaceImage) -> Vec<f64> {
    let count = (IMAGE_SIZE * IMAGE_SIZE) as f64;
    let mut out = Vec::with_capacity(TEXTURE_STATS_LEN);
    for c in 0..3 {
        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        for v in image.channel(c) {
            let v = v as f64;
            sum += v;
            sum_sq += v * v;
        }
        let mean = sum / count;
        let variance = sum_sq / count - mean * mean;

        let mut hist = channel_histogram(image.channel(c));
        normalize_sum(&mut hist);
        let entropy = shannon_entropy(&hist);

        out.push(mean);
        out.push(variance);
        out.push(entropy);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_length_is_fixed() {
        assert_eq!(GRADIENT_LEN, 8100);
        assert_eq!(TEXTURE_PATTERN_LEN, 10);
        assert_eq!(COLOR_HIST_LEN, 96);
        assert_eq!(TEXTURE_STATS_LEN, 9);
        assert_eq!(DESCRIPTOR_LEN, 8215);

        let img = FaceImage::from_fn(|x, y| [(x * 2) as u8, y as u8, (x ^ y) as u8]);
        assert_eq!(extract_descriptor(&img).len(), DESCRIPTOR_LEN);
    }

    #[test]
    fn extraction_is_deterministic() {
        let img = FaceImage::from_fn(|x, y| {
            [
                (x.wrapping_mul(31) ^ y) as u8,
                (y.wrapping_mul(17) ^ x) as u8,
                (x + y) as u8,
            ]
        });
        let a = extract_descriptor(&img);
        let b = extract_descriptor(&img);
        assert_eq!(a, b);
    }

    #[test]
    fn uniform_image_yields_finite_descriptor() {
        for rgb in [[0u8, 0, 0], [128, 128, 128], [255, 255, 255]] {
            let img = FaceImage::uniform(rgb);
            let descriptor = extract_descriptor(&img);
            assert!(descriptor.iter().all(|v| v.is_finite()), "rgb {:?}", rgb);
        }
    }

    #[test]
    fn uniform_image_gradient_descriptor_is_zero() {
        let img = FaceImage::uniform([90, 90, 90]);
        let hog = gradient_descriptor(&img);
        assert!(hog.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn horizontal_ramp_activates_only_the_horizontal_bin() {
        // Intensity grows with x, so gradients point along +x (angle 0,
        // bin 0). Every nonzero descriptor entry must sit at a bin-0 slot.
        let img = FaceImage::from_fn(|x, _| [x as u8, x as u8, x as u8]);
        let hog = gradient_descriptor(&img);
        assert!(hog.iter().any(|&v| v > 0.0));
        for (i, &v) in hog.iter().enumerate() {
            if v != 0.0 {
                assert_eq!(i % ORIENTATION_BINS, 0, "unexpected energy at index {}", i);
            }
        }
    }

    #[test]
    fn texture_pattern_histogram_sums_to_one() {
        let img = FaceImage::from_fn(|x, y| [(x * y) as u8; 3]);
        let hist = texture_pattern_histogram(&img);
        let total: f64 = hist.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn black_image_concentrates_in_all_ones_pattern() {
        // Every neighbor (in-bounds or zero-filled) ties with the center, so
        // every pixel produces the all-ones uniform code with popcount 8.
        let img = FaceImage::uniform([0, 0, 0]);
        let hist = texture_pattern_histogram(&img);
        assert!((hist[8] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn color_histogram_is_unit_norm_per_channel() {
        let img = FaceImage::uniform([255, 0, 0]);
        let hist = color_histogram(&img);

        // All red mass in the last bin of the R segment, all G/B mass in the
        // first bin of their segments; each channel L2-normalizes to 1.
        assert!((hist[31] - 1.0).abs() < 1e-9);
        assert!((hist[32] - 1.0).abs() < 1e-9);
        assert!((hist[64] - 1.0).abs() < 1e-9);
        for c in 0..3 {
            let norm: f64 = hist[c * 32..(c + 1) * 32].iter().map(|v| v * v).sum();
            assert!((norm - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn statistical_texture_of_uniform_channels() {
        let img = FaceImage::uniform([10, 20, 30]);
        let stats = statistical_texture(&img);
        assert_eq!(stats.len(), 9);

        // mean, variance, entropy per channel
        for (c, &mean) in [10.0, 20.0, 30.0].iter().enumerate() {
            assert!((stats[c * 3] - mean).abs() < 1e-9);
            assert!(stats[c * 3 + 1].abs() < 1e-9, "variance should be zero");
            assert!(stats[c * 3 + 2].abs() < 1e-3, "entropy should be ~zero");
        }
    }

    #[test]
    fn bilinear_interpolation() {
        let img = GrayImage::new(vec![0, 100, 200, 50], 2, 2);
        assert!((sample_bilinear(&img, 0.0, 0.0) - 0.0).abs() < 0.01);
        assert!((sample_bilinear(&img, 1.0, 0.0) - 100.0).abs() < 0.01);
        assert!((sample_bilinear(&img, 0.5, 0.5) - 87.5).abs() < 0.01);
        assert!((sample_bilinear(&img, 0.5, 0.0) - 50.0).abs() < 0.01);
    }
}
