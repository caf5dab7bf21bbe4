//! Sharpness signal: variance of the Laplacian response.
//!
//! Very low values indicate unnaturally smooth, denoised content, a known
//! fingerprint of some generative pipelines. The decision-fusion engine
//! consumes this signal independently of the learned classifier.

use crate::types::GrayImage;

/// Variance of the 3x3 Laplacian response over the whole image.
///
/// Kernel `[[0,1,0],[1,-4,1],[0,1,0]]` with reflect-101 border handling, then
/// the population variance of the response. A flat image scores 0.
pub fn laplacian_variance(image: &GrayImage) -> f64 {
    let w = image.width() as i32;
    let h = image.height() as i32;
    if w == 0 || h == 0 {
        return 0.0;
    }

    let at = |x: i32, y: i32| image.get_pixel(reflect_101(x, w), reflect_101(y, h)) as f64;

    let count = (w * h) as f64;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for y in 0..h {
        for x in 0..w {
            let response =
                at(x, y - 1) + at(x - 1, y) + at(x + 1, y) + at(x, y + 1) - 4.0 * at(x, y);
            sum += response;
            sum_sq += response * response;
        }
    }

    let mean = sum / count;
    sum_sq / count - mean * mean
}

/// Mirror an index into [0, len) without repeating the edge sample
/// (reflect-101: -1 maps to 1, len maps to len - 2).
#[inline]
fn reflect_101(i: i32, len: i32) -> i32 {
    if len == 1 {
        return 0;
    }
    let mut i = i;
    if i < 0 {
        i = -i;
    }
    if i >= len {
        i = 2 * len - 2 - i;
    }
    i.clamp(0, len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_101_indexing() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(0, 5), 0);
        assert_eq!(reflect_101(4, 5), 4);
        assert_eq!(reflect_101(5, 5), 3);
    }

    #[test]
    fn flat_image_has_zero_variance() {
        let img = GrayImage::from_fn(16, 16, |_, _| 200);
        assert_eq!(laplacian_variance(&img), 0.0);
    }

    #[test]
    fn linear_ramp_responds_only_at_reflected_borders() {
        // A linear ramp has zero second derivative in the interior. The
        // reflect-101 border folds the ramp back on itself, so the first and
        // last columns respond with +-2*step: variance 2*(2*10)^2/16 = 50.
        let img = GrayImage::from_fn(16, 16, |x, _| (x * 10) as u8);
        assert!((laplacian_variance(&img) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn checkerboard_is_sharp() {
        let img = GrayImage::from_fn(32, 32, |x, y| if (x + y) % 2 == 0 { 0 } else { 255 });
        // Every pixel flips against all four neighbors; the response is
        // +-1020 with mean 0, so the variance is huge.
        assert!(laplacian_variance(&img) > 1_000_000.0);
    }

    #[test]
    fn single_bright_dot_raises_variance() {
        let img = GrayImage::from_fn(16, 16, |x, y| if x == 8 && y == 8 { 255 } else { 0 });
        assert!(laplacian_variance(&img) > 0.0);
    }
}
