use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Spatial side length every face image must have before it reaches the
/// descriptor extractors. Training and inference both resize to this.
pub const IMAGE_SIZE: u32 = 128;

/// A fixed-size 128x128 RGB face image, 8 bits per channel, interleaved.
///
/// Construction validates the buffer length, so downstream extractors can
/// assume exact dimensions and channel order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceImage {
    data: Vec<u8>,
}

impl FaceImage {
    /// Wrap an interleaved RGB buffer. The buffer must hold exactly
    /// `IMAGE_SIZE * IMAGE_SIZE * 3` bytes.
    pub fn from_rgb(data: Vec<u8>) -> Result<Self> {
        let expected = (IMAGE_SIZE * IMAGE_SIZE * 3) as usize;
        if data.len() != expected {
            return Err(Error::InvalidImage(format!(
                "expected {}x{} RGB buffer of {} bytes, got {}",
                IMAGE_SIZE,
                IMAGE_SIZE,
                expected,
                data.len()
            )));
        }
        Ok(Self { data })
    }

    /// Build an image from a per-pixel function returning `[r, g, b]`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(u32, u32) -> [u8; 3],
    {
        let mut data = Vec::with_capacity((IMAGE_SIZE * IMAGE_SIZE * 3) as usize);
        for y in 0..IMAGE_SIZE {
            for x in 0..IMAGE_SIZE {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self { data }
    }

    /// A single-color image, mostly useful in tests for degenerate inputs.
    pub fn uniform(rgb: [u8; 3]) -> Self {
        Self::from_fn(|_, _| rgb)
    }

    pub fn width(&self) -> u32 {
        IMAGE_SIZE
    }

    pub fn height(&self) -> u32 {
        IMAGE_SIZE
    }

    /// RGB sample at (x, y). Coordinates must be in bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        debug_assert!(x < IMAGE_SIZE && y < IMAGE_SIZE);
        let i = ((y * IMAGE_SIZE + x) * 3) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Iterate over one channel (0 = R, 1 = G, 2 = B) in row-major order.
    pub fn channel(&self, c: usize) -> impl Iterator<Item = u8> + '_ {
        debug_assert!(c < 3);
        self.data.iter().skip(c).step_by(3).copied()
    }

    /// Convert to grayscale with the standard luma weights
    /// (0.299 R + 0.587 G + 0.114 B), rounded to u8.
    pub fn to_gray(&self) -> GrayImage {
        GrayImage::from_fn(IMAGE_SIZE, IMAGE_SIZE, |x, y| {
            let [r, g, b] = self.pixel(x, y);
            luma(r, g, b)
        })
    }
}

/// Grayscale intensity from RGB samples, rounded to the nearest integer.
#[inline]
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64).round() as u8
}

/// A grayscale image buffer of arbitrary size.
///
/// Out-of-bounds reads return 0, which keeps neighborhood operators free of
/// per-sample bounds branching at call sites.
#[derive(Debug, Clone)]
pub struct GrayImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl GrayImage {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), (width * height) as usize);
        Self {
            data,
            width,
            height,
        }
    }

    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> u8,
    {
        let mut data = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Intensity at (x, y). Returns 0 for out-of-bounds coordinates.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.data[(y as u32 * self.width + x as u32) as usize]
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// The two classes the system distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "REAL")]
    Real,
    #[serde(rename = "AI-GENERATED")]
    AiGenerated,
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Real => write!(f, "REAL"),
            Label::AiGenerated => write!(f, "AI-GENERATED"),
        }
    }
}

/// The outcome of one inference call: the label, a confidence in [0, 1],
/// the fusion rule that fired, and the two raw diagnostic signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    pub confidence: f64,
    pub explanation: String,
    /// Laplacian-variance sharpness signal.
    pub sharpness: f64,
    /// Raw classifier probability of the AI-GENERATED class.
    pub probability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_image_rejects_wrong_buffer_length() {
        let err = FaceImage::from_rgb(vec![0u8; 100]).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn face_image_pixel_and_channel_access() {
        let img = FaceImage::from_fn(|x, y| [x as u8, y as u8, 7]);
        assert_eq!(img.pixel(3, 5), [3, 5, 7]);
        assert!(img.channel(2).all(|v| v == 7));
        assert_eq!(img.channel(0).count(), (IMAGE_SIZE * IMAGE_SIZE) as usize);
    }

    #[test]
    fn gray_conversion_matches_luma_weights() {
        let img = FaceImage::uniform([100, 50, 200]);
        let gray = img.to_gray();
        let expected = (0.299 * 100.0 + 0.587 * 50.0 + 0.114 * 200.0_f64).round() as u8;
        assert_eq!(gray.get_pixel(0, 0), expected);
        assert_eq!(gray.get_pixel(64, 64), expected);
    }

    #[test]
    fn gray_image_out_of_bounds_reads_zero() {
        let img = GrayImage::new(vec![9, 9, 9, 9], 2, 2);
        assert_eq!(img.get_pixel(-1, 0), 0);
        assert_eq!(img.get_pixel(0, 2), 0);
        assert_eq!(img.get_pixel(1, 1), 9);
    }

    #[test]
    fn label_display() {
        assert_eq!(Label::Real.to_string(), "REAL");
        assert_eq!(Label::AiGenerated.to_string(), "AI-GENERATED");
    }
}
