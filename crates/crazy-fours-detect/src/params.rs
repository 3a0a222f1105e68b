use crazy_fours_cards::WildPolicy;
use serde::{Deserialize, Serialize};

/// Segmentation and contour-filter settings.
///
/// The area threshold is in squared pixels and was tuned for a 1080p camera
/// at arm's length; scale it with the frame resolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentParams {
    /// Odd Gaussian kernel size used to pick a sigma when `blur_sigma` is unset.
    pub blur_kernel: u32,
    /// Explicit blur sigma. `Some(0.0)` disables blurring.
    pub blur_sigma: Option<f32>,
    /// Side of the square window for the local mean (odd, >= 3).
    pub block_size: u32,
    /// Subtracted from the local mean before comparing.
    pub threshold_offset: f32,
    /// Polygon approximation tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_frac: f64,
    /// Minimum contour area (exclusive).
    pub min_area: f64,
    /// Bounding-box `width / height` must lie strictly inside this range.
    pub min_aspect: f32,
    pub max_aspect: f32,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            blur_kernel: 9,
            blur_sigma: None,
            block_size: 11,
            threshold_offset: 2.0,
            approx_epsilon_frac: 0.02,
            min_area: 4000.0,
            min_aspect: 0.7,
            max_aspect: 1.3,
        }
    }
}

impl SegmentParams {
    /// Sigma actually used for blurring. Without an explicit value it is
    /// derived from the kernel size the same way OpenCV does for `sigma = 0`.
    pub fn effective_sigma(&self) -> f32 {
        self.blur_sigma.unwrap_or_else(|| {
            let k = self.blur_kernel.max(1) as f32;
            0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
        })
    }
}

/// Configuration for [`crate::CardDetector`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub segment: SegmentParams,
    /// Quads with an edge shorter than this (pixels) are skipped instead of rectified.
    pub min_edge: f32,
    /// Side of the square classifier input.
    pub input_size: u32,
    pub wild_policy: WildPolicy,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            segment: SegmentParams::default(),
            min_edge: 8.0,
            input_size: 256,
            wild_policy: WildPolicy::Cosmetic,
        }
    }
}
