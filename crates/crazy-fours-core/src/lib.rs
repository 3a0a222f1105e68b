//! Geometry for card rectification.
//!
//! This crate knows nothing about cards or classifiers: it orders quad
//! corners, solves the four-point homography, and resamples a color frame
//! into a top-down view of the quad.

mod homography;
mod logger;
mod quad;
mod rectify;
mod sampling;

pub use homography::Homography;
pub use quad::{edge_lengths, is_proper_ordering, order_points};
pub use rectify::{
    rectified_size, rectify, rectify_quad, warp_perspective_rgb, RectifiedQuad, RectifyError,
};
pub use sampling::sample_bilinear_rgb;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
