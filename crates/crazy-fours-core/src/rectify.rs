use crate::{edge_lengths, is_proper_ordering, order_points, sample_bilinear_rgb, Homography};
use image::RgbImage;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RectifyError {
    #[error("degenerate quad (shortest edge {shortest_edge:.1}px, need >= {min_edge:.1}px)")]
    Degenerate { shortest_edge: f32, min_edge: f32 },
    #[error("corner ordering collapsed two corners onto one point")]
    AmbiguousOrdering,
    #[error("homography estimation failed")]
    HomographyFailed,
}

/// A quad resampled into an axis-aligned, top-down image.
#[derive(Clone, Debug)]
pub struct RectifiedQuad {
    pub image: RgbImage,
    /// Source corners in top-left, top-right, bottom-right, bottom-left order.
    pub corners: [Point2<f32>; 4],
    pub h_img_from_rect: Homography,
}

/// Output size for an ordered quad: the longer of each pair of opposite edges,
/// truncated to whole pixels.
pub fn rectified_size(ordered: &[Point2<f32>; 4]) -> (u32, u32) {
    let [top, right, bottom, left] = edge_lengths(ordered);
    let width = (top as u32).max(bottom as u32);
    let height = (right as u32).max(left as u32);
    (width, height)
}

/// Resample `src` through `h_img_from_rect` into an `out_w x out_h` image.
///
/// Destination pixel `(x, y)` samples the source at `H * (x, y)`, so the
/// rectified corners land exactly on pixel indices `0` and `out_w - 1`.
pub fn warp_perspective_rgb(
    src: &RgbImage,
    h_img_from_rect: &Homography,
    out_w: u32,
    out_h: u32,
) -> RgbImage {
    RgbImage::from_fn(out_w, out_h, |x, y| {
        let p = h_img_from_rect.apply(Point2::new(x as f32, y as f32));
        sample_bilinear_rgb(src, p.x, p.y)
    })
}

/// Rectify a quad, rejecting shapes whose shortest edge is below `min_edge`
/// pixels or whose corners cannot be ordered unambiguously.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src, corners), fields(width = src.width(), height = src.height()))
)]
pub fn rectify_quad(
    src: &RgbImage,
    corners: [Point2<f32>; 4],
    min_edge: f32,
) -> Result<RectifiedQuad, RectifyError> {
    let ordered = order_points(corners);
    if !is_proper_ordering(&ordered) {
        return Err(RectifyError::AmbiguousOrdering);
    }

    let shortest_edge = edge_lengths(&ordered)
        .into_iter()
        .fold(f32::INFINITY, f32::min);
    let (out_w, out_h) = rectified_size(&ordered);
    if shortest_edge < min_edge || out_w < 2 || out_h < 2 {
        return Err(RectifyError::Degenerate {
            shortest_edge,
            min_edge,
        });
    }

    let (w, h) = ((out_w - 1) as f32, (out_h - 1) as f32);
    let rect = [
        Point2::new(0.0, 0.0),
        Point2::new(w, 0.0),
        Point2::new(w, h),
        Point2::new(0.0, h),
    ];
    let h_img_from_rect =
        Homography::from_four_points(&rect, &ordered).ok_or(RectifyError::HomographyFailed)?;

    log::trace!("rectifying quad {ordered:?} into {out_w}x{out_h}");
    let image = warp_perspective_rgb(src, &h_img_from_rect, out_w, out_h);

    Ok(RectifiedQuad {
        image,
        corners: ordered,
        h_img_from_rect,
    })
}

/// Rectify the region bounded by four corners given in any order.
///
/// The output size follows the quad, so consecutive calls on different
/// regions generally return images of different resolutions.
pub fn rectify(src: &RgbImage, corners: [Point2<f32>; 4]) -> Result<RgbImage, RectifyError> {
    rectify_quad(src, corners, 1.0).map(|r| r.image)
}
