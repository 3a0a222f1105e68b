//! Frame segmentation and card-shaped contour filtering.
//!
//! Luminance, Gaussian blur, inverse adaptive threshold, then the outer
//! borders of the foreground blobs. Each border is simplified to a polygon and
//! kept only if it is a large, roughly square quadrilateral.

use crate::SegmentParams;
use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{arc_length, contour_area};
use imageproc::point::Point;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Axis-aligned bounds of a contour, in pixels (inclusive extent).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn of(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Self {
            x: x0,
            y: y0,
            width: (x1 - x0 + 1) as u32,
            height: (y1 - y0 + 1) as u32,
        })
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// A contour that passed the vertex/area/aspect filter.
#[derive(Clone, Debug, PartialEq)]
pub struct CardQuad {
    /// Polygon vertices in approximation order (not yet top-left first).
    pub corners: [Point2<f32>; 4],
    pub bbox: BoundingBox,
    pub area: f64,
}

/// ITU-R 601 luma, `(299 R + 587 G + 114 B) / 1000` rounded.
pub fn to_luma(frame: &RgbImage) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b] = frame.get_pixel(x, y).0;
        let l = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
        Luma([l as u8])
    })
}

/// Inverse adaptive threshold: a pixel becomes 255 when it is at least
/// `offset` darker than the mean of the `block_size` window around it.
/// Windows are clipped at the image border.
pub fn adaptive_threshold_inv(gray: &GrayImage, block_size: u32, offset: f32) -> GrayImage {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let radius = (block_size.max(3) / 2) as usize;

    // Summed-area table with a zero top row and left column.
    let stride = w + 1;
    let mut integral = vec![0u64; stride * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += gray.get_pixel(x as u32, y as u32)[0] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let (x, y) = (x as usize, y as usize);
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius + 1).min(w);
        let y1 = (y + radius + 1).min(h);
        let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
            - integral[y0 * stride + x1]
            - integral[y1 * stride + x0];
        let mean = sum as f32 / ((x1 - x0) * (y1 - y0)) as f32;
        let v = gray.get_pixel(x as u32, y as u32)[0] as f32;
        if v <= mean - offset {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Luma, blur and inverse adaptive threshold.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame, params), fields(width = frame.width(), height = frame.height()))
)]
pub fn binarize(frame: &RgbImage, params: &SegmentParams) -> GrayImage {
    let gray = to_luma(frame);
    let sigma = params.effective_sigma();
    let blurred = if sigma > 0.0 {
        imageproc::filter::gaussian_blur_f32(&gray, sigma)
    } else {
        gray
    };
    adaptive_threshold_inv(&blurred, params.block_size, params.threshold_offset)
}

/// Outer borders of top-level foreground blobs. Blobs nested inside holes
/// of other blobs are dropped.
pub fn external_contours(binary: &GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points)
        .collect()
}

fn dist(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

fn segment_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let len = (dx * dx + dy * dy).sqrt();
    if len < f64::EPSILON {
        return dist(p, a);
    }
    ((p.x - a.x) as f64 * dy - (p.y - a.y) as f64 * dx).abs() / len
}

/// Douglas-Peucker on an open chain. Both endpoints are always kept.
fn simplify_open(chain: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = chain.len();
    if n < 3 {
        return chain.to_vec();
    }
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((s, e)) = stack.pop() {
        if e <= s + 1 {
            continue;
        }
        let (mut far, mut far_d) = (s, 0.0);
        for (i, &p) in chain.iter().enumerate().take(e).skip(s + 1) {
            let d = segment_distance(p, chain[s], chain[e]);
            if d > far_d {
                far = i;
                far_d = d;
            }
        }
        if far_d > epsilon {
            keep[far] = true;
            stack.push((s, far));
            stack.push((far, e));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

fn farthest_from(points: &[Point<i32>], from: Point<i32>) -> usize {
    let mut best = 0;
    let mut best_d = -1.0;
    for (i, &p) in points.iter().enumerate() {
        let d = dist(p, from);
        if d > best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

/// Douglas-Peucker on a closed contour.
///
/// The contour is split at two mutually distant points (the farthest point
/// from the start, and the farthest point from that one) so the split points
/// are real extremities rather than wherever the border tracing began.
pub fn approximate_closed(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let a = farthest_from(points, points[0]);
    let b = farthest_from(points, points[a]);
    if a == b {
        return vec![points[a]];
    }
    let (i, j) = (a.min(b), a.max(b));

    let first: Vec<Point<i32>> = points[i..=j].to_vec();
    let second: Vec<Point<i32>> = points[j..].iter().chain(&points[..=i]).copied().collect();

    let mut out = simplify_open(&first, epsilon);
    out.pop();
    let mut rest = simplify_open(&second, epsilon);
    rest.pop();
    out.extend(rest);
    out
}

/// Filter one contour. Returns `None` when it is not card-shaped.
pub fn card_quad(contour: &[Point<i32>], params: &SegmentParams) -> Option<CardQuad> {
    let bbox = BoundingBox::of(contour)?;
    let area = contour_area(contour);
    let aspect = bbox.aspect();
    if area <= params.min_area || aspect <= params.min_aspect || aspect >= params.max_aspect {
        log::trace!(
            "reject contour at ({}, {}): area={area:.0} aspect={aspect:.2}",
            bbox.x,
            bbox.y
        );
        return None;
    }

    let epsilon = params.approx_epsilon_frac * arc_length(contour, true);
    let poly = approximate_closed(contour, epsilon);
    let [p0, p1, p2, p3] = poly.as_slice() else {
        log::debug!(
            "reject contour at ({}, {}): {} vertices after approximation",
            bbox.x,
            bbox.y,
            poly.len()
        );
        return None;
    };

    let corners = [p0, p1, p2, p3].map(|p| Point2::new(p.x as f32, p.y as f32));
    Some(CardQuad {
        corners,
        bbox,
        area,
    })
}

/// All card-shaped quads in a binarized frame, in contour discovery order.
pub fn find_card_quads(binary: &GrayImage, params: &SegmentParams) -> Vec<CardQuad> {
    external_contours(binary)
        .iter()
        .filter_map(|c| card_quad(c, params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn pt(x: i32, y: i32) -> Point<i32> {
        Point::new(x, y)
    }

    /// Border pixels of an axis-aligned rectangle, clockwise from a point on
    /// the top edge.
    fn rect_border(x0: i32, y0: i32, x1: i32, y1: i32, start_x: i32) -> Vec<Point<i32>> {
        let mut pts = Vec::new();
        for x in start_x..x1 {
            pts.push(pt(x, y0));
        }
        for y in y0..y1 {
            pts.push(pt(x1, y));
        }
        for x in (x0 + 1..=x1).rev() {
            pts.push(pt(x, y1));
        }
        for y in (y0 + 1..=y1).rev() {
            pts.push(pt(x0, y));
        }
        for x in x0..start_x {
            pts.push(pt(x, y0));
        }
        pts
    }

    #[test]
    fn luma_uses_601_weights() {
        let frame = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        assert_eq!(to_luma(&frame).get_pixel(0, 0)[0], 76);
        let frame = RgbImage::from_pixel(1, 1, Rgb([0, 255, 0]));
        assert_eq!(to_luma(&frame).get_pixel(0, 0)[0], 150);
    }

    #[test]
    fn uniform_image_has_no_foreground() {
        let gray = GrayImage::from_pixel(40, 30, Luma([128]));
        let bin = adaptive_threshold_inv(&gray, 11, 2.0);
        assert!(bin.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn dark_side_of_an_edge_becomes_foreground() {
        let gray = GrayImage::from_fn(40, 20, |x, _| if x < 20 { Luma([20]) } else { Luma([220]) });
        let bin = adaptive_threshold_inv(&gray, 11, 2.0);
        assert_eq!(bin.get_pixel(19, 10)[0], 255);
        assert_eq!(bin.get_pixel(15, 10)[0], 255);
        assert_eq!(bin.get_pixel(14, 10)[0], 0);
        assert_eq!(bin.get_pixel(20, 10)[0], 0);
    }

    #[test]
    fn quad_area_is_the_enclosed_border_area() {
        let card = rect_border(0, 0, 100, 110, 30);
        let quad = card_quad(&card, &SegmentParams::default()).expect("card-shaped");
        assert_eq!(quad.area, 11000.0);
    }

    #[test]
    fn closed_approximation_finds_corners_when_tracing_starts_mid_edge() {
        let border = rect_border(10, 20, 110, 120, 57);
        let eps = 0.02 * arc_length(&border, true);
        let mut poly = approximate_closed(&border, eps);
        poly.sort_by_key(|p| (p.y, p.x));
        assert_eq!(poly, vec![pt(10, 20), pt(110, 20), pt(10, 120), pt(110, 120)]);
    }

    #[test]
    fn filter_rejects_small_and_elongated_shapes() {
        let params = SegmentParams::default();
        let small = rect_border(0, 0, 40, 40, 0);
        assert!(card_quad(&small, &params).is_none());
        let long = rect_border(0, 0, 300, 100, 0);
        assert!(card_quad(&long, &params).is_none());
        let card = rect_border(0, 0, 100, 110, 0);
        let quad = card_quad(&card, &params).expect("card-shaped");
        assert_eq!(quad.bbox.width, 101);
        assert_eq!(quad.bbox.height, 111);
    }

    #[test]
    fn nested_blobs_are_not_external() {
        let mut binary = GrayImage::new(200, 200);
        draw_filled_rect_mut(&mut binary, Rect::at(20, 20).of_size(160, 160), Luma([255]));
        draw_filled_rect_mut(&mut binary, Rect::at(30, 30).of_size(140, 140), Luma([0]));
        draw_filled_rect_mut(&mut binary, Rect::at(60, 60).of_size(80, 80), Luma([255]));
        let contours = external_contours(&binary);
        assert_eq!(contours.len(), 1);
        let bbox = BoundingBox::of(&contours[0]).unwrap();
        assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (20, 20, 160, 160));
    }

    #[test]
    fn binarized_card_is_found() {
        let mut frame = RgbImage::from_pixel(320, 240, Rgb([30, 30, 30]));
        draw_filled_rect_mut(&mut frame, Rect::at(100, 60).of_size(110, 120), Rgb([235, 235, 235]));
        let params = SegmentParams::default();
        let quads = find_card_quads(&binarize(&frame, &params), &params);
        assert_eq!(quads.len(), 1);
        let q = &quads[0];
        assert!(q.bbox.x < 100 && q.bbox.x > 90, "bbox {:?}", q.bbox);
        assert!(q.bbox.y < 60 && q.bbox.y > 50, "bbox {:?}", q.bbox);
    }
}
