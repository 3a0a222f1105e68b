use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

/// Projective 3x3 transform acting on 2D points: `p' ~ H * [x, y, 1]^T`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    /// Closed-form homography from exactly four correspondences, `dst ~ H * src`.
    ///
    /// Both point sets are Hartley-normalized before the 8x8 linear solve,
    /// which keeps the system well conditioned at full-HD pixel magnitudes.
    /// Returns `None` when the correspondences are degenerate (three or more
    /// collinear points, repeated points).
    pub fn from_four_points(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Self> {
        let (src_n, t_src) = hartley_normalize(src)?;
        let (dst_n, t_dst) = hartley_normalize(dst)?;

        // Unknowns h11..h32 with h33 fixed to 1. Each pair (x, y) -> (u, v):
        //   h11 x + h12 y + h13 - u h31 x - u h32 y = u
        //   h21 x + h22 y + h23 - v h31 x - v h32 y = v
        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for (k, (s, d)) in src_n.iter().zip(dst_n.iter()).enumerate() {
            let (x, y, u, v) = (s.x, s.y, d.x, d.y);
            let r = 2 * k;
            a.set_row(
                r,
                &SMatrix::<f64, 1, 8>::from_row_slice(&[x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y]),
            );
            a.set_row(
                r + 1,
                &SMatrix::<f64, 1, 8>::from_row_slice(&[0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y]),
            );
            b[r] = u;
            b[r + 1] = v;
        }

        let sol = a.lu().solve(&b)?;
        let hn = Matrix3::new(
            sol[0], sol[1], sol[2], //
            sol[3], sol[4], sol[5], //
            sol[6], sol[7], 1.0,
        );

        let h = t_dst.try_inverse()? * hn * t_src;
        let scale = h[(2, 2)];
        if scale.abs() < 1e-12 || !h.iter().all(|v| v.is_finite()) {
            return None;
        }
        Some(Self::new(h / scale))
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        Point2::new((v[0] / v[2]) as f32, (v[1] / v[2]) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

/// Translate the centroid to the origin and scale so the mean distance to it
/// is sqrt(2). Returns the normalized points and the applied transform.
fn hartley_normalize(pts: &[Point2<f32>; 4]) -> Option<([Point2<f64>; 4], Matrix3<f64>)> {
    let (cx, cy) = pts
        .iter()
        .fold((0.0_f64, 0.0_f64), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    let (cx, cy) = (cx / 4.0, cy / 4.0);

    let mean_dist = pts
        .iter()
        .map(|p| ((p.x as f64 - cx).powi(2) + (p.y as f64 - cy).powi(2)).sqrt())
        .sum::<f64>()
        / 4.0;
    if mean_dist <= 1e-12 {
        return None;
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let out = pts.map(|p| Point2::new(s * (p.x as f64 - cx), s * (p.y as f64 - cy)));
    Some((out, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = tol);
        assert_abs_diff_eq!(a.y, b.y, epsilon = tol);
    }

    #[test]
    fn recovers_known_projective_map() {
        let truth = Homography::new(Matrix3::new(
            0.8, 0.05, 420.0, //
            -0.02, 1.1, 280.0, //
            0.0004, -0.0002, 1.0,
        ));
        let rect = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(249.0, 0.0),
            Point2::new(249.0, 349.0),
            Point2::new(0.0, 349.0),
        ];
        let img = rect.map(|p| truth.apply(p));

        let h = Homography::from_four_points(&rect, &img).expect("solvable");
        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(120.0, 80.0),
            Point2::new(249.0, 349.0),
        ] {
            assert_close(h.apply(p), truth.apply(p), 1e-2);
        }
    }

    #[test]
    fn inverse_maps_back() {
        let h = Homography::new(Matrix3::new(
            1.2, 0.1, 5.0, //
            -0.05, 0.9, 3.0, //
            0.001, 0.0005, 1.0,
        ));
        let inv = h.inverse().expect("invertible");
        for p in [Point2::new(0.0_f32, 0.0), Point2::new(320.0, 200.0)] {
            assert_close(inv.apply(h.apply(p)), p, 1e-3);
        }
    }

    #[test]
    fn collinear_points_are_rejected() {
        let src = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(20.0, 0.0),
            Point2::new(30.0, 0.0),
        ];
        let dst = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        assert!(Homography::from_four_points(&src, &dst).is_none());
    }

    #[test]
    fn coincident_points_are_rejected() {
        let src = [Point2::new(5.0_f32, 5.0); 4];
        let dst = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        assert!(Homography::from_four_points(&src, &dst).is_none());
    }
}
