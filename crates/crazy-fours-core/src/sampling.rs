use image::{Rgb, RgbImage};

#[inline]
fn texel(src: &RgbImage, x: i64, y: i64) -> [f32; 3] {
    if x < 0 || y < 0 || x >= src.width() as i64 || y >= src.height() as i64 {
        return [0.0; 3];
    }
    let p = src.get_pixel(x as u32, y as u32).0;
    [p[0] as f32, p[1] as f32, p[2] as f32]
}

/// Bilinear sample at a sub-pixel position. Pixels outside the image read as black.
#[inline]
pub fn sample_bilinear_rgb(src: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (xi, yi) = (x0 as i64, y0 as i64);

    let p00 = texel(src, xi, yi);
    let p10 = texel(src, xi + 1, yi);
    let p01 = texel(src, xi, yi + 1);
    let p11 = texel(src, xi + 1, yi + 1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] + fx * (p10[c] - p00[c]);
        let bottom = p01[c] + fx * (p11[c] - p01[c]);
        out[c] = (top + fy * (bottom - top)).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}
