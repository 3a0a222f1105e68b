use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crazy_fours_core::rectify_quad;
use image::{Rgb, RgbImage};
use nalgebra::Point2;

fn synthetic_frame() -> RgbImage {
    RgbImage::from_fn(1920, 1080, |x, y| {
        let v = ((x / 16 + y / 16) % 2 * 200 + 30) as u8;
        Rgb([v, v / 2, 255 - v])
    })
}

fn bench_rectify(c: &mut Criterion) {
    let frame = synthetic_frame();
    let corners = [
        Point2::new(812.0_f32, 301.0),
        Point2::new(1104.0, 322.0),
        Point2::new(1090.0, 690.0),
        Point2::new(798.0, 671.0),
    ];
    c.bench_function("rectify_card_sized_quad", |b| {
        b.iter(|| rectify_quad(black_box(&frame), black_box(corners), 8.0))
    });
}

criterion_group!(benches, bench_rectify);
criterion_main!(benches);
