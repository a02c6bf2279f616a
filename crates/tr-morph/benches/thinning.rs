use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tr_core::Image;
use tr_morph::{SquareKernel, Skeletonizer, ZhangSuen, open_binary_u8};

fn ring_track(width: usize, height: usize, inner: f64, outer: f64) -> Image<u8> {
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    Image::from_fn(width, height, |x, y| {
        let dx = (x as f64 - cx) / cx;
        let dy = (y as f64 - cy) / cy;
        let r = (dx * dx + dy * dy).sqrt();
        if (inner..outer).contains(&r) { 255 } else { 0 }
    })
}

fn bench_thinning(c: &mut Criterion) {
    let img = ring_track(640, 480, 0.55, 0.75);
    let view = img.as_view();

    c.bench_function("tr_morph_zhang_suen_640x480", |b| {
        b.iter(|| {
            let skel = ZhangSuen.skeletonize(black_box(&view));
            black_box(skel.count_set());
        });
    });
}

fn bench_open(c: &mut Criterion) {
    let img = ring_track(640, 480, 0.55, 0.75);
    let view = img.as_view();

    c.bench_function("tr_morph_open5x5_x2_640x480", |b| {
        b.iter(|| {
            let out = open_binary_u8(black_box(&view), SquareKernel::new(5), 2);
            black_box(out.count_set());
        });
    });
}

criterion_group!(benches, bench_thinning, bench_open);
criterion_main!(benches);
