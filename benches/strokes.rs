use criterion::{black_box, criterion_group, criterion_main, Criterion};
use raster_canvas::canvas::settings::CanvasSettings;
use raster_canvas::canvas::CanvasSession;

fn bench_strokes(c: &mut Criterion) {
    let mut session = CanvasSession::new(&CanvasSettings::default()).expect("session");
    session.set_brush_size(25);
    let points: Vec<(f32, f32)> = (0..200)
        .map(|i| {
            let t = i as f32 / 200.0;
            (40.0 + 720.0 * t, 400.0 + 300.0 * (t * 12.0).sin())
        })
        .collect();

    c.bench_function("freehand_200_segments", |b| {
        b.iter(|| {
            for pair in points.windows(2) {
                black_box(session.pointer_move(pair[0], pair[1]));
            }
        })
    });

    session.cycle_mode();
    c.bench_function("circle_stamp_200", |b| {
        b.iter(|| {
            for &point in &points {
                black_box(session.stamp(point));
            }
        })
    });
}

criterion_group!(benches, bench_strokes);
criterion_main!(benches);
