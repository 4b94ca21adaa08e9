use camera_capture::VideoFrame;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use luma_analyzer::{mean_luma, AnalyzerConfig, LuminosityAnalyzer};

fn bench_mean_luma(c: &mut Criterion) {
    let plane: Vec<u8> = (0..640 * 480).map(|i| (i % 251) as u8).collect();

    c.bench_function("mean_luma_640x480", |b| b.iter(|| mean_luma(black_box(&plane))));
}

fn bench_analyze(c: &mut Criterion) {
    let frame = VideoFrame::gray(vec![128; 640 * 480], 640, 480).unwrap();
    let mut analyzer = LuminosityAnalyzer::new(&AnalyzerConfig {
        sample_interval_ms: 0,
        ..Default::default()
    })
    .unwrap();
    analyzer.register(|luma: f64| {
        black_box(luma);
    });

    let mut now = 0i64;
    c.bench_function("analyze_every_frame_640x480", |b| {
        b.iter(|| {
            now += 33;
            analyzer.analyze_at(black_box(&frame), 0, now)
        })
    });
}

criterion_group!(benches, bench_mean_luma, bench_analyze);
criterion_main!(benches);
