use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use plate_core::Image;
use plate_fast::{DetectorBuilder, DetectorConfig, FastDetector};

/// Create benchmark image resembling one band of a scanned plate
fn create_benchmark_image(width: usize, height: usize, complexity: &str) -> Image {
    match complexity {
        "simple" => {
            let (cx, cy) = (width / 2, height / 2);
            Image::from_fn(width, height, |x, y| {
                if x.abs_diff(cx) <= 2 && y.abs_diff(cy) <= 2 { 255 } else { 128 }
            })
        }
        "realistic" => Image::from_fn(width, height, |x, y| {
            // Gradient with noise plus blocky structure
            let gradient = ((x as f32 / width as f32) * 50.0) as u8;
            let noise = ((x + y) % 7) as u8;
            let block = if (x / 8 + y / 8) % 5 == 0 { 60 } else { 0 };
            100 + gradient + noise + block
        }),
        _ => Image::filled(width, height, 128),
    }
}

fn bench_detect_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");
    let detector = FastDetector::new(DetectorConfig::default()).unwrap();

    for &(w, h) in &[(320, 240), (640, 480), (1280, 960)] {
        let img = create_benchmark_image(w, h, "realistic");
        group.bench_with_input(BenchmarkId::new("realistic", format!("{}x{}", w, h)), &img, |b, img| {
            b.iter(|| detector.detect(black_box(img), 1000))
        });
    }
    group.finish();
}

fn bench_presets(c: &mut Criterion) {
    let mut group = c.benchmark_group("presets");
    let img = create_benchmark_image(640, 480, "realistic");

    let presets = [
        ("fast", DetectorBuilder::new().preset_fast()),
        ("default", DetectorBuilder::new()),
        ("quality", DetectorBuilder::new().preset_quality()),
    ];
    for (name, builder) in presets {
        let detector = builder.build().unwrap();
        group.bench_function(name, |b| b.iter(|| detector.detect(black_box(&img), 1000)));
    }
    group.finish();
}

fn bench_simple_corner(c: &mut Criterion) {
    let detector = FastDetector::new(DetectorConfig::fast_preset()).unwrap();
    let img = create_benchmark_image(256, 256, "simple");
    c.bench_function("simple_corner_256", |b| b.iter(|| detector.detect(black_box(&img), 1000)));
}

criterion_group!(benches, bench_detect_sizes, bench_presets, bench_simple_corner);
criterion_main!(benches);
