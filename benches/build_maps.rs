use criterion::black_box;
use criterion::{criterion_group, criterion_main, Criterion};

use lqr_rs::{CarverBuilder, ColDepth, EnergyBuiltin, PixelBuffer};

fn gradient(w: u32, h: u32) -> PixelBuffer {
    let mut data = vec![0u8; (w * h * 3) as usize];
    for y in 0..h {
        for x in 0..w {
            let p = (y * w + x) as usize * 3;
            data[p] = ((x * 255) / w.max(1)) as u8;
            data[p + 1] = ((y * 255) / h.max(1)) as u8;
            data[p + 2] = 128;
        }
    }
    PixelBuffer::U8(data)
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("100x100 shrink to 80 wide", |b| {
        b.iter(|| {
            let buf = black_box(gradient(100, 100));
            let mut carver = CarverBuilder::new(buf, 100, 100, 3)
                .col_depth(ColDepth::U8)
                .delta_x(1)
                .rigidity(0.0)
                .energy_builtin(EnergyBuiltin::GradNorm)
                .build()
                .unwrap();
            carver.resize(80, 100).unwrap();
            black_box(carver.width());
        })
    });

    c.bench_function("100x100 shrink then re-enlarge", |b| {
        b.iter(|| {
            let buf = black_box(gradient(100, 100));
            let mut carver = CarverBuilder::new(buf, 100, 100, 3)
                .col_depth(ColDepth::U8)
                .delta_x(1)
                .rigidity(0.0)
                .energy_builtin(EnergyBuiltin::GradNorm)
                .build()
                .unwrap();
            carver.resize(70, 100).unwrap();
            carver.resize(100, 100).unwrap();
            black_box(carver.width());
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = criterion_benchmark
}

criterion_main!(benches);
