//! Compositor benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use console_core::{CellBuffer, FixedFont, FrameCompositor, GlyphCache, Rgb, SoftwareSurface};

fn filled_buffer() -> CellBuffer {
    let mut buffer = CellBuffer::new(80, 30);
    for row in 0..30 {
        buffer.set_foreground(Rgb::from_packed(0x10_20_30 * (row as u32 % 8)));
        buffer.cputsxy(0, row, &"The quick brown fox jumps over the lazy dog. ".repeat(2)[..80]);
    }
    buffer
}

fn bench_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("compositor");
    group.throughput(Throughput::Elements(80 * 30));

    let font = FixedFont::default();
    let compositor = FrameCompositor::default();

    // Full screen with every glyph already cached
    group.bench_function("full_screen_warm", |b| {
        let mut buffer = filled_buffer();
        let mut cache = GlyphCache::new();
        let mut surface = SoftwareSurface::new(640, 480);
        compositor
            .composite_buffer(&mut buffer, &mut cache, &font, &mut surface, 0.0)
            .unwrap();
        b.iter(|| {
            let stats = compositor
                .composite_buffer(&mut buffer, &mut cache, &font, &mut surface, 0.033)
                .unwrap();
            black_box(stats)
        })
    });

    // Full screen after a cache clear, as with automatic cache clearing
    group.bench_function("full_screen_cold", |b| {
        let mut buffer = filled_buffer();
        let mut cache = GlyphCache::new();
        let mut surface = SoftwareSurface::new(640, 480);
        b.iter(|| {
            let stats = compositor
                .composite_buffer(&mut buffer, &mut cache, &font, &mut surface, 0.033)
                .unwrap();
            cache.clear(&mut surface);
            black_box(stats)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_composite);
criterion_main!(benches);
