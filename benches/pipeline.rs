use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use svg2path::{Config, combine, convert_document, extract_shapes, parse_path};

fn grid_document(columns: usize, rows: usize) -> String {
    let mut out = String::from(r#"<svg xmlns="http://www.w3.org/2000/svg">"#);
    for row in 0..rows {
        for col in 0..columns {
            // 10x10 cells on an 8-unit grid so neighbours overlap.
            out.push_str(&format!(
                r#"<rect x="{}" y="{}" width="10" height="10"/>"#,
                col * 8,
                row * 8
            ));
        }
    }
    out.push_str("</svg>");
    out
}

fn zigzag_path(segments: usize) -> String {
    let mut d = String::from("M0,0");
    for i in 1..=segments {
        let y = if i % 2 == 0 { 0 } else { 4 };
        d.push_str(&format!(" L{},{}", i * 3, y));
    }
    d.push_str(" Z");
    d
}

fn bench_parse_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_path");
    for segments in [16, 256, 4096] {
        let d = zigzag_path(segments);
        group.bench_with_input(BenchmarkId::from_parameter(segments), &d, |b, d| {
            b.iter(|| parse_path(black_box(d)).unwrap());
        });
    }
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    for (name, columns, rows) in [("small", 4, 4), ("medium", 10, 10)] {
        let svg = grid_document(columns, rows);
        group.bench_with_input(BenchmarkId::from_parameter(name), &svg, |b, svg| {
            b.iter(|| {
                let doc = roxmltree::Document::parse(black_box(svg)).unwrap();
                extract_shapes(&doc).unwrap()
            });
        });
    }
    group.finish();
}

fn bench_union(c: &mut Criterion) {
    let mut group = c.benchmark_group("union");
    group.sample_size(20);
    for (name, columns, rows) in [("small", 3, 3), ("medium", 6, 6)] {
        let svg = grid_document(columns, rows);
        let doc = roxmltree::Document::parse(&svg).unwrap();
        let shapes = extract_shapes(&doc).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &shapes, |b, shapes| {
            b.iter(|| combine(black_box(shapes), 0.1));
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    group.sample_size(20);
    let svg = grid_document(5, 5);
    let config = Config::default();
    group.bench_function("grid_5x5", |b| {
        b.iter(|| convert_document(black_box(&svg), &config).unwrap());
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_path,
    bench_extract,
    bench_union,
    bench_end_to_end
);
criterion_main!(benches);
