use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mdmirror_core::{Document, ExtractConfig, Metadata, TemplateRenderer, extract, extract_with_config};

fn bench_parse(c: &mut Criterion) {
    let small = std::fs::read_to_string("../../tests/fixtures/site/about.html").unwrap();
    let medium = std::fs::read_to_string("../../tests/fixtures/site/index.html").unwrap();
    let large = medium.repeat(200);

    let mut group = c.benchmark_group("parse");

    group.bench_with_input(BenchmarkId::new("small", "about"), &small, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.bench_with_input(BenchmarkId::new("medium", "index"), &medium, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.bench_with_input(BenchmarkId::new("large", "index x200"), &large, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/site/index.html").unwrap().repeat(50);

    c.bench_function("extract_plain", |b| b.iter(|| extract(black_box(&html), Metadata::new())));

    let config = ExtractConfig::mirror("https://docs.acme.test");
    c.bench_function("extract_mirror", |b| {
        b.iter(|| extract_with_config(black_box(&html), Metadata::new(), black_box(&config)))
    });
}

fn bench_render(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/site/index.html").unwrap();
    let renderer = TemplateRenderer::page().unwrap();
    let config = ExtractConfig::default();

    c.bench_function("extract_and_render", |b| {
        b.iter(|| renderer.render_html(black_box(&html), Metadata::new(), &config))
    });
}

criterion_group!(benches, bench_parse, bench_extract, bench_render);
criterion_main!(benches);
