//! Benchmarks for outline extraction and section ranking.
//!
//! Run with: cargo bench
//!
//! Documents are synthetic line dumps, so no PDF engine is involved.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pdfinsight::{
    extract_outline, rank_sections, BoundingBox, MemorySource, OutlineOptions, RankOptions,
    RawLine, RawRun, TfIdfSimilarity,
};

const TOPICS: &[&str] = &["revenue", "methodology", "travel", "cuisine", "hardware", "history"];

fn line(text: String, size: f32, y: f32) -> RawLine {
    RawLine::new(vec![RawRun::new(
        text,
        size,
        "Helvetica",
        BoundingBox::new(72.0, y, 540.0, y + size),
    )])
}

/// Creates a synthetic document with one heading and a few body lines per page.
fn create_document(name: &str, page_count: usize) -> MemorySource {
    let mut source = MemorySource::new(name);
    for p in 0..page_count {
        let topic = TOPICS[p % TOPICS.len()];
        let mut lines = vec![line(format!("Chapter {} on {}", p + 1, topic), 16.0, 40.0)];
        for i in 0..3 {
            let text = format!(
                "paragraph {} discusses {} in detail with figures and several supporting remarks",
                i, topic
            );
            lines.push(line(text, 9.0, 80.0 + 14.0 * i as f32));
        }
        source = source.with_page(lines);
    }
    source
}

fn bench_outline(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_outline");
    for pages in [5, 20, 50] {
        let doc = create_document("bench.pdf", pages);
        group.bench_with_input(BenchmarkId::from_parameter(pages), &doc, |b, doc| {
            b.iter(|| extract_outline(black_box(doc), &OutlineOptions::default()))
        });
    }
    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_sections");
    group.sample_size(20);
    for docs in [2, 8] {
        let sources: Vec<MemorySource> = (0..docs)
            .map(|i| create_document(&format!("doc{}.pdf", i), 20))
            .collect();
        let backend = TfIdfSimilarity::default();
        group.bench_with_input(BenchmarkId::from_parameter(docs), &sources, |b, sources| {
            b.iter(|| {
                rank_sections(
                    black_box(sources),
                    "Investment Analyst",
                    "analyze revenue trends",
                    &backend,
                    &RankOptions::default(),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_outline, bench_ranking);
criterion_main!(benches);
