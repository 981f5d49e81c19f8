//! Performance benchmarks for annotation extraction
//!
//! Measures the two steps a host repeats on every (debounced) document change:
//! - Parsing a document into annotation records
//! - Building the render plan, with and without an active search query
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use marginalia_core::{
    annotation::Category,
    parser::parse,
    query::SortOrder,
    render::build_render_plan,
    view_state::ViewState,
};

// A note-taking document with every annotation syntax on a fraction of its lines.
fn synthetic_document(lines: usize) -> String {
    let mut text = String::with_capacity(lines * 64);
    for i in 0..lines {
        match i % 8 {
            0 => text.push_str(&format!("## Section {i}\n")),
            1 => text.push_str(&format!("Plain prose with ==key point {i}== in the middle.\n")),
            2 => text.push_str(&format!("%%todo {i}%% then <mark>marked {i}</mark> text.\n")),
            3 => text.push_str(&format!("<!-- margin note {i} --> and more prose.\n")),
            4 => text.push_str(&format!("[^{i}]: footnote body for entry {i}\n")),
            _ => text.push_str("Ordinary sentence without any markup at all, just words.\n"),
        }
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for lines in [100usize, 1_000, 10_000] {
        let document = synthetic_document(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &document, |b, doc| {
            b.iter(|| parse(black_box(doc)))
        });
    }
    group.finish();
}

fn bench_render_plan(c: &mut Criterion) {
    let document = synthetic_document(5_000);

    let default_state = ViewState::default();
    c.bench_function("render_plan_default", |b| {
        b.iter(|| build_render_plan(black_box(Some(&document)), &default_state))
    });

    let mut searched = ViewState::default();
    let _ = searched.set_search_query("NOTE 4");
    let _ = searched.set_category_sort_order(Category::Highlight, SortOrder::Alphabetical);
    let _ = searched.set_category_sort_order(Category::Footnote, SortOrder::ReverseAlphabetical);
    c.bench_function("render_plan_search_and_sort", |b| {
        b.iter(|| build_render_plan(black_box(Some(&document)), &searched))
    });
}

criterion_group!(benches, bench_parse, bench_render_plan);
criterion_main!(benches);
