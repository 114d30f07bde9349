//! Benchmarks for update generation
//!
//! Covers the four reference transitions through the full pipeline and tree
//! updates for a growing list.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use livepatch_config::LivepatchConfig;
use livepatch_generator::UpdateGenerator;
use livepatch_template::Template;
use serde_json::{json, Value};
use std::hint::black_box;

fn scenarios() -> Vec<(&'static str, Template, Value, Value)> {
    vec![
        (
            "text",
            Template::parse("text", "<div>{{.V}}</div>").unwrap(),
            json!({"V": "Hello"}),
            json!({"V": "Hi there"}),
        ),
        (
            "attribute",
            Template::parse("attribute", r#"<div class="{{.V}}">Content</div>"#).unwrap(),
            json!({"V": "old"}),
            json!({"V": "new"}),
        ),
        (
            "append",
            Template::parse("append", "<ul>{{range .V}}<li>{{.}}</li>{{end}}</ul>").unwrap(),
            json!({"V": ["Item 1"]}),
            json!({"V": ["Item 1", "Item 2"]}),
        ),
        (
            "structural",
            Template::parse(
                "structural",
                "{{if .V}}<article><h1>New</h1></article>{{else}}<div><p>Old</p></div>{{end}}",
            )
            .unwrap(),
            json!({"V": false}),
            json!({"V": true}),
        ),
    ]
}

/// Full pipeline with a warm analysis cache
fn bench_generate_update(c: &mut Criterion) {
    let generator = UpdateGenerator::from_config(&LivepatchConfig::default());
    let mut group = c.benchmark_group("generate_update");

    for (name, template, old, new) in scenarios() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &(template, old, new), |b, (t, old, new)| {
            b.iter(|| black_box(generator.generate_update(t, Some(old), new).unwrap()));
        });
    }
    group.finish();
}

/// Tree updates alternating between two list sizes
fn bench_tree_update(c: &mut Criterion) {
    let template = Template::parse("list", "<ul>{{range .Items}}<li>{{.}}</li>{{end}}</ul>").unwrap();
    let mut group = c.benchmark_group("tree_update");

    for size in [10usize, 100, 1000] {
        let small = json!({"Items": (0..size).collect::<Vec<_>>()});
        let large = json!({"Items": (0..=size).collect::<Vec<_>>()});
        let generator = UpdateGenerator::from_config(&LivepatchConfig::default());
        generator.generate_tree_update("list", &template, &small).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let mut flip = false;
            b.iter(|| {
                flip = !flip;
                let data = if flip { &large } else { &small };
                black_box(generator.generate_tree_update("list", &template, data).unwrap())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate_update, bench_tree_update);
criterion_main!(benches);
