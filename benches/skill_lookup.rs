use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use skilldata::config::LoaderConfig;
use skilldata::database::build_table;
use skilldata::document::{Document, StaticSource};
use skilldata::handlers::Handlers;
use skilldata::skills::SkillTable;

/// `count` skills with ten levels and one enchant route each.
fn skill_document(count: u32) -> Document {
    let mut xml = String::from("<list>\n");
    for id in 1..=count {
        xml.push_str(&format!(
            r#"<skill id="{id}" toLevel="10" name="Skill {id}">
    <operateType>A1</operateType>
    <mpConsume><value fromLevel="1" toLevel="10">{{5 * index}}</value></mpConsume>
    <power>
        <value fromLevel="1" toLevel="10">{{20 * index}}</value>
        <value fromLevel="10" toLevel="10" fromSubLevel="1001" toSubLevel="1010">
            {{base + subIndex}}
        </value>
    </power>
    <conditions><condition name="NotInUnderwater"/></conditions>
</skill>
"#
        ));
    }
    xml.push_str("</list>\n");
    Document::from_str("bench.xml", &xml).expect("bench document parses")
}

fn build(count: u32) -> SkillTable {
    let source = StaticSource(vec![skill_document(count)]);
    let (table, _) = build_table(&source, &Handlers::with_builtins(), &LoaderConfig::default())
        .expect("bench table builds");
    table
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    for count in [100u32, 1_000] {
        let source = StaticSource(vec![skill_document(count)]);
        let handlers = Handlers::with_builtins();
        let config = LoaderConfig::default();
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| build_table(black_box(&source), &handlers, &config))
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let table = build(1_000);

    c.bench_function("get_skill exact", |b| {
        b.iter(|| table.get_skill(black_box(500), black_box(7), black_box(0)))
    });
    c.bench_function("get_skill enchanted", |b| {
        b.iter(|| table.get_skill(black_box(500), black_box(10), black_box(1005)))
    });
    c.bench_function("get_skill max level fallback", |b| {
        b.iter(|| table.get_skill(black_box(500), black_box(15), black_box(0)))
    });
}

criterion_group!(benches, bench_compile, bench_lookup);
criterion_main!(benches);
