use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use roster_sync::feed::ContractRecord;
use roster_sync::name_key::normalize;
use roster_sync::resolve::{AliasTable, SourceIndex};

fn sample_records() -> Vec<ContractRecord> {
    let first_names = [
        "Jayson", "Nikola", "Luka", "Shai", "Giannis", "Victor", "Anthony", "Devin", "Tyrese",
        "Jalen", "P.J.", "Kenyon", "Larry", "Gary", "Dereck", "Jaren",
    ];
    let last_names = [
        "Tatum", "Jokić", "Dončić", "Gilgeous-Alexander", "Antetokounmpo", "Wembanyama",
        "Edwards", "Booker", "Haliburton", "Williams", "Tucker", "Martin Jr.", "Nance Jr.",
        "Payton II", "Lively II", "Jackson Jr.",
    ];

    let mut records = Vec::new();
    for first in first_names {
        for last in last_names {
            records.push(ContractRecord {
                name: format!("{first} {last}"),
                team_code: "BOS".to_string(),
                age: Some(25),
                salary_by_year: [(2025u16, 10.0f64)].into_iter().collect(),
                contract_end_year: Some(2026),
                option_type: None,
                guaranteed: None,
            });
        }
    }
    records
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_name", |b| {
        b.iter(|| {
            black_box(normalize(black_box("Kristaps Porziņģis Jr.")));
            black_box(normalize(black_box("P.J. Tucker")));
            black_box(normalize(black_box("Jalen Hood-Schifino")));
        })
    });
}

fn bench_index_build(c: &mut Criterion) {
    let records = sample_records();
    c.bench_function("index_build_256", |b| {
        b.iter(|| {
            let index = SourceIndex::build(black_box(&records));
            black_box(&index);
        })
    });
}

fn bench_resolve(c: &mut Criterion) {
    let records = sample_records();
    let index = SourceIndex::build(&records);
    let aliases = AliasTable::builtin();

    c.bench_function("resolve_indexed_tiers", |b| {
        b.iter(|| {
            black_box(index.resolve(black_box("Jayson Tatum"), &aliases));
            black_box(index.resolve(black_box("PJ Tucker"), &aliases));
        })
    });

    // Worst case: every tier misses and the full collection is scanned.
    c.bench_function("resolve_fallback_miss", |b| {
        b.iter(|| {
            black_box(index.resolve(black_box("Nobody Matchable"), &aliases));
        })
    });
}

criterion_group!(benches, bench_normalize, bench_index_build, bench_resolve);
criterion_main!(benches);
