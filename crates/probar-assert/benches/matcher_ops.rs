//! Matcher Operations Benchmarks
//!
//! Benchmarks for field-criteria search over collections and tables, and
//! for batch visibility checks on containers.
//!
//! Run with: `cargo bench --bench matcher_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use probar_assert::mock::{MockCollection, MockColumn, MockContainer, MockElement, MockTable};
use probar_assert::prelude::*;

fn collection(size: usize) -> MockCollection {
    (0..size).fold(MockCollection::new("Users"), |users, i| {
        let name = format!("user-{i}");
        let role = if i % 2 == 0 { "admin" } else { "viewer" };
        users.with_row(&[("Name", name.as_str()), ("Role", role)])
    })
}

fn table(size: usize) -> MockTable {
    let names: Vec<String> = (0..size).map(|i| format!("user-{i}")).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let roles: Vec<&str> = (0..size)
        .map(|i| if i % 2 == 0 { "admin" } else { "viewer" })
        .collect();
    MockTable::new("Staff")
        .with_column(MockColumn::with_values("Name", &names))
        .with_column(MockColumn::with_values("Role", &roles))
}

fn bench_criteria_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("criteria_parsing");

    let cases = vec![
        ("single", vec![("Name", "Ann")]),
        ("pair", vec![("First  Name", "Ann"), ("Role", "admin")]),
        (
            "wide",
            vec![
                ("Name", "Ann"),
                ("Role", "admin"),
                ("Team", "core"),
                ("Office", "Lisbon"),
                ("Status", "active"),
            ],
        ),
    ];

    for (name, fields) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &fields, |bench, fields| {
            bench.iter(|| {
                let criteria = FieldCriteria::new(black_box(fields.clone())).unwrap();
                black_box(criteria);
            });
        });
    }

    group.finish();
}

fn bench_collection_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_search");

    for size in [10, 100, 500] {
        let users = collection(size);
        let last = format!("user-{}", size - 1);
        let criteria = FieldCriteria::new([("name", last.as_str())]).unwrap();
        let criterion: MatchCriterion<'_, dyn Container + '_> = criteria.into();
        group.bench_with_input(BenchmarkId::new("find_last", size), &size, |bench, _| {
            bench.iter(|| {
                let members = users.containers();
                black_box(find_matching(&members, &criterion).is_some());
            });
        });
        group.bench_with_input(BenchmarkId::new("contains_fields", size), &size, |bench, _| {
            bench.iter(|| {
                let outcome = assert_that(&users).contains_fields([("Role", "viewer")]);
                black_box(outcome.is_ok());
            });
        });
    }

    group.finish();
}

fn bench_table_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_search");

    for size in [10, 100, 500] {
        let staff = table(size);
        let last = format!("user-{}", size - 1);
        let criteria = FieldCriteria::new([("Name", last.as_str()), ("Role", "viewer")]).unwrap();
        group.bench_with_input(BenchmarkId::new("find_row", size), &size, |bench, _| {
            bench.iter(|| black_box(find_row(&staff, "Name", black_box(&last))));
        });
        group.bench_with_input(BenchmarkId::new("find_row_index", size), &size, |bench, _| {
            bench.iter(|| black_box(find_row_index(&staff, &criteria)));
        });
        let roles = vec!["admin"; size];
        let column = MockColumn::with_values("Role", &roles);
        group.bench_with_input(BenchmarkId::new("find_rows", size), &size, |bench, _| {
            bench.iter(|| black_box(find_rows(&column, "admin").len()));
        });
    }

    group.finish();
}

fn bench_batch_visibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_visibility");

    for size in [5, 50] {
        let form = (0..size).fold(MockContainer::new("Form"), |form, i| {
            let id = format!("field-{i}");
            form.with_element(id.clone(), MockElement::new(id))
        });
        group.bench_with_input(BenchmarkId::new("all_displayed", size), &size, |bench, _| {
            bench.iter(|| black_box(assert_that(&form).all_elements_are_displayed().is_ok()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_criteria_parsing,
    bench_collection_search,
    bench_table_search,
    bench_batch_visibility
);
criterion_main!(benches);
