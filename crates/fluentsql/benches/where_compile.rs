use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fluentsql::{Op, QueryBuilder, WhereBuilder};

/// `n` AND conditions: `c0 = :w1 AND c1 = :w2 ...`
fn build_flat(n: usize) -> QueryBuilder {
    (0..n).fold(QueryBuilder::table("t"), |qb, i| {
        qb.where_(&format!("c{i}"), i as i64)
    })
}

/// `n` OR groups of two ANDed conditions each.
fn build_grouped(n: usize) -> QueryBuilder {
    (0..n).fold(QueryBuilder::table("t"), |qb, i| {
        qb.or_where(|q| {
            q.where_(&format!("a{i}"), i as i64)
                .where_cmp(&format!("b{i}"), Op::Lt, i as i64)
        })
    })
}

/// Nesting depth `n`, each level holding one leaf and one OR group.
fn build_deep(n: usize) -> QueryBuilder {
    fn level(q: fluentsql::Nested<'_>, depth: usize) -> fluentsql::Nested<'_> {
        let q = q.where_("d", depth as i64);
        if depth == 0 {
            return q;
        }
        q.or_where_nested(|q| level(q, depth - 1))
    }
    QueryBuilder::table("t").where_nested(|q| level(q, n))
}

fn bench_compile_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("where_compile/flat");

    for n in [1, 5, 10, 50, 100] {
        let qb = build_flat(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.compile_select()));
        });
    }

    group.finish();
}

fn bench_compile_grouped(c: &mut Criterion) {
    let mut group = c.benchmark_group("where_compile/grouped");

    for n in [1, 5, 10, 50] {
        let qb = build_grouped(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.to_sql()));
        });
    }

    group.finish();
}

fn bench_build_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("where_compile/build_nested");

    for depth in [1, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| black_box(build_deep(depth).compile_select()));
        });
    }

    group.finish();
}

fn bench_where_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("where_compile/where_in");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let qb = QueryBuilder::table("t").where_in("id", values.iter().copied());
                black_box(qb.compile_select());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compile_flat,
    bench_compile_grouped,
    bench_build_nested,
    bench_where_in
);
criterion_main!(benches);
