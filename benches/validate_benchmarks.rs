//! Benchmarks for static validation and tree traversal

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use trellis::builder::*;
use trellis::component::{IntoNode, Node};
use trellis::traverse::dump;
use trellis::validate::validate;

/// A suite of `width` groups, each a chain of `depth` producer/consumer pairs
fn create_tree(width: usize, depth: usize) -> Node {
    let mut root = suite("bench");
    for g in 0..width {
        let mut branch = group(format!("group-{g}"));
        for d in 0..depth {
            let var = format!("v{g}_{d}");
            branch = branch
                .run(noop(format!("produce-{d}")).with_meta(meta().export([var.clone()])))
                .run(retry(3).run(noop(format!("consume-{d}")).with_meta(meta().require([var]))))
                .run(noop(format!("orphan-{d}")).with_meta(meta().require(["missing"])));
        }
        root = root.run(branch);
    }
    root.into_node()
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for (width, depth) in [(4, 4), (16, 16), (64, 32)] {
        let tree = create_tree(width, depth);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{depth}")),
            &tree,
            |b, tree| b.iter(|| validate(black_box(tree))),
        );
    }

    group.finish();
}

fn bench_dump(c: &mut Criterion) {
    let tree = create_tree(16, 16);
    c.bench_function("dump_16x16", |b| b.iter(|| dump(black_box(&tree))));
}

criterion_group!(benches, bench_validate, bench_dump);
criterion_main!(benches);
