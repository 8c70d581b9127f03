//! Binding benchmarks.
//!
//! Structural operations should cost in proportion to the subtree they touch,
//! so splitting a short branch off a large group should stay flat as the
//! group grows.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tether_core::{Bindings, Entity};

fn chain(bindings: &Bindings<u64>, len: usize) -> Vec<Entity<u64>> {
    let mut members: Vec<Entity<u64>> = Vec::with_capacity(len);
    for i in 0..len {
        let member = bindings.spawn([("value", i as u64)]);
        if let Some(parent) = members.last() {
            member
                .bind_to("value", parent)
                .expect("chain members are simple");
        }
        members.push(member);
    }
    members
}

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("set");
    for len in [10usize, 100, 1000] {
        let bindings = Bindings::new();
        let members = chain(&bindings, len);
        let mut next = 0u64;
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| {
                next += 1;
                members[0].set("value", black_box(next)).expect("set");
            })
        });
    }
    group.finish();
}

fn bench_split_leaf_branch(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_leaf_branch");
    for len in [10usize, 100, 1000] {
        let bindings = Bindings::new();
        let members = chain(&bindings, len);
        let root = &members[0];
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| {
                let head = bindings.spawn([("value", 0u64)]);
                let tail = bindings.spawn([("value", 0u64)]);
                tail.bind_to("value", &head).expect("bind tail");
                head.bind_to("value", root).expect("merge branch");
                head.unbind("value").expect("split branch");
                bindings.remove_entity(tail.id()).expect("remove tail");
                bindings.remove_entity(head.id()).expect("remove head");
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_set, bench_split_leaf_branch);
criterion_main!(benches);
