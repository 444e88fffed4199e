//! Benchmarks for interface classification and slot lookup.
//!
//! Both run on every interface request the host makes, including the frequent
//! `GetGenericInterface` calls many engines issue per frame:
//! - Classifying tracked and untracked interface names
//! - Resolving the call sites of a family for a revision
//! - Rejecting an unsupported revision

extern crate vrshim;

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use vrshim::interface::{InterfaceFamily, InterfaceVersion, SlotTable};

/// Benchmark classifying a tracked interface name.
fn bench_classify_tracked(c: &mut Criterion) {
    c.bench_function("classify_tracked", |b| {
        b.iter(|| black_box(InterfaceVersion::parse(black_box("IVRSystem_022"))));
    });
}

/// Benchmark classifying a name that belongs to no tracked family.
/// All three families have to be tried.
fn bench_classify_untracked(c: &mut Criterion) {
    c.bench_function("classify_untracked", |b| {
        b.iter(|| black_box(InterfaceVersion::parse(black_box("IVRRenderModels_006"))));
    });
}

/// Benchmark resolving the compositor's call site for the current revision.
fn bench_resolve_compositor(c: &mut Criterion) {
    let table = SlotTable::builtin();
    let version = InterfaceVersion::new(InterfaceFamily::Compositor, 27);

    c.bench_function("resolve_compositor", |b| {
        b.iter(|| black_box(table.resolve(black_box(version))));
    });
}

/// Benchmark resolving both core-client call sites.
fn bench_resolve_client_core(c: &mut Criterion) {
    let table = SlotTable::builtin();
    let version = InterfaceVersion::new(InterfaceFamily::ClientCore, 3);

    c.bench_function("resolve_client_core", |b| {
        b.iter(|| black_box(table.resolve(black_box(version))));
    });
}

/// Benchmark rejecting a revision no rule covers.
fn bench_resolve_unsupported(c: &mut Criterion) {
    let table = SlotTable::builtin();
    let version = InterfaceVersion::new(InterfaceFamily::Compositor, 6);

    c.bench_function("resolve_unsupported", |b| {
        b.iter(|| black_box(table.resolve(black_box(version)).is_err()));
    });
}

criterion_group!(
    benches,
    bench_classify_tracked,
    bench_classify_untracked,
    bench_resolve_compositor,
    bench_resolve_client_core,
    bench_resolve_unsupported
);
criterion_main!(benches);
