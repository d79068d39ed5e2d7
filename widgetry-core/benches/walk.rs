//! Benchmarks for initialization walks

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use widgetry_core::manager::{FixedResolver, WidgetManager};
use widgetry_core::tree::{Element, NodeRef};
use widgetry_core::widget::{DoneCallback, Widget, WidgetLifecycle, WidgetState, WidgetType};

/// Settles as soon as it is initialized.
struct Instant(WidgetLifecycle);

impl Widget for Instant {
    fn name(&self) -> &str {
        self.0.name()
    }
    fn state(&self) -> WidgetState {
        self.0.state()
    }
    fn init(self: Arc<Self>, node: &NodeRef, done: DoneCallback) -> bool {
        self.0.attach(&self, node, done) && self.0.done()
    }
    fn done(&self) -> bool {
        self.0.done()
    }
    fn fail(&self) -> bool {
        self.0.fail()
    }
    fn destroy(&self) {
        self.0.destroy()
    }
}

fn manager() -> WidgetManager {
    WidgetManager::new(FixedResolver::new(WidgetType::new("Instant", || {
        Arc::new(Instant(WidgetLifecycle::new("Instant"))) as Arc<dyn Widget>
    })))
}

fn wide_tree(count: usize) -> Arc<Element> {
    (0..count)
        .fold(Element::div(), |root, i| {
            root.with_child(Element::div().with_widget(format!("W{i}")))
        })
        .into_shared()
}

fn deep_tree(depth: usize) -> Arc<Element> {
    (0..depth)
        .rev()
        .fold(None, |child: Option<Element>, i| {
            let node = Element::div().with_widget(format!("W{i}"));
            Some(match child {
                Some(child) => node.with_child(child),
                None => node,
            })
        })
        .unwrap_or_else(Element::div)
        .into_shared()
}

fn bench_walk(c: &mut Criterion, name: &str, build: fn(usize) -> Arc<Element>, sizes: &[usize]) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let mut group = c.benchmark_group(name);

    for &size in sizes {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let manager = manager();
                let root = build(size);
                let report = runtime.block_on(manager.init_tree(root.clone()));
                manager.destroy(&(root as NodeRef));
                black_box(report)
            });
        });
    }

    group.finish();
}

fn bench_wide(c: &mut Criterion) {
    bench_walk(c, "init_wide", wide_tree, &[10, 100, 1000]);
}

fn bench_deep(c: &mut Criterion) {
    bench_walk(c, "init_deep", deep_tree, &[10, 50, 200]);
}

/// Walks over a tree whose widgets are all initialized only descend.
fn bench_rewalk(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let manager = manager();
    let root = wide_tree(500);
    runtime.block_on(manager.init_tree(root.clone()));

    c.bench_function("rewalk_initialized", |b| {
        b.iter(|| black_box(runtime.block_on(manager.init_tree(root.clone()))));
    });
}

criterion_group!(benches, bench_wide, bench_deep, bench_rewalk);
criterion_main!(benches);
