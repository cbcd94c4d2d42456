//! Full dumps and budgeted drawing over a built point cloud.

use compact_octree::glam::DVec3;
use compact_octree::view::{NoCulling, PointRenderer};
use compact_octree::{Octree, OctreeBuilder, OctreeConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Sums what it is given so the optimizer can't drop the traversal.
#[derive(Default)]
struct SinkRenderer {
    sum: DVec3,
    count: usize,
}

impl PointRenderer for SinkRenderer {
    fn set_color(&mut self, _rgb: [f32; 3]) {}

    fn vertex(&mut self, position: DVec3) {
        self.sum += position;
        self.count += 1;
    }
}

/// Points on a noisy sphere of radius 50.
fn sphere_cloud(count: usize) -> Vec<f64> {
    let golden = std::f64::consts::PI * (3.0 - 5f64.sqrt());
    let mut values = Vec::with_capacity(count * 3);
    for i in 0..count {
        let y = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
        let r = (1.0 - y * y).sqrt();
        let theta = golden * i as f64;
        let radius = 50.0 + (i % 17) as f64 * 0.05;
        values.extend([
            radius * r * theta.cos(),
            radius * y,
            radius * r * theta.sin(),
        ]);
    }
    values
}

fn build_tree(count: usize) -> Octree {
    OctreeBuilder::new(OctreeConfig::DEFAULT.with_voxel_size(2.0))
        .build(&sphere_cloud(count))
        .unwrap()
}

fn bench_build(c: &mut Criterion) {
    let values = sphere_cloud(100_000);
    let builder = OctreeBuilder::new(OctreeConfig::DEFAULT.with_voxel_size(2.0));

    c.bench_function("build (100k points)", |b| {
        b.iter(|| black_box(builder.build(black_box(&values)).unwrap()))
    });
}

fn bench_all_points(c: &mut Criterion) {
    let tree = build_tree(100_000);

    c.bench_function("all_points (100k points)", |b| {
        b.iter(|| black_box(tree.all_points()))
    });
}

fn bench_draw_lod(c: &mut Criterion) {
    let tree = build_tree(100_000);
    let mut group = c.benchmark_group("draw_lod");

    for budget in [1_000i64, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(budget), &budget, |b, &budget| {
            b.iter(|| {
                let mut renderer = SinkRenderer::default();
                tree.draw_lod(budget, &mut renderer);
                black_box((renderer.sum, renderer.count))
            })
        });
    }

    group.finish();
}

fn bench_draw_culled(c: &mut Criterion) {
    let tree = build_tree(100_000);
    let budget = tree.max_target_points() as i64;

    c.bench_function("draw_culled (no culling, full budget)", |b| {
        b.iter(|| {
            let mut renderer = SinkRenderer::default();
            tree.draw_culled(budget, &NoCulling, &mut renderer);
            black_box((renderer.sum, renderer.count))
        })
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_all_points,
    bench_draw_lod,
    bench_draw_culled
);
criterion_main!(benches);
