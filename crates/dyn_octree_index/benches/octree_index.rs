use dyn_octree_core::prelude::*;
use dyn_octree_index::prelude::*;
use utilities::data_sets::{random_points_in_box, random_points_on_sphere};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};

const HALF_EXTENT: f32 = 64.0;

fn empty_index() -> OctreeIndex<usize> {
    OctreeIndex::new(Point3f::ZERO, Point3f::fill(HALF_EXTENT), 10, 4, 16)
}

fn cloud(num_points: usize) -> Vec<Point3f> {
    let mut rng = StdRng::seed_from_u64(num_points as u64);

    random_points_in_box(&mut rng, empty_index().bounds(), num_points)
}

fn index_from_points(points: &[Point3f]) -> OctreeIndex<usize> {
    let mut index = empty_index();
    for (i, p) in points.iter().enumerate() {
        index.insert(*p, i).unwrap();
    }

    index
}

fn octree_insert_random_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_insert_random_points");
    for num_points in [1_000, 10_000, 100_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_points),
            num_points,
            |b, &num_points| {
                b.iter_with_setup(|| cloud(num_points), |points| index_from_points(&points));
            },
        );
    }
    group.finish();
}

fn octree_insert_sphere_surface(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_insert_sphere_surface");
    for num_points in [1_000, 10_000, 100_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_points),
            num_points,
            |b, &num_points| {
                b.iter_with_setup(
                    || {
                        let mut rng = StdRng::seed_from_u64(0);

                        random_points_on_sphere(
                            &mut rng,
                            Sphere3::new(Point3f::ZERO, HALF_EXTENT / 2.0),
                            num_points,
                        )
                    },
                    |points| index_from_points(&points),
                );
            },
        );
    }
    group.finish();
}

fn octree_remove_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_remove_all");
    for num_points in [1_000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_points),
            num_points,
            |b, &num_points| {
                b.iter_with_setup(
                    || {
                        let points = cloud(num_points);
                        let index = index_from_points(&points);

                        (points, index)
                    },
                    |(points, mut index)| {
                        for p in points.iter() {
                            black_box(index.remove(*p).unwrap());
                        }
                    },
                );
            },
        );
    }
    group.finish();
}

fn octree_sphere_cast(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_sphere_cast");
    for radius in [2.0f32, 8.0, 32.0].iter() {
        let mut index = index_from_points(&cloud(50_000));
        let center = PointN([3.0, -7.0, 11.0]);

        group.bench_with_input(BenchmarkId::new("cold", radius), radius, |b, &radius| {
            b.iter(|| {
                index.clear_caches();

                black_box(index.sphere_cast(center, radius).len())
            });
        });
        group.bench_with_input(BenchmarkId::new("cached", radius), radius, |b, &radius| {
            b.iter(|| black_box(index.sphere_cast(center, radius).len()));
        });
    }
    group.finish();
}

fn octree_find_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_find_nearest");
    let index = index_from_points(&cloud(50_000));
    let queries = cloud(100);

    group.bench_function("leaf_local", |b| {
        b.iter(|| {
            for q in queries.iter() {
                black_box(index.find_nearest_node(*q));
            }
        });
    });
    group.bench_function("global", |b| {
        b.iter(|| {
            for q in queries.iter() {
                black_box(index.find_nearest_global(*q, 0.5, 2.0 * HALF_EXTENT));
            }
        });
    });
    group.finish();
}

fn octree_encode_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_encode_decode");
    for num_points in [1_000, 10_000].iter() {
        let index = index_from_points(&cloud(*num_points));
        let bytes = index.encode().unwrap();

        group.bench_with_input(BenchmarkId::new("encode", num_points), &index, |b, index| {
            b.iter(|| black_box(index.encode().unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("decode", num_points), &bytes, |b, bytes| {
            b.iter(|| black_box(OctreeIndex::<usize>::decode(bytes).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    octree_insert_random_points,
    octree_insert_sphere_surface,
    octree_remove_all,
    octree_sphere_cast,
    octree_find_nearest,
    octree_encode_decode
);
criterion_main!(benches);
