use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use octrace::{
    Object,
    geometry::{Ray, Transform, WorldPoint, WorldVector},
    scene::{Mesh, Octree, OctreeSettings, StackCache},
};
use rand::{Rng as _, SeedableRng as _, rngs::SmallRng};

fn random_rays(count: usize) -> Vec<Ray> {
    let mut rng = SmallRng::seed_from_u64(1234);
    (0..count)
        .map(|_| {
            let origin = WorldPoint::from(WorldVector::from_fn(|_, _| rng.random_range(-3.0..3.0)));
            let target = WorldPoint::from(WorldVector::from_fn(|_, _| rng.random_range(-0.5..0.5)));
            Ray::new(origin, target - origin)
        })
        .collect()
}

fn trace_all(object: &impl Object, rays: &[Ray], stack: &mut StackCache) -> usize {
    rays.iter()
        .filter(|ray| object.intersect(ray, stack).is_some())
        .count()
}

fn criterion_benchmark(c: &mut Criterion) {
    let rays = random_rays(1000);
    let mut group = c.benchmark_group("intersect_1000_rays");

    for rings in [8, 32, 64] {
        let mesh = Mesh::uv_sphere(Transform::identity(), rings, 2 * rings);
        let octree = Octree::build(&mesh, &OctreeSettings::default()).unwrap();
        let triangles = mesh.triangle_count();

        group.bench_with_input(BenchmarkId::new("octree", triangles), &octree, |b, octree| {
            let mut stack = StackCache::default();
            b.iter(|| trace_all(octree, &rays, &mut stack))
        });
        group.bench_with_input(BenchmarkId::new("mesh", triangles), &mesh, |b, mesh| {
            let mut stack = StackCache::default();
            b.iter(|| trace_all(mesh, &rays, &mut stack))
        });
    }

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
