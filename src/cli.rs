use std::{
    env,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use indicatif::ProgressBar;
use octrace::{
    Object as _,
    geometry::{FloatType, HitRecord, Ray, Transform, WorldVector},
    scene::{Mesh, Octree, OctreeSettings, StackCache},
};
use rand::{Rng as _, SeedableRng as _, rngs::SmallRng};
use rand_distr::{Distribution as _, UnitSphere};

const DEFAULT_RAY_COUNT: usize = 100_000;

/// Usage: octrace-cli [mesh.obj] [ray count]
///
/// Builds an octree over the mesh (a generated sphere if no file is given), then checks
/// random rays against the brute force mesh intersection and compares timings.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let mesh = match args.next() {
        Some(path) => Mesh::with_obj(&path, Transform::identity())
            .with_context(|| format!("Failed to load {path}"))?,
        None => {
            log::info!("No mesh given, using a generated sphere");
            Mesh::uv_sphere(Transform::identity(), 64, 96)
        }
    };
    let ray_count = args
        .next()
        .map(|s| s.parse::<usize>())
        .transpose()
        .context("Ray count must be a positive integer")?
        .unwrap_or(DEFAULT_RAY_COUNT);

    log::info!("Mesh has {} triangles", mesh.triangle_count());

    let start = Instant::now();
    let octree = Octree::build(&mesh, &OctreeSettings::default())?;
    log::info!("Octree built in {:?}", start.elapsed());
    octree.print_statistics();

    let bounds = octree.get_bounding_box();
    let size = bounds.size();
    let radius = size.norm();
    let tolerance = radius * 1e-4;

    let mut rng = SmallRng::seed_from_u64(0x0c7ee);
    let rays: Vec<Ray> = (0..ray_count)
        .map(|_| {
            let direction: [FloatType; 3] = UnitSphere.sample(&mut rng);
            let origin = bounds.center() + WorldVector::from(direction) * radius;
            let target = bounds.center()
                + WorldVector::from_fn(|_, _| rng.random_range(-0.5..=0.5)).component_mul(&size);
            Ray::new(origin, target - origin)
        })
        .collect();

    let bar = ProgressBar::new(ray_count as u64);
    let mut stack = StackCache::default();
    let mut octree_time = Duration::ZERO;
    let mut mesh_time = Duration::ZERO;
    let mut hits = 0usize;
    let mut mismatches = 0usize;

    for ray in &rays {
        let start = Instant::now();
        let octree_hit = octree.intersect(ray, &mut stack);
        octree_time += start.elapsed();

        let start = Instant::now();
        let mesh_hit = mesh.intersect(ray, &mut stack);
        mesh_time += start.elapsed();

        if octree_hit.is_some() {
            hits += 1;
        }
        if !same_hit(&octree_hit, &mesh_hit, tolerance) {
            mismatches += 1;
            log::debug!("Mismatch for {ray:?}: octree {octree_hit:?}, mesh {mesh_hit:?}");
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    log::info!("{hits} of {ray_count} rays hit the mesh");
    log::info!(
        "Octree: {:?} total, {:?} per ray",
        octree_time,
        octree_time / ray_count.max(1) as u32
    );
    log::info!(
        "Brute force: {:?} total, {:?} per ray",
        mesh_time,
        mesh_time / ray_count.max(1) as u32
    );

    if mismatches > 0 {
        log::warn!("{mismatches} rays gave different results for octree and brute force");
    } else {
        log::info!("Octree and brute force agree on all rays");
    }

    Ok(())
}

fn same_hit(a: &Option<HitRecord>, b: &Option<HitRecord>, tolerance: FloatType) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            (a.t - b.t).abs() <= tolerance
                && (a.point - b.point).norm() <= tolerance
                && a.outside == b.outside
        }
        _ => false,
    }
}
