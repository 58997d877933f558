use dyn_octree_core::prelude::*;

use rand::Rng;

/// `n` points drawn uniformly from the closed box `bounds`.
pub fn random_points_in_box(rng: &mut impl Rng, bounds: Extent3f, n: usize) -> Vec<Point3f> {
    let lub = bounds.least_upper_bound();

    (0..n)
        .map(|_| {
            PointN([
                rng.gen_range(bounds.minimum.x()..=lub.x()),
                rng.gen_range(bounds.minimum.y()..=lub.y()),
                rng.gen_range(bounds.minimum.z()..=lub.z()),
            ])
        })
        .collect()
}

/// `n` points scattered on the surface of `sphere`, which is how dense point clouds tend to look
/// when they come from scanned geometry.
pub fn random_points_on_sphere(rng: &mut impl Rng, sphere: Sphere3, n: usize) -> Vec<Point3f> {
    (0..n)
        .map(|_| {
            let direction = loop {
                let d: Point3f = PointN([
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                ]);
                let norm_squared = d.norm_squared();
                if norm_squared > 1e-6 && norm_squared <= 1.0 {
                    break d / norm_squared.sqrt();
                }
            };

            sphere.center + direction * sphere.radius
        })
        .collect()
}
