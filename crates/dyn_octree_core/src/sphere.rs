use crate::{Distance, Extent3f, Point3f};

use serde::{Deserialize, Serialize};

/// A ball in real space. The boundary is included.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Sphere3 {
    pub center: Point3f,
    pub radius: f32,
}

impl Sphere3 {
    #[inline]
    pub fn new(center: Point3f, radius: f32) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn radius_squared(&self) -> f32 {
        self.radius * self.radius
    }

    #[inline]
    pub fn contains(&self, p: Point3f) -> bool {
        self.center.l2_distance_squared(&p) <= self.radius_squared()
    }

    /// Returns `true` iff the closest point of `extent` to the center lies within the sphere.
    #[inline]
    pub fn intersects_extent(&self, extent: &Extent3f) -> bool {
        extent.distance_squared_to_point(self.center) <= self.radius_squared()
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, PointN};

    #[test]
    fn sphere_touching_box_face_intersects() {
        let extent = Extent3f::from_min_and_shape(Point3f::fill(0.0), Point3f::fill(1.0));

        assert!(Sphere3::new(PointN([2.0, 0.5, 0.5]), 1.0).intersects_extent(&extent));
        assert!(!Sphere3::new(PointN([2.0, 2.0, 0.5]), 1.0).intersects_extent(&extent));
    }

    #[test]
    fn boundary_point_is_contained() {
        let sphere = Sphere3::new(Point3f::fill(1.0), 2.0);

        assert!(sphere.contains(PointN([3.0, 1.0, 1.0])));
        assert!(!sphere.contains(Point3f::fill(4.0)));
    }
}
