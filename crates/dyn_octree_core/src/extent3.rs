use crate::{Point, Point3f};

use serde::{Deserialize, Serialize};

/// An axis-aligned box of real space, represented by its `minimum` and `maximum` corners.
///
/// Unlike a lattice extent, this box is *closed*: both corners are contained in it. The corners
/// are stored exactly, so two boxes built from a shared split value meet exactly on that plane.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Extent3f {
    /// The least point contained in the extent.
    pub minimum: Point3f,
    /// The greatest point contained in the extent.
    pub maximum: Point3f,
}

impl Extent3f {
    #[inline]
    pub fn from_min_and_max(minimum: Point3f, maximum: Point3f) -> Self {
        Self { minimum, maximum }
    }

    #[inline]
    pub fn from_min_and_shape(minimum: Point3f, shape: Point3f) -> Self {
        Self::from_min_and_max(minimum, minimum + shape)
    }

    /// The box spanning `center - half_extent` to `center + half_extent`.
    #[inline]
    pub fn from_center_and_half_extent(center: Point3f, half_extent: Point3f) -> Self {
        Self::from_min_and_max(center - half_extent, center + half_extent)
    }

    /// The greatest point contained in the extent.
    #[inline]
    pub fn least_upper_bound(&self) -> Point3f {
        self.maximum
    }

    /// The length of each dimension.
    #[inline]
    pub fn shape(&self) -> Point3f {
        self.maximum - self.minimum
    }

    #[inline]
    pub fn center(&self) -> Point3f {
        (self.minimum + self.maximum) / 2.0
    }

    #[inline]
    pub fn half_extent(&self) -> Point3f {
        self.shape() / 2.0
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        let shape = self.shape();

        shape.x() * shape.y() * shape.z()
    }

    /// Returns `true` iff `p` is inside of the closed box. Any NaN component is outside.
    #[inline]
    pub fn contains(&self, p: Point3f) -> bool {
        (0..3).all(|i| self.minimum.at(i) <= p.at(i) && p.at(i) <= self.maximum.at(i))
    }

    /// The point in the box nearest to `p`.
    #[inline]
    pub fn closest_point(&self, p: Point3f) -> Point3f {
        p.clamp(self.minimum, self.maximum)
    }

    /// The squared distance from `p` to the nearest point in the box. Zero when `p` is inside.
    #[inline]
    pub fn distance_squared_to_point(&self, p: Point3f) -> f32 {
        let offset = p - self.closest_point(p);

        offset.x() * offset.x() + offset.y() * offset.y() + offset.z() * offset.z()
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
