use crate::{Extent3f, Point3f, PointN};

use serde::{Deserialize, Serialize};

/// The region of space covered by a single node of a dynamic octree: a box centered at `center`
/// with per-axis half size `half_extent`.
///
/// Children are addressed by an index in `[0..7]` of the binary format `0bZYX`, where a set bit
/// means the child lies in the high half of that axis.
///
/// The box corners are carried down from the root rather than recomputed from `center` and
/// `half_extent`. Each child's box is bounded by its parent's corners and its parent's exact
/// `center`, so the children tile the parent with no gaps or overlaps from rounding, and a point
/// routed to a child by `child_index_containing` is always inside that child's `extent`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Octant {
    center: Point3f,
    half_extent: Point3f,
    extent: Extent3f,
}

impl Octant {
    #[inline]
    pub fn new(center: Point3f, half_extent: Point3f) -> Self {
        Self {
            center,
            half_extent,
            extent: Extent3f::from_center_and_half_extent(center, half_extent),
        }
    }

    /// The split point between the low and high children.
    #[inline]
    pub fn center(&self) -> Point3f {
        self.center
    }

    #[inline]
    pub fn half_extent(&self) -> Point3f {
        self.half_extent
    }

    #[inline]
    pub fn extent(&self) -> Extent3f {
        self.extent
    }

    #[inline]
    pub fn contains(&self, p: Point3f) -> bool {
        self.extent.contains(p)
    }

    /// The index of the child octant that owns `p`. A component strictly greater than the center
    /// goes to the high half; ties go to the low half.
    #[inline]
    pub fn child_index_containing(&self, p: Point3f) -> u8 {
        let mut index = 0;
        if p.x() > self.center.x() {
            index |= 0b001;
        }
        if p.y() > self.center.y() {
            index |= 0b010;
        }
        if p.z() > self.center.z() {
            index |= 0b100;
        }

        index
    }

    /// Returns the child octant at `child_index`. Its box spans from our center to the corner
    /// selected by the index bits.
    #[inline]
    pub fn child(&self, child_index: u8) -> Self {
        debug_assert!(child_index < 8);

        let corner = Point3f::CUBE_CORNER_OFFSETS[child_index as usize];
        let pick = |low: Point3f, high: Point3f| {
            PointN([
                if corner.x() > 0.0 { high.x() } else { low.x() },
                if corner.y() > 0.0 { high.y() } else { low.y() },
                if corner.z() > 0.0 { high.z() } else { low.z() },
            ])
        };
        let minimum = pick(self.extent.minimum, self.center);
        let maximum = pick(self.center, self.extent.maximum);
        let extent = Extent3f::from_min_and_max(minimum, maximum);

        Self {
            center: extent.center(),
            half_extent: self.half_extent / 2.0,
            extent,
        }
    }

    /// All 8 children, in index order.
    #[inline]
    pub fn children(&self) -> [Self; 8] {
        let mut children = [*self; 8];
        for (i, child) in children.iter_mut().enumerate() {
            *child = self.child(i as u8);
        }

        children
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
