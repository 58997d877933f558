//! The core geometric data types for a dynamic point octree:
//! - `PointN`: an N-dimensional point, most importantly `Point3f`
//! - `Extent3f`: a closed, axis-aligned box of real space
//! - `Octant`: the box covered by one octree node, with the child addressing scheme
//! - `Sphere3`: the query volume for sphere casts

pub mod extent3;
pub mod octant;
pub mod point;
pub mod point3;
pub mod sphere;

pub use extent3::Extent3f;
pub use octant::Octant;
pub use point::{
    Bounded, Distance, DotProduct, Norm, NormSquared, Ones, Point, PointN, SmallOne, SmallZero,
};
pub use point3::{Point3, Point3f};
pub use sphere::Sphere3;

pub use num;

pub mod prelude {
    pub use super::{
        Bounded, Distance, DotProduct, Extent3f, Norm, NormSquared, Octant, Ones, Point, Point3,
        Point3f, PointN, SmallZero, Sphere3,
    };
}
