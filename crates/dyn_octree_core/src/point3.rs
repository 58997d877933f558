use crate::{
    point::SmallOne, Bounded, Distance, DotProduct, NormSquared, Ones, Point, PointN, SmallZero,
};

use core::ops::{Add, Div, Mul, Sub};

/// A 3-dimensional point with scalar type `T`.
pub type Point3<T> = PointN<[T; 3]>;
/// A 3-dimensional point with scalar type `f32`.
pub type Point3f = PointN<[f32; 3]>;

impl<T> Point3<T> {
    pub fn x_mut(&mut self) -> &mut T {
        &mut self.0[0]
    }

    pub fn y_mut(&mut self) -> &mut T {
        &mut self.0[1]
    }

    pub fn z_mut(&mut self) -> &mut T {
        &mut self.0[2]
    }
}

impl<T> Point3<T>
where
    T: Copy,
{
    pub fn x(&self) -> T {
        self.0[0]
    }

    pub fn y(&self) -> T {
        self.0[1]
    }

    pub fn z(&self) -> T {
        self.0[2]
    }
}

impl Point3f {
    /// The offsets of the 8 corners of a unit cube, ordered by the bit pattern `0bZYX`. Octant
    /// child indices use the same convention.
    pub const CUBE_CORNER_OFFSETS: [Self; 8] = [
        PointN([0.0, 0.0, 0.0]),
        PointN([1.0, 0.0, 0.0]),
        PointN([0.0, 1.0, 0.0]),
        PointN([1.0, 1.0, 0.0]),
        PointN([0.0, 0.0, 1.0]),
        PointN([1.0, 0.0, 1.0]),
        PointN([0.0, 1.0, 1.0]),
        PointN([1.0, 1.0, 1.0]),
    ];

    /// Returns `true` iff every component is neither infinite nor NaN.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x().is_finite() && self.y().is_finite() && self.z().is_finite()
    }

    /// Clamp each component into `[min, max]` of the corresponding components.
    #[inline]
    pub fn clamp(&self, min: Self, max: Self) -> Self {
        self.join(&min).meet(&max)
    }

    /// Replaces negative zero components with positive zero. Two points are `==` iff their
    /// normalized bit patterns are equal, unless a component is NaN.
    #[inline]
    pub fn normalize_zero_sign(&self) -> Self {
        self.map_components(|c| if c == 0.0 { 0.0 } else { c })
    }

    /// The raw bit pattern of each component.
    #[inline]
    pub fn to_bits(&self) -> [u32; 3] {
        [self.x().to_bits(), self.y().to_bits(), self.z().to_bits()]
    }
}

impl Bounded for Point3f {
    const MIN: Self = PointN([f32::MIN; 3]);
    const MAX: Self = PointN([f32::MAX; 3]);
}

impl Point for Point3f {
    type Scalar = f32;

    #[inline]
    fn fill(value: f32) -> Self {
        PointN([value; 3])
    }

    #[inline]
    fn at(&self, component_index: usize) -> Self::Scalar {
        self.0[component_index]
    }

    #[inline]
    fn abs(&self) -> Self {
        self.map_components(|c| c.abs())
    }

    #[inline]
    fn map_components(&self, f: impl Fn(Self::Scalar) -> Self::Scalar) -> Self {
        PointN([f(self.x()), f(self.y()), f(self.z())])
    }

    #[inline]
    fn zip_map_components(&self, other: &Self, f: impl Fn(f32, f32) -> f32) -> Self {
        PointN([
            f(self.x(), other.x()),
            f(self.y(), other.y()),
            f(self.z(), other.z()),
        ])
    }

    #[inline]
    fn join(&self, other: &Self) -> Self {
        self.zip_map_components(other, f32::max)
    }

    #[inline]
    fn meet(&self, other: &Self) -> Self {
        self.zip_map_components(other, f32::min)
    }

    #[inline]
    fn min_component(&self) -> f32 {
        self.x().min(self.y()).min(self.z())
    }

    #[inline]
    fn max_component(&self) -> f32 {
        self.x().max(self.y()).max(self.z())
    }
}

impl SmallZero for Point3f {
    const ZERO: Self = PointN([f32::ZERO; 3]);
}

impl Ones for Point3f {
    const ONES: Self = PointN([f32::ONE; 3]);
}

impl Distance for Point3f {
    #[inline]
    fn l2_distance_squared(&self, other: &Self) -> f32 {
        (*self - *other).norm_squared()
    }

    #[inline]
    fn l2_distance(&self, other: &Self) -> f32 {
        self.l2_distance_squared(other).sqrt()
    }
}

impl NormSquared for Point3f {
    #[inline]
    fn norm_squared(&self) -> f32 {
        self.dot(self)
    }
}

impl<T> DotProduct for Point3<T>
where
    T: Copy + Add<Output = T> + Mul<Output = T>,
{
    type Scalar = T;

    #[inline]
    fn dot(&self, other: &Self) -> Self::Scalar {
        self.x() * other.x() + self.y() * other.y() + self.z() * other.z()
    }
}

impl Add for Point3f {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        self.zip_map_components(&rhs, |a, b| a + b)
    }
}

impl Sub for Point3f {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_map_components(&rhs, |a, b| a - b)
    }
}

impl Mul<f32> for Point3f {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        self.map_components(|c| c * rhs)
    }
}

impl Mul<Point3f> for f32 {
    type Output = Point3f;

    #[inline]
    fn mul(self, rhs: Point3f) -> Point3f {
        rhs * self
    }
}

impl Mul<Self> for Point3f {
    type Output = Self;

    #[inline]
    fn mul(self, other: Self) -> Self {
        self.zip_map_components(&other, |a, b| a * b)
    }
}

impl Div<f32> for Point3f {
    type Output = Self;

    #[inline]
    fn div(self, rhs: f32) -> Self {
        self.map_components(|c| c / rhs)
    }
}

#[cfg(feature = "mint")]
mod mint_conversions {
    use super::*;

    impl From<mint::Point3<f32>> for Point3f {
        #[inline]
        fn from(p: mint::Point3<f32>) -> Self {
            PointN([p.x, p.y, p.z])
        }
    }

    impl From<Point3f> for mint::Point3<f32> {
        #[inline]
        fn from(p: Point3f) -> Self {
            mint::Point3::from_slice(&p.0)
        }
    }

    impl From<mint::Vector3<f32>> for Point3f {
        #[inline]
        fn from(p: mint::Vector3<f32>) -> Self {
            PointN([p.x, p.y, p.z])
        }
    }

    impl From<Point3f> for mint::Vector3<f32> {
        #[inline]
        fn from(p: Point3f) -> Self {
            mint::Vector3::from_slice(&p.0)
        }
    }
}

#[cfg(feature = "glam")]
mod glam_conversions {
    use super::*;

    use glam as gl;

    impl From<gl::Vec3> for Point3f {
        #[inline]
        fn from(p: gl::Vec3) -> Self {
            PointN([p.x, p.y, p.z])
        }
    }

    impl From<Point3f> for gl::Vec3 {
        #[inline]
        fn from(p: Point3f) -> Self {
            gl::Vec3::new(p.x(), p.y(), p.z())
        }
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

    use pretty_assertions::assert_eq;

    #[test]
    fn clamp_pulls_point_onto_box_surface() {
        let p = PointN([-3.0, 0.5, 9.0]);

        assert_eq!(
            p.clamp(Point3f::fill(-1.0), Point3f::fill(1.0)),
            PointN([-1.0, 0.5, 1.0])
        );
    }

    #[test]
    fn negative_zero_normalizes_to_same_bits() {
        let a = PointN([-0.0, 1.0, 0.0]);
        let b = PointN([0.0, 1.0, -0.0]);

        assert_eq!(a, b);
        assert_ne!(a.to_bits(), b.to_bits());
        assert_eq!(a.normalize_zero_sign().to_bits(), b.normalize_zero_sign().to_bits());
    }

    #[test]
    fn distance_is_euclidean() {
        let a = PointN([1.0, 2.0, 2.0]);

        assert_eq!(a.l2_distance_squared(&Point3f::ZERO), 9.0);
        assert_eq!(a.l2_distance(&Point3f::ZERO), 3.0);
    }

    #[cfg(feature = "glam")]
    #[test]
    fn glam_round_trip_preserves_components() {
        let p = PointN([1.0, -2.0, 3.5]);
        let v: glam::Vec3 = p.into();

        assert_eq!(Point3f::from(v), p);
    }
}
