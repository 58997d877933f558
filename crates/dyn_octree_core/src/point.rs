use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use num::Zero;
use serde::{Deserialize, Serialize};

/// An N-dimensional point, which is usually just a primitive array of type `N`. The octree only
/// needs `N = [f32; 3]`, so that's where all of the useful implementations live.
///
/// ```
/// use dyn_octree_core::prelude::*;
///
/// let p1 = PointN([1.0, 2.0, 3.0]);
/// let p2 = PointN([3.0, 4.0, 5.0]);
///
/// assert_eq!(p1 + p2, PointN([4.0, 6.0, 8.0]));
/// assert_eq!(p2 - p1, Point3f::fill(2.0));
/// assert_eq!(p1 * 2.0, PointN([2.0, 4.0, 6.0]));
/// ```
///
/// Like any other float vector, equality is component-wise float equality, so `-0.0 == 0.0` and
/// `NaN != NaN`.
#[derive(Copy, Clone, Debug, Deserialize, Default, Eq, Hash, PartialEq, Serialize)]
pub struct PointN<N>(pub N);

/// A trait that bundles op traits that all `PointN<N>` (and its components) should have.
pub trait Point:
    Add<Output = Self>
    + Bounded
    + Copy
    + Div<<Self as Point>::Scalar, Output = Self>
    + Mul<<Self as Point>::Scalar, Output = Self>
    + Mul<Self, Output = Self>
    + Ones
    + Sized
    + Sub<Output = Self>
    + Neg
    + Zero
{
    type Scalar: Copy;

    /// A point with every component set to `value`.
    fn fill(value: Self::Scalar) -> Self;

    /// Returns the component specified by index. I.e. X = 0, Y = 1, Z = 2.
    fn at(&self, component_index: usize) -> Self::Scalar;

    /// Returns a point where each component is the absolute value of the input component.
    fn abs(&self) -> Self;

    /// Returns the point after applying `f` component-wise.
    fn map_components(&self, f: impl Fn(Self::Scalar) -> Self::Scalar) -> Self;

    /// Returns the point after applying `f` to each pair of corresponding components.
    fn zip_map_components(
        &self,
        other: &Self,
        f: impl Fn(Self::Scalar, Self::Scalar) -> Self::Scalar,
    ) -> Self;

    /// Component-wise maximum.
    fn join(&self, other: &Self) -> Self;

    /// Component-wise minimum.
    fn meet(&self, other: &Self) -> Self;

    fn min_component(&self) -> Self::Scalar;

    fn max_component(&self) -> Self::Scalar;
}

impl<N> Neg for PointN<N>
where
    N: Copy,
    PointN<N>: Sub<Output = Self> + Zero,
{
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::zero() - self
    }
}

impl<N> AddAssign for PointN<N>
where
    N: Copy,
    PointN<N>: Add<Output = Self>,
{
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<N> SubAssign for PointN<N>
where
    N: Copy,
    PointN<N>: Sub<Output = Self>,
{
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<N> Zero for PointN<N>
where
    Self: Point + SmallZero + PartialEq,
{
    fn zero() -> Self {
        Self::ZERO
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

pub trait Ones: Copy {
    /// A point of all ones.
    const ONES: Self;
}

pub trait Distance: Point {
    /// The square of the L2 (Euclidean) distance between points.
    fn l2_distance_squared(&self, other: &Self) -> Self::Scalar;

    /// The L2 (Euclidean) distance between points.
    fn l2_distance(&self, other: &Self) -> Self::Scalar;
}

pub trait DotProduct {
    type Scalar: Copy;

    /// The vector dot product.
    fn dot(&self, other: &Self) -> Self::Scalar;
}

pub trait NormSquared {
    fn norm_squared(&self) -> f32;
}

pub trait Norm {
    fn norm(&self) -> f32;
}

impl<T> Norm for T
where
    T: NormSquared,
{
    fn norm(&self) -> f32 {
        self.norm_squared().sqrt()
    }
}

// `Zero` trait doesn't allow associated constants for zero because of bignums.
pub trait SmallZero: Copy {
    const ZERO: Self;
}

// `One` trait doesn't allow associated constants for one because of bignums.
pub trait SmallOne: Copy {
    const ONE: Self;
}

impl SmallZero for f32 {
    const ZERO: f32 = 0.0;
}
impl SmallOne for f32 {
    const ONE: f32 = 1.0;
}

pub trait Bounded: Copy {
    const MIN: Self;
    const MAX: Self;
}

impl Bounded for f32 {
    const MIN: Self = f32::MIN;
    const MAX: Self = f32::MAX;
}
