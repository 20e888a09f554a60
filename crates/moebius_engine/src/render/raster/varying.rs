//! Values interpolated across a primitive
//!
//! Anything that forms a vector space over `f32` can be a varying. Structs of
//! several fields get the arithmetic through [`impl_varying!`].

use std::ops::{Add, Mul, Sub};

/// A per-vertex output the rasterizer interpolates
pub trait Varying: Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self> {
    /// Weighted sum of three values
    fn combine(a: Self, b: Self, c: Self, weights: [f32; 3]) -> Self {
        a * weights[0] + b * weights[1] + c * weights[2]
    }

    /// Linear interpolation from `a` (t = 0) to `b` (t = 1)
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a * (1.0 - t) + b * t
    }
}

impl Varying for f32 {}
impl Varying for crate::foundation::math::Vec2 {}
impl Varying for crate::foundation::math::Vec3 {}
impl Varying for crate::foundation::math::Vec4 {}

/// No interpolated data
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoVarying;

impl Add for NoVarying {
    type Output = Self;
    fn add(self, _: Self) -> Self {
        self
    }
}

impl Sub for NoVarying {
    type Output = Self;
    fn sub(self, _: Self) -> Self {
        self
    }
}

impl Mul<f32> for NoVarying {
    type Output = Self;
    fn mul(self, _: f32) -> Self {
        self
    }
}

impl Varying for NoVarying {}

/// Implement [`Varying`] for a struct whose fields are all varyings
#[macro_export]
macro_rules! impl_varying {
    ($name:ident { $($field:ident),+ $(,)? }) => {
        impl ::std::ops::Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self { $($field: self.$field + rhs.$field),+ }
            }
        }

        impl ::std::ops::Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self { $($field: self.$field - rhs.$field),+ }
            }
        }

        impl ::std::ops::Mul<f32> for $name {
            type Output = Self;
            fn mul(self, rhs: f32) -> Self {
                Self { $($field: self.$field * rhs),+ }
            }
        }

        impl $crate::render::raster::Varying for $name {}
    };
}
