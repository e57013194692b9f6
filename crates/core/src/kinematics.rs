/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! The vector currency of the steering layer.
//!
//! Agents move on the ground plane, so positions and velocities are
//! two-component vectors over world x/z. `GroundVec2` is a small immutable
//! value type for exactly that; conversions to and from Bevy's math types are
//! provided so host code can stay in ecosystem math at the boundary.
//!
//! `SteeringOutput` is what behaviors produce and pipelines blend: a linear
//! ground-plane component plus an optional angular scalar (rotation rate
//! around the world up axis). The zero output is the identity for blending.

use bevy::math::{Vec2, Vec3};
use bevy::reflect::Reflect;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A 2D vector on the ground plane (world x/z).
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct GroundVec2 {
    pub x: f32,
    pub z: f32,
}

impl GroundVec2 {
    pub const ZERO: Self = Self { x: 0., z: 0. };

    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Unit vector pointing at `radians` (measured from +x toward +z).
    pub fn from_angle(radians: f32) -> Self {
        Self::new(radians.cos(), radians.sin())
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.z * self.z
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.z * other.z
    }

    /// Unit-length copy of this vector, or zero if it is too short to
    /// normalize meaningfully.
    pub fn normalized_or_zero(self) -> Self {
        let len = self.length();
        match len > f32::EPSILON {
            true => self * (1. / len),
            false => Self::ZERO,
        }
    }

    /// Caps the magnitude at `max`.
    ///
    /// A vector longer than `max` is rescaled to exactly `max`; anything
    /// shorter passes through unchanged. A non-positive `max` caps
    /// everything down to zero.
    pub fn limit(self, max: f32) -> Self {
        if max <= 0. {
            return Self::ZERO;
        }
        let len_sq = self.length_squared();
        match len_sq > max * max {
            true => self * (max / len_sq.sqrt()),
            false => self,
        }
    }

    /// Lifts the ground-plane vector into world space at the given height.
    pub fn to_world(self, height: f32) -> Vec3 {
        Vec3::new(self.x, height, self.z)
    }
}

impl Add for GroundVec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.z + rhs.z)
    }
}

impl AddAssign for GroundVec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.z += rhs.z;
    }
}

impl Sub for GroundVec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.z - rhs.z)
    }
}

impl Neg for GroundVec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.z)
    }
}

impl Mul<f32> for GroundVec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.z * rhs)
    }
}

// Bridges to Bevy math; y carries the ground-plane z.
impl From<GroundVec2> for Vec2 {
    fn from(value: GroundVec2) -> Self {
        Vec2::new(value.x, value.z)
    }
}

impl From<Vec2> for GroundVec2 {
    fn from(value: Vec2) -> Self {
        GroundVec2::new(value.x, value.y)
    }
}

/// One steering contribution, or a blend of several.
///
/// Not `Copy` on purpose: outputs are the pooled currency of the pipeline
/// and we want handing one around to be an explicit move or clone.
#[derive(Reflect, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct SteeringOutput {
    /// Desired velocity contribution on the ground plane.
    pub linear: GroundVec2,
    /// Desired rotation rate around the world up axis, radians per tick.
    pub angular: f32,
}

impl SteeringOutput {
    pub fn new(linear: GroundVec2, angular: f32) -> Self {
        Self { linear, angular }
    }

    /// Restores the reusable zero baseline.
    pub fn clear(&mut self) {
        self.linear = GroundVec2::ZERO;
        self.angular = 0.;
    }

    pub fn is_zero(&self) -> bool {
        self.linear == GroundVec2::ZERO && self.angular == 0.
    }

    /// Accumulates `other` scaled by `weight` into this output.
    pub fn add_weighted(&mut self, other: &Self, weight: f32) {
        self.linear += other.linear * weight;
        self.angular += other.angular * weight;
    }
}
