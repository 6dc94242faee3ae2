//! Position and orientation of placed pieces and connectors.
//!
//! Poses are stored at single-precision resolution: every coordinate that
//! leaves this module has been through [`fround`], so layout logic and the
//! renderer (which works in `f32`) agree bit-for-bit on where things are.
//! Angles are kept in `[0, 2π)`.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

use crate::constants::POSE_EPSILON;

/// Rounds a value to the nearest representable `f32`.
#[inline]
pub fn fround(value: f64) -> f64 {
    (value as f32) as f64
}

/// Normalizes an angle into `[0, 2π)` and quantizes it.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can return TAU itself for tiny negative inputs
    let quantized = if wrapped >= TAU { 0.0 } else { fround(wrapped) };
    if quantized >= fround(TAU) {
        0.0
    } else {
        quantized
    }
}

/// A 2D point, used for pivots and centroids.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Position plus rotation angle (radians).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl Pose {
    /// Creates a quantized, normalized pose.
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        Self {
            x: fround(x),
            y: fround(y),
            angle: normalize_angle(angle),
        }
    }

    /// The identity pose at the origin.
    pub fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns this pose re-quantized (useful after deserializing raw data).
    pub fn quantized(&self) -> Self {
        Self::new(self.x, self.y, self.angle)
    }

    /// Composes a local pose expressed in this pose's frame into world space.
    pub fn compose(&self, local: &Pose) -> Pose {
        let (s, c) = self.angle.sin_cos();
        Pose::new(
            self.x + local.x * c - local.y * s,
            self.y + local.x * s + local.y * c,
            self.angle + local.angle,
        )
    }

    /// The pose that undoes this one: `p.compose(&p.inverse())` is the origin.
    pub fn inverse(&self) -> Pose {
        let (s, c) = self.angle.sin_cos();
        Pose::new(
            -(self.x * c + self.y * s),
            self.x * s - self.y * c,
            -self.angle,
        )
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Pose {
        Pose::new(self.x + dx, self.y + dy, self.angle)
    }

    pub fn with_angle(&self, angle: f64) -> Pose {
        Pose::new(self.x, self.y, angle)
    }

    /// Rotates the pose about a pivot, turning its heading by the same angle.
    pub fn rotate_around(&self, pivot: Point, angle: f64) -> Pose {
        let (s, c) = angle.sin_cos();
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        Pose::new(
            pivot.x + dx * c - dy * s,
            pivot.y + dx * s + dy * c,
            self.angle + angle,
        )
    }

    pub fn distance_to(&self, other: &Pose) -> f64 {
        self.position().distance_to(&other.position())
    }

    /// True when the Euclidean distance to `other` is at most `radius`.
    pub fn is_in_radius(&self, other: &Pose, radius: f64) -> bool {
        self.distance_to(other) <= radius
    }

    /// True when the two headings differ by π within `tolerance`.
    pub fn has_opposite_angle(&self, other: &Pose, tolerance: f64) -> bool {
        let diff = (self.angle - other.angle).rem_euclid(TAU);
        (diff - PI).abs() <= tolerance
    }

    /// Tolerant equality on position and heading.
    pub fn approx_eq(&self, other: &Pose, tolerance: f64) -> bool {
        let diff = (self.angle - other.angle).rem_euclid(TAU);
        let angle_close = diff <= tolerance || TAU - diff <= tolerance;
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance && angle_close
    }

    /// [`approx_eq`](Self::approx_eq) with the default pose epsilon.
    pub fn near(&self, other: &Pose) -> bool {
        self.approx_eq(other, POSE_EPSILON)
    }
}
