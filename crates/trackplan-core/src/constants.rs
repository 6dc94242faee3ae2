//! Shared constants.

use std::f64::consts::FRAC_PI_4;

/// Current layout file format version.
pub const LAYOUT_FORMAT_VERSION: u64 = 2;

/// Fixed rotation increment for pieces (one eighth of a turn).
pub const ROTATION_STEP: f64 = FRAC_PI_4;

/// Maximum distance between two connectors for them to dock.
pub const CONNECT_RADIUS: f64 = 1.0;

/// Tolerance (radians) when testing whether two connectors face each other.
pub const OPPOSITE_ANGLE_TOLERANCE: f64 = 0.01;

/// Tolerance used when comparing quantized coordinates.
pub const POSE_EPSILON: f64 = 1e-4;

/// Relative tolerance for the multiple-of test used by unit inference.
pub const UNIT_EPSILON: f64 = 1e-6;

/// Screen-space distance a drag must travel before it counts as a move.
pub const DRAG_THRESHOLD: f64 = 3.0;
