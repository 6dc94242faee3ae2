//! Length units
//!
//! Layout coordinates are pixels. Baseplates and shapes remember the unit the
//! user sized them in so the editor can show dimensions in that unit. Each
//! unit maps to a fixed pixel ratio.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::UNIT_EPSILON;

/// Unit a baseplate or shape is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Studs,
    Centimeters,
    Millimeters,
    Feet,
    Inches,
}

impl LengthUnit {
    /// Units in the order unit inference tries them.
    pub const PRIORITY: [LengthUnit; 5] = [
        LengthUnit::Studs,
        LengthUnit::Centimeters,
        LengthUnit::Millimeters,
        LengthUnit::Feet,
        LengthUnit::Inches,
    ];

    /// Pixels per one unit.
    pub fn pixels_per_unit(self) -> f64 {
        match self {
            Self::Studs => 16.0,
            Self::Centimeters => 20.0,
            Self::Millimeters => 2.0,
            Self::Feet => 614.4,
            Self::Inches => 51.2,
        }
    }

    pub fn to_pixels(self, value: f64) -> f64 {
        value * self.pixels_per_unit()
    }

    pub fn from_pixels(self, pixels: f64) -> f64 {
        pixels / self.pixels_per_unit()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Studs => "studs",
            Self::Centimeters => "centimeters",
            Self::Millimeters => "millimeters",
            Self::Feet => "feet",
            Self::Inches => "inches",
        }
    }

    /// Finds the first unit (in [`PRIORITY`](Self::PRIORITY) order) whose
    /// pixel ratio divides both dimensions.
    pub fn infer(width: f64, height: f64) -> Option<LengthUnit> {
        Self::PRIORITY.into_iter().find(|unit| {
            let ratio = unit.pixels_per_unit();
            is_multiple_of(width, ratio) && is_multiple_of(height, ratio)
        })
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "studs" | "stud" => Ok(Self::Studs),
            "centimeters" | "cm" => Ok(Self::Centimeters),
            "millimeters" | "mm" => Ok(Self::Millimeters),
            "feet" | "ft" => Ok(Self::Feet),
            "inches" | "in" => Ok(Self::Inches),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}

/// Epsilon-tolerant test that `value` is an integer multiple of `ratio`.
pub fn is_multiple_of(value: f64, ratio: f64) -> bool {
    if !value.is_finite() || ratio <= 0.0 {
        return false;
    }
    let quotient = value / ratio;
    (quotient - quotient.round()).abs() <= UNIT_EPSILON * quotient.abs().max(1.0)
}

/// Format a pixel length for display in the given unit.
pub fn format_length(pixels: f64, unit: LengthUnit) -> String {
    let value = unit.from_pixels(pixels);
    if (value - value.round()).abs() < UNIT_EPSILON {
        format!("{} {}", value.round(), unit)
    } else {
        format!("{:.2} {}", value, unit)
    }
}
