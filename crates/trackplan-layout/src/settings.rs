//! Editor behaviour that affects layout edits.

use serde::{Deserialize, Serialize};
use trackplan_core::constants::DRAG_THRESHOLD;
use trackplan_core::{fround, Pose};

/// Placement and drag settings of a layout session.
///
/// Stored in the `config` object of a layout document, so a layout reopens
/// with the grid it was drawn on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSettings {
    /// Grid size in pixels; `0` disables snapping.
    pub snap_size: f64,
    /// Link matching connectors when pieces are placed or dropped.
    pub auto_connect: bool,
    /// Where a piece lands when nothing is selected.
    pub origin_x: f64,
    pub origin_y: f64,
    /// Minimum drag distance before a drag moves anything.
    pub drag_threshold: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            snap_size: 0.0,
            auto_connect: true,
            origin_x: 0.0,
            origin_y: 0.0,
            drag_threshold: DRAG_THRESHOLD,
        }
    }
}

impl EditorSettings {
    pub fn origin(&self) -> Pose {
        Pose::new(self.origin_x, self.origin_y, 0.0)
    }

    /// Rounds both axes of an already quantized pose to the grid.
    pub fn snap(&self, pose: Pose) -> Pose {
        if self.snap_size <= 0.0 {
            return pose;
        }
        let snap = |v: f64| (fround(v) / self.snap_size).round() * self.snap_size;
        Pose::new(snap(pose.x), snap(pose.y), pose.angle)
    }
}
