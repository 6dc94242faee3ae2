//! Polar connector offsets.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use trackplan_core::Pose;

/// Fixed position of a connector relative to its piece's local origin.
///
/// The connector sits `magnitude` pixels away from the origin in direction
/// `angle` (piece frame) and faces outwards along `exit_angle`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorOffset {
    pub magnitude: f64,
    pub angle: f64,
    pub exit_angle: f64,
}

impl ConnectorOffset {
    pub fn new(magnitude: f64, angle: f64, exit_angle: f64) -> Self {
        Self {
            magnitude,
            angle,
            exit_angle,
        }
    }

    /// The connector pose in the owner's frame.
    pub fn local_pose(&self) -> Pose {
        let (s, c) = self.angle.sin_cos();
        Pose::new(self.magnitude * c, self.magnitude * s, self.exit_angle)
    }

    /// World pose of the connector for a piece at `owner`.
    pub fn world_pose(&self, owner: &Pose) -> Pose {
        owner.compose(&self.local_pose())
    }

    /// The owner pose that puts this connector exactly at `target`.
    pub fn owner_pose_for(&self, target: &Pose) -> Pose {
        let angle = target.angle - self.exit_angle;
        let (s, c) = (angle + self.angle).sin_cos();
        Pose::new(
            target.x - self.magnitude * c,
            target.y - self.magnitude * s,
            angle,
        )
    }

    /// The owner pose that docks this connector face-to-face with a partner
    /// connector at `partner`.
    pub fn docking_pose_for(&self, partner: &Pose) -> Pose {
        self.owner_pose_for(&Pose::new(partner.x, partner.y, partner.angle + PI))
    }
}
