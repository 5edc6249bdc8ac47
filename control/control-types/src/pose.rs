//! Planar pose and velocity types.
//!
//! The controller works in SE(2): a pose is `(x, y, yaw)` and a velocity is a
//! body-frame twist `(vx, vy, wz)`. Stamped variants carry the frame id and
//! timestamp the navigation host attaches to its messages.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Planar pose: position and heading in the world frame.
///
/// # Example
///
/// ```
/// use control_types::Pose;
///
/// let a = Pose::new(0.0, 0.0, 0.0);
/// let b = Pose::new(3.0, 4.0, 0.0);
/// assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// X position in meters.
    pub x: f64,
    /// Y position in meters.
    pub y: f64,
    /// Heading in radians, counter-clockwise from +X.
    pub yaw: f64,
}

impl Pose {
    /// Create a pose from position and heading.
    #[must_use]
    pub const fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    /// The position as a point, dropping the heading.
    #[must_use]
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Euclidean distance to another pose.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.position() - other.position()).norm()
    }
}

/// A pose stamped with its frame and acquisition time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseStamped {
    /// The pose itself.
    pub pose: Pose,
    /// Frame the pose is expressed in.
    pub frame_id: String,
    /// Acquisition time in seconds.
    pub stamp: f64,
}

impl PoseStamped {
    /// Create a stamped pose.
    #[must_use]
    pub fn new(pose: Pose, frame_id: impl Into<String>, stamp: f64) -> Self {
        Self {
            pose,
            frame_id: frame_id.into(),
            stamp,
        }
    }
}

/// Body-frame velocity: linear `(vx, vy)` and angular `wz`.
///
/// `vy` is only meaningful for holonomic platforms; differential-drive and
/// Ackermann robots report it as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Twist {
    /// Forward velocity in m/s.
    pub vx: f64,
    /// Lateral velocity in m/s.
    pub vy: f64,
    /// Angular velocity in rad/s.
    pub wz: f64,
}

impl Twist {
    /// Create a twist from its components.
    #[must_use]
    pub const fn new(vx: f64, vy: f64, wz: f64) -> Self {
        Self { vx, vy, wz }
    }

    /// The zero twist.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// A commanded twist stamped with the frame and time it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwistStamped {
    /// The commanded velocity.
    pub twist: Twist,
    /// Frame the command is expressed in.
    pub frame_id: String,
    /// Command time in seconds.
    pub stamp: f64,
}

impl TwistStamped {
    /// Create a stamped twist.
    #[must_use]
    pub fn new(twist: Twist, frame_id: impl Into<String>, stamp: f64) -> Self {
        Self {
            twist,
            frame_id: frame_id.into(),
            stamp,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pose_distance() {
        let a = Pose::new(1.0, 2.0, 0.5);
        let b = Pose::new(4.0, 6.0, -0.5);
        assert_relative_eq!(a.distance_to(&b), 5.0, epsilon = 1e-12);
        assert_relative_eq!(b.distance_to(&a), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn twist_zero() {
        let t = Twist::zero();
        assert_eq!(t.vx, 0.0);
        assert_eq!(t.vy, 0.0);
        assert_eq!(t.wz, 0.0);
    }

    #[test]
    fn stamped_carries_frame() {
        let ts = TwistStamped::new(Twist::new(0.5, 0.0, 0.1), "base_link", 12.5);
        assert_eq!(ts.frame_id, "base_link");
        assert_eq!(ts.stamp, 12.5);
    }
}
