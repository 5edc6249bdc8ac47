//! Core types for sampling-based robot motion control.
//!
//! This crate provides the foundational types for building local controllers:
//!
//! - [`Pose`] / [`Twist`] - Planar robot pose and body-frame velocity
//! - [`Path`] - A reference plan as dense coordinate arrays
//! - [`Costmap`] - Read-only occupancy cost grid queried at world coordinates
//! - [`GoalChecker`] - Host-supplied goal proximity predicate
//! - [`ControllerConfig`] - Optimizer and critic configuration
//! - [`ControlError`] - Error taxonomy shared by the controller stack
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They have no sampling, no optimization, no
//! scoring. They're the common language between:
//!
//! - The MPPI optimizer (control-mppi)
//! - The navigation host that supplies pose, velocity, plan, and costmap
//! - Visualization and logging tools
//!
//! # Coordinate System
//!
//! Planar, right-handed: X forward, Y left, yaw counter-clockwise from +X.
//! All distances in meters, angles in radians, velocities in the body frame.
//!
//! # Example
//!
//! ```
//! use control_types::{Path, Pose, Twist};
//!
//! let plan = Path::from_poses(
//!     &[
//!         Pose::new(0.0, 0.0, 0.0),
//!         Pose::new(1.0, 0.0, 0.0),
//!         Pose::new(2.0, 0.0, 0.0),
//!     ],
//!     0.0,
//! );
//!
//! assert_eq!(plan.len(), 3);
//! assert_eq!(plan.goal().unwrap().x, 2.0);
//! assert!(Twist::zero().vx.abs() < 1e-12);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,  // Many methods can't be const due to ndarray
    clippy::cast_precision_loss,   // usize to f64 is fine for grid indices
    clippy::missing_errors_doc     // Error docs added where non-obvious
)]

mod config;
mod costmap;
mod error;
mod goal;
mod path;
mod pose;

pub use config::{
    ControllerConfig, CriticsConfig, GoalAngleCriticConfig, GoalCriticConfig, MotionModelKind,
    ObstaclesCriticConfig, PathAlignCriticConfig, PathAngleCriticConfig, PathFollowCriticConfig,
    PreferForwardCriticConfig, SamplingStd, TwirlingCriticConfig, VelocityConstraints,
    NO_SPEED_LIMIT,
};
pub use costmap::{
    Costmap, FREE_SPACE, INSCRIBED_INFLATED_OBSTACLE, LETHAL_OBSTACLE, MAX_NON_LETHAL,
    NO_INFORMATION,
};
pub use error::ControlError;
pub use goal::{GoalChecker, SimpleGoalChecker};
pub use path::Path;
pub use pose::{Pose, PoseStamped, Twist, TwistStamped};

/// Result type for control operations.
pub type Result<T> = std::result::Result<T, ControlError>;
