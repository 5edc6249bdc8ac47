//! Model Predictive Path Integral (MPPI) local controller.
//!
//! Every control tick, the optimizer samples a batch of Gaussian control
//! perturbations around a warm-started nominal sequence, rolls them through
//! the configured kinematic model, scores the resulting trajectories with a
//! chain of cost critics, and refreshes the nominal sequence with an
//! information-theoretic softmax reweighting. The head of the refreshed
//! sequence is the command.
//!
//! # Architecture
//!
//! - [`state`] - Dense `(batch, time_steps, dim)` sampler state and the
//!   warm-started nominal [`state::ControlSequence`]
//! - [`motion`] - DiffDrive / Omni / Ackermann kinematics
//! - [`noise`] - Seedable Gaussian perturbation sampling
//! - [`trajectory`] - Forward-Euler rollout into world poses
//! - [`critics`] - Trajectory scoring objectives
//! - [`manager`] - Ordered critic evaluation with goal short-circuiting
//! - [`optimizer`] - The tick loop: sample, score, reweight, emit
//!
//! # Example
//!
//! ```
//! use control_mppi::Optimizer;
//! use control_types::{
//!     ControllerConfig, Costmap, Path, Pose, PoseStamped, SimpleGoalChecker, Twist,
//! };
//!
//! let mut config = ControllerConfig::default();
//! config.seed = Some(42);
//! let mut optimizer = Optimizer::new(&config).unwrap();
//!
//! let pose = PoseStamped::new(Pose::default(), "odom", 0.0);
//! let plan = Path::from_poses(
//!     &[
//!         Pose::new(0.0, 0.0, 0.0),
//!         Pose::new(1.0, 0.0, 0.0),
//!         Pose::new(2.0, 0.0, 0.0),
//!     ],
//!     0.0,
//! );
//! let costmap = Costmap::new(200, 200, 0.1, -10.0, -10.0, "odom");
//!
//! let command = optimizer
//!     .eval_control(
//!         &pose,
//!         &Twist::zero(),
//!         &plan,
//!         &costmap,
//!         &SimpleGoalChecker::default(),
//!     )
//!     .unwrap();
//!
//! assert!(command.twist.vx.abs() <= 0.5);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,  // Many methods can't be const due to ndarray
    clippy::cast_precision_loss,   // usize to f64 is fine for batch statistics
    clippy::missing_errors_doc     // Error docs added where non-obvious
)]

pub mod critics;
pub mod manager;
pub mod motion;
pub mod noise;
pub mod optimizer;
pub mod state;
pub mod trajectory;
pub mod utils;

pub use manager::CriticManager;
pub use motion::MotionModel;
pub use noise::NoiseGenerator;
pub use optimizer::{Optimizer, OptimizerSettings};
pub use state::{ControlSequence, State, StateLayout};
pub use trajectory::{Trajectories, TrajectoryIntegrator};
