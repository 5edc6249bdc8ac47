//! Controller configuration.
//!
//! All settings are immutable during a tick. The host reconfigures the
//! optimizer explicitly between ticks; there is no hidden parameter system.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ControlError;

/// Sentinel passed to `set_speed_limit` to restore the base constraints.
pub const NO_SPEED_LIMIT: f64 = 0.0;

/// Kinematic model families the optimizer can roll out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionModelKind {
    /// Differential drive: `(vx, wz)` controls, no lateral motion.
    DiffDrive,
    /// Omnidirectional: `(vx, vy, wz)` controls.
    Omni,
    /// Car-like: `(vx, wz)` controls bounded by a minimum turning radius.
    Ackermann,
}

impl MotionModelKind {
    /// Whether the model permits an independent lateral velocity.
    #[must_use]
    pub const fn is_holonomic(self) -> bool {
        matches!(self, Self::Omni)
    }
}

impl FromStr for MotionModelKind {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DiffDrive" => Ok(Self::DiffDrive),
            "Omni" => Ok(Self::Omni),
            "Ackermann" => Ok(Self::Ackermann),
            other => Err(ControlError::unknown_motion_model(other)),
        }
    }
}

/// Velocity bounds applied to sampled controls, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityConstraints {
    /// Forward velocity bound in m/s.
    pub vx: f64,
    /// Lateral velocity bound in m/s (holonomic models only).
    pub vy: f64,
    /// Angular velocity bound in rad/s.
    pub wz: f64,
}

impl Default for VelocityConstraints {
    fn default() -> Self {
        Self {
            vx: 0.5,
            vy: 0.5,
            wz: 1.3,
        }
    }
}

/// Standard deviations of the Gaussian control perturbations, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingStd {
    /// Forward velocity noise in m/s.
    pub vx: f64,
    /// Lateral velocity noise in m/s (holonomic models only).
    pub vy: f64,
    /// Angular velocity noise in rad/s.
    pub wz: f64,
}

impl Default for SamplingStd {
    fn default() -> Self {
        Self {
            vx: 0.2,
            vy: 0.2,
            wz: 1.0,
        }
    }
}

/// Configuration for the goal-distance critic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalCriticConfig {
    /// Whether the critic contributes at all.
    pub enabled: bool,
    /// Cost weight.
    pub weight: f64,
    /// Cost power.
    pub power: u32,
}

impl Default for GoalCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 5.0,
            power: 1,
        }
    }
}

/// Configuration for the goal-heading critic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalAngleCriticConfig {
    /// Whether the critic contributes at all.
    pub enabled: bool,
    /// Cost weight.
    pub weight: f64,
    /// Cost power.
    pub power: u32,
}

impl Default for GoalAngleCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 3.0,
            power: 1,
        }
    }
}

/// Configuration for the obstacle critic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstaclesCriticConfig {
    /// Whether the critic contributes at all.
    pub enabled: bool,
    /// Cost weight.
    pub weight: f64,
    /// Cost power.
    pub power: u32,
    /// Cost assigned to a trajectory that touches a lethal cell.
    pub collision_cost: f64,
}

impl Default for ObstaclesCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 1.25,
            power: 1,
            collision_cost: 2000.0,
        }
    }
}

/// Configuration for the path-alignment critic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathAlignCriticConfig {
    /// Whether the critic contributes at all.
    pub enabled: bool,
    /// Cost weight.
    pub weight: f64,
    /// Cost power.
    pub power: u32,
    /// Skip alignment when the robot is within this distance of the goal.
    pub threshold_to_consider: f64,
    /// Skip alignment until the furthest reached path point passes this index.
    pub offset_from_furthest: usize,
    /// Evaluate every N-th trajectory point.
    pub trajectory_point_step: usize,
}

impl Default for PathAlignCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 1.0,
            power: 1,
            threshold_to_consider: 0.40,
            offset_from_furthest: 20,
            trajectory_point_step: 5,
        }
    }
}

/// Configuration for the path-follow critic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathFollowCriticConfig {
    /// Whether the critic contributes at all.
    pub enabled: bool,
    /// Cost weight.
    pub weight: f64,
    /// Cost power.
    pub power: u32,
    /// Stop pulling forward once this fraction of the path is reached.
    pub max_path_ratio: f64,
    /// Target the path point this many indices past the furthest reached one.
    pub offset_from_furthest: usize,
}

impl Default for PathFollowCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 3.0,
            power: 1,
            max_path_ratio: 0.40,
            offset_from_furthest: 10,
        }
    }
}

/// Configuration for the path-heading critic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathAngleCriticConfig {
    /// Whether the critic contributes at all.
    pub enabled: bool,
    /// Cost weight.
    pub weight: f64,
    /// Cost power.
    pub power: u32,
    /// Skip when the robot is within this distance of the goal.
    pub threshold_to_consider: f64,
    /// Target the path point this many indices past the furthest reached one.
    pub offset_from_furthest: usize,
    /// Only penalize when the bearing to the target exceeds this angle.
    pub max_angle_to_furthest: f64,
}

impl Default for PathAngleCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 2.0,
            power: 1,
            threshold_to_consider: 0.40,
            offset_from_furthest: 4,
            max_angle_to_furthest: 1.2,
        }
    }
}

/// Configuration for the forward-motion critic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreferForwardCriticConfig {
    /// Whether the critic contributes at all.
    pub enabled: bool,
    /// Cost weight.
    pub weight: f64,
    /// Cost power.
    pub power: u32,
    /// Skip when the robot is within this distance of the goal.
    pub threshold_to_consider: f64,
}

impl Default for PreferForwardCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 3.0,
            power: 1,
            threshold_to_consider: 0.40,
        }
    }
}

/// Configuration for the spin-suppression critic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwirlingCriticConfig {
    /// Whether the critic contributes at all.
    pub enabled: bool,
    /// Cost weight.
    pub weight: f64,
    /// Cost power.
    pub power: u32,
}

impl Default for TwirlingCriticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 10.0,
            power: 1,
        }
    }
}

/// Critic selection, ordering, and per-critic settings.
///
/// `critics` lists critic names in evaluation order; goal-detector critics go
/// first so their short-circuit flag is visible to the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticsConfig {
    /// Critic names in evaluation order.
    pub critics: Vec<String>,
    /// Goal-distance critic settings.
    pub goal: GoalCriticConfig,
    /// Goal-heading critic settings.
    pub goal_angle: GoalAngleCriticConfig,
    /// Obstacle critic settings.
    pub obstacles: ObstaclesCriticConfig,
    /// Path-alignment critic settings.
    pub path_align: PathAlignCriticConfig,
    /// Path-follow critic settings.
    pub path_follow: PathFollowCriticConfig,
    /// Path-heading critic settings.
    pub path_angle: PathAngleCriticConfig,
    /// Forward-motion critic settings.
    pub prefer_forward: PreferForwardCriticConfig,
    /// Spin-suppression critic settings.
    pub twirling: TwirlingCriticConfig,
}

impl Default for CriticsConfig {
    fn default() -> Self {
        Self {
            critics: [
                "Goal",
                "GoalAngle",
                "Obstacles",
                "PathAlign",
                "PathFollow",
                "PathAngle",
                "PreferForward",
                "Twirling",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            goal: GoalCriticConfig::default(),
            goal_angle: GoalAngleCriticConfig::default(),
            obstacles: ObstaclesCriticConfig::default(),
            path_align: PathAlignCriticConfig::default(),
            path_follow: PathFollowCriticConfig::default(),
            path_angle: PathAngleCriticConfig::default(),
            prefer_forward: PreferForwardCriticConfig::default(),
            twirling: TwirlingCriticConfig::default(),
        }
    }
}

/// Full optimizer configuration.
///
/// # Example
///
/// ```
/// use control_types::ControllerConfig;
///
/// let config = ControllerConfig::default();
/// assert_eq!(config.batch_size, 400);
/// assert_eq!(config.time_steps, 15);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Model timestep in seconds.
    pub model_dt: f64,
    /// Planning horizon in timesteps.
    pub time_steps: usize,
    /// Number of sampled trajectories per iteration.
    pub batch_size: usize,
    /// Optimization iterations per tick.
    pub iteration_count: usize,
    /// Softmax temperature; smaller is greedier.
    pub temperature: f64,
    /// Retries permitted after a failed optimization before giving up.
    pub retry_attempt_limit: usize,
    /// Host controller frequency in Hz; decides control-sequence shifting.
    pub controller_frequency: f64,
    /// Motion model name: `DiffDrive`, `Omni`, or `Ackermann`.
    pub motion_model: String,
    /// Minimum turning radius for the Ackermann model, in meters.
    pub ackermann_min_turning_radius: f64,
    /// Base velocity bounds before any speed limit is applied.
    pub base_constraints: VelocityConstraints,
    /// Control perturbation standard deviations.
    pub sampling_std: SamplingStd,
    /// Random seed for reproducibility.
    pub seed: Option<u64>,
    /// Critic selection and settings.
    pub critics: CriticsConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            model_dt: 0.1,
            time_steps: 15,
            batch_size: 400,
            iteration_count: 1,
            temperature: 0.25,
            retry_attempt_limit: 1,
            controller_frequency: 10.0,
            motion_model: "DiffDrive".to_string(),
            ackermann_min_turning_radius: 0.2,
            base_constraints: VelocityConstraints::default(),
            sampling_std: SamplingStd::default(),
            seed: None,
            critics: CriticsConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Check the configuration for values the optimizer cannot run with.
    pub fn validate(&self) -> Result<(), ControlError> {
        if !(self.model_dt.is_finite() && self.model_dt > 0.0) {
            return Err(ControlError::invalid_config("model_dt must be positive"));
        }
        if self.time_steps < 2 {
            return Err(ControlError::invalid_config("time_steps must be at least 2"));
        }
        if self.batch_size == 0 {
            return Err(ControlError::invalid_config("batch_size must be positive"));
        }
        if self.iteration_count == 0 {
            return Err(ControlError::invalid_config(
                "iteration_count must be positive",
            ));
        }
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(ControlError::invalid_config("temperature must be positive"));
        }
        if !(self.controller_frequency.is_finite() && self.controller_frequency > 0.0) {
            return Err(ControlError::invalid_config(
                "controller_frequency must be positive",
            ));
        }
        for (name, std) in [
            ("vx_std", self.sampling_std.vx),
            ("vy_std", self.sampling_std.vy),
            ("wz_std", self.sampling_std.wz),
        ] {
            if !(std.is_finite() && std > 0.0) {
                return Err(ControlError::invalid_config(format!(
                    "{name} must be positive"
                )));
            }
        }
        if self.ackermann_min_turning_radius <= 0.0 {
            return Err(ControlError::invalid_config(
                "ackermann_min_turning_radius must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model_dt, 0.1);
        assert_eq!(config.temperature, 0.25);
        assert_eq!(config.base_constraints.wz, 1.3);
        assert_eq!(config.sampling_std.wz, 1.0);
    }

    #[test]
    fn motion_model_parsing() {
        assert_eq!(
            "DiffDrive".parse::<MotionModelKind>().unwrap(),
            MotionModelKind::DiffDrive
        );
        assert_eq!(
            "Omni".parse::<MotionModelKind>().unwrap(),
            MotionModelKind::Omni
        );
        assert!("Omni".parse::<MotionModelKind>().unwrap().is_holonomic());
        assert!(!"Ackermann"
            .parse::<MotionModelKind>()
            .unwrap()
            .is_holonomic());

        let err = "Bicycle".parse::<MotionModelKind>().unwrap_err();
        assert!(matches!(err, ControlError::UnknownMotionModel { .. }));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = ControllerConfig::default();
        config.temperature = 0.0;
        assert!(config.validate().is_err());

        let mut config = ControllerConfig::default();
        config.time_steps = 1;
        assert!(config.validate().is_err());

        let mut config = ControllerConfig::default();
        config.sampling_std.vx = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn critic_order_defaults_put_goal_first() {
        let config = CriticsConfig::default();
        assert_eq!(config.critics[0], "Goal");
        assert_eq!(config.critics[1], "GoalAngle");
    }
}
