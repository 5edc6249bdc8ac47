//! Goal proximity critics.
//!
//! Both critics only engage once the robot is inside the goal checker's
//! position tolerance of the plan's final pose. They are the goal detectors:
//! each sets `goal_reached` so the manager can short-circuit the path
//! critics, and both keep running after that flag is set.

use control_types::{GoalAngleCriticConfig, GoalCriticConfig};

use crate::critics::{weighted_cost, CriticData, CriticFunction};
use crate::utils;

/// Pulls trajectory endpoints onto the goal position.
#[derive(Debug, Clone, Copy)]
pub struct GoalCritic {
    config: GoalCriticConfig,
}

impl GoalCritic {
    /// Build from config.
    #[must_use]
    pub const fn new(config: GoalCriticConfig) -> Self {
        Self { config }
    }
}

impl CriticFunction for GoalCritic {
    fn name(&self) -> &'static str {
        "Goal"
    }

    fn enabled_after_goal(&self) -> bool {
        true
    }

    fn score(&self, data: &mut CriticData<'_>) {
        let Some(goal) = data.path.goal() else {
            return;
        };
        if !utils::within_goal_checker_tolerance(data.goal_checker, data.pose, data.path) {
            return;
        }

        data.goal_reached = true;

        let last = data.trajectories.time_steps() - 1;
        for b in 0..data.trajectories.batch_size() {
            let dx = data.trajectories.data[[b, last, 0]] - goal.x;
            let dy = data.trajectories.data[[b, last, 1]] - goal.y;
            let dist = (dx * dx + dy * dy).sqrt();
            data.costs[b] += weighted_cost(dist, self.config.weight, self.config.power);
        }
    }
}

/// Aligns trajectory headings with the goal heading near the goal.
#[derive(Debug, Clone, Copy)]
pub struct GoalAngleCritic {
    config: GoalAngleCriticConfig,
}

impl GoalAngleCritic {
    /// Build from config.
    #[must_use]
    pub const fn new(config: GoalAngleCriticConfig) -> Self {
        Self { config }
    }
}

impl CriticFunction for GoalAngleCritic {
    fn name(&self) -> &'static str {
        "GoalAngle"
    }

    fn enabled_after_goal(&self) -> bool {
        true
    }

    fn score(&self, data: &mut CriticData<'_>) {
        let Some(goal) = data.path.goal() else {
            return;
        };
        if !utils::within_goal_checker_tolerance(data.goal_checker, data.pose, data.path) {
            return;
        }

        data.goal_reached = true;

        let steps = data.trajectories.time_steps();
        for b in 0..data.trajectories.batch_size() {
            let mut sum = 0.0;
            for t in 0..steps {
                let yaw = data.trajectories.data[[b, t, 2]];
                sum += utils::shortest_angular_distance(yaw, goal.yaw).abs();
            }
            let mean = sum / steps as f64;
            data.costs[b] += weighted_cost(mean, self.config.weight, self.config.power);
        }
    }
}
