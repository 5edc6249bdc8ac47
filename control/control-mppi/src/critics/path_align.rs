//! Path alignment critic.

use control_types::PathAlignCriticConfig;

use crate::critics::{weighted_cost, CriticData, CriticFunction};
use crate::utils;

/// Keeps sampled trajectories close to the reference path.
///
/// Uses the approximate nearest-waypoint distance rather than segment
/// projection, which is accurate enough at short horizons and much cheaper.
/// Disengages near the goal (the goal critics take over there) and while the
/// batch has not yet progressed past `offset_from_furthest` waypoints, where
/// alignment would fight the recovery behaviors.
#[derive(Debug, Clone, Copy)]
pub struct PathAlignCritic {
    config: PathAlignCriticConfig,
}

impl PathAlignCritic {
    /// Build from config.
    #[must_use]
    pub const fn new(config: PathAlignCriticConfig) -> Self {
        Self { config }
    }
}

impl CriticFunction for PathAlignCritic {
    fn name(&self) -> &'static str {
        "PathAlign"
    }

    fn score(&self, data: &mut CriticData<'_>) {
        if data.path.len() < 2 {
            return;
        }
        if utils::within_position_goal_tolerance(
            self.config.threshold_to_consider,
            data.pose,
            data.path,
        ) {
            return;
        }
        if data.furthest_reached_path_point() < self.config.offset_from_furthest {
            return;
        }

        let step = self.config.trajectory_point_step.max(1);
        let batch = data.trajectories.batch_size();
        let steps = data.trajectories.time_steps();
        let evaluated = (step..steps).step_by(step).count().max(1);

        for b in 0..batch {
            let mut summed_dist = 0.0;

            for t in (step..steps).step_by(step) {
                let tx = data.trajectories.data[[b, t, 0]];
                let ty = data.trajectories.data[[b, t, 1]];

                let mut min_dist_sq = f64::INFINITY;
                for p in 0..data.path.len() {
                    let dx = data.path.x[p] - tx;
                    let dy = data.path.y[p] - ty;
                    min_dist_sq = min_dist_sq.min(dx * dx + dy * dy);
                }
                summed_dist += min_dist_sq.sqrt();
            }

            let mean = summed_dist / evaluated as f64;
            data.costs[b] += weighted_cost(mean, self.config.weight, self.config.power);
        }
    }
}
