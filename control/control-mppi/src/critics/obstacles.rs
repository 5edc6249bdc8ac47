//! Obstacle avoidance critic.

use control_types::{Costmap, ObstaclesCriticConfig, MAX_NON_LETHAL};

use crate::critics::{weighted_cost, CriticData, CriticFunction};

/// Penalizes trajectories by the occupancy cost they sweep through.
///
/// A trajectory touching any lethal cell is charged the flat collision cost;
/// otherwise the normalized non-lethal cell costs along it are summed. When
/// every sampled trajectory collides the critic raises the fail flag so the
/// optimizer resets and retries.
#[derive(Debug, Clone, Copy)]
pub struct ObstaclesCritic {
    config: ObstaclesCriticConfig,
}

impl ObstaclesCritic {
    /// Build from config.
    #[must_use]
    pub const fn new(config: ObstaclesCriticConfig) -> Self {
        Self { config }
    }
}

impl CriticFunction for ObstaclesCritic {
    fn name(&self) -> &'static str {
        "Obstacles"
    }

    fn score(&self, data: &mut CriticData<'_>) {
        let batch = data.trajectories.batch_size();
        let steps = data.trajectories.time_steps();
        let mut all_collide = true;

        for b in 0..batch {
            let mut collided = false;
            let mut cost_sum = 0.0;

            for t in 0..steps {
                let x = data.trajectories.data[[b, t, 0]];
                let y = data.trajectories.data[[b, t, 1]];
                // Out of bounds reads as free space.
                let cell = data.costmap.cost_at_world(x, y).unwrap_or(0);

                if Costmap::is_lethal(cell) {
                    collided = true;
                    break;
                }
                cost_sum += f64::from(cell) / f64::from(MAX_NON_LETHAL);
            }

            if collided {
                data.costs[b] += self.config.collision_cost;
            } else {
                all_collide = false;
                data.costs[b] += weighted_cost(cost_sum, self.config.weight, self.config.power);
            }
        }

        data.fail_flag = all_collide;
    }
}
