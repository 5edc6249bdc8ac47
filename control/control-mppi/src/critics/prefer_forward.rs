//! Forward motion critic.

use control_types::PreferForwardCriticConfig;

use crate::critics::{weighted_cost, CriticData, CriticFunction};
use crate::utils;

/// Penalizes reverse motion so the robot backs up only when it pays off.
///
/// Inactive near the goal, where a final reverse adjustment is legitimate.
#[derive(Debug, Clone, Copy)]
pub struct PreferForwardCritic {
    config: PreferForwardCriticConfig,
}

impl PreferForwardCritic {
    /// Build from config.
    #[must_use]
    pub const fn new(config: PreferForwardCriticConfig) -> Self {
        Self { config }
    }
}

impl CriticFunction for PreferForwardCritic {
    fn name(&self) -> &'static str {
        "PreferForward"
    }

    fn score(&self, data: &mut CriticData<'_>) {
        if utils::within_position_goal_tolerance(
            self.config.threshold_to_consider,
            data.pose,
            data.path,
        ) {
            return;
        }

        let layout = data.state.layout;
        let vx = data.state.column(layout.vx());
        let steps = data.state.time_steps();

        for (b, row) in vx.outer_iter().enumerate() {
            let reverse: f64 = row.iter().map(|&v| (-v).max(0.0)).sum();
            let mean = reverse / steps as f64;
            data.costs[b] += weighted_cost(mean, self.config.weight, self.config.power);
        }
    }
}
