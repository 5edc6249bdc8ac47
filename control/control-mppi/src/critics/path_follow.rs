//! Path follow critic.

use control_types::PathFollowCriticConfig;

use crate::critics::{weighted_cost, CriticData, CriticFunction};

/// Pulls trajectory endpoints toward a path point ahead of the batch.
///
/// The target sits `offset_from_furthest` waypoints beyond the furthest path
/// point any trajectory has reached, clamped to the path end. Once the batch
/// has covered more than `max_path_ratio` of the plan the pull is released so
/// the alignment and goal critics finish the approach.
#[derive(Debug, Clone, Copy)]
pub struct PathFollowCritic {
    config: PathFollowCriticConfig,
}

impl PathFollowCritic {
    /// Build from config.
    #[must_use]
    pub const fn new(config: PathFollowCriticConfig) -> Self {
        Self { config }
    }
}

impl CriticFunction for PathFollowCritic {
    fn name(&self) -> &'static str {
        "PathFollow"
    }

    fn score(&self, data: &mut CriticData<'_>) {
        if data.path.is_empty() {
            return;
        }
        if data.path_ratio_reached() > self.config.max_path_ratio {
            return;
        }

        let target =
            (data.furthest_reached_path_point() + self.config.offset_from_furthest)
                .min(data.path.len() - 1);
        let target_x = data.path.x[target];
        let target_y = data.path.y[target];

        let last = data.trajectories.time_steps() - 1;
        for b in 0..data.trajectories.batch_size() {
            let dx = data.trajectories.data[[b, last, 0]] - target_x;
            let dy = data.trajectories.data[[b, last, 1]] - target_y;
            let dist = (dx * dx + dy * dy).sqrt();
            data.costs[b] += weighted_cost(dist, self.config.weight, self.config.power);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::critics::test_support::CriticFixture;
    use control_types::{Path, Pose};

    fn long_path() -> Path {
        let poses: Vec<Pose> = (0..50)
            .map(|i| Pose::new(0.1 * f64::from(i), 0.0, 0.0))
            .collect();
        Path::from_poses(&poses, 0.0)
    }

    #[test]
    fn advancing_endpoint_scores_lower() {
        let mut fixture = CriticFixture::new(2, 4, false);
        fixture.path = long_path();
        // Second trajectory ends further along the path.
        fixture.trajectories.data[[0, 3, 0]] = 0.1;
        fixture.trajectories.data[[1, 3, 0]] = 0.8;

        let mut data = fixture.data();
        PathFollowCritic::new(PathFollowCriticConfig::default()).score(&mut data);

        assert!(data.costs[1] < data.costs[0]);
        assert!(data.costs[0] > 0.0);
    }

    #[test]
    fn releases_after_enough_progress() {
        let mut fixture = CriticFixture::new(1, 4, false);
        fixture.path = long_path();
        // Endpoint near the end of the path: ratio above the default 0.40.
        fixture.trajectories.data[[0, 3, 0]] = 4.5;

        let mut data = fixture.data();
        PathFollowCritic::new(PathFollowCriticConfig::default()).score(&mut data);

        assert!(data.costs.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn empty_path_contributes_nothing() {
        let mut fixture = CriticFixture::new(1, 4, false);
        let mut data = fixture.data();

        PathFollowCritic::new(PathFollowCriticConfig::default()).score(&mut data);

        assert!(data.costs.iter().all(|&c| c == 0.0));
    }
}
