//! Path heading critic.

use control_types::PathAngleCriticConfig;

use crate::critics::{weighted_cost, CriticData, CriticFunction};
use crate::utils;

/// Penalizes trajectories whose headings point away from the path ahead.
///
/// Only engages when the robot itself is facing more than
/// `max_angle_to_furthest` away from the target waypoint; while roughly
/// aligned, the alignment critic alone shapes the heading.
#[derive(Debug, Clone, Copy)]
pub struct PathAngleCritic {
    config: PathAngleCriticConfig,
}

impl PathAngleCritic {
    /// Build from config.
    #[must_use]
    pub const fn new(config: PathAngleCriticConfig) -> Self {
        Self { config }
    }
}

impl CriticFunction for PathAngleCritic {
    fn name(&self) -> &'static str {
        "PathAngle"
    }

    fn score(&self, data: &mut CriticData<'_>) {
        if data.path.is_empty() {
            return;
        }
        if utils::within_position_goal_tolerance(
            self.config.threshold_to_consider,
            data.pose,
            data.path,
        ) {
            return;
        }

        let target = (data.furthest_reached_path_point() + self.config.offset_from_furthest)
            .min(data.path.len() - 1);
        let target_x = data.path.x[target];
        let target_y = data.path.y[target];

        if utils::pose_point_angle(data.pose, target_x, target_y)
            < self.config.max_angle_to_furthest
        {
            return;
        }

        let steps = data.trajectories.time_steps();
        for b in 0..data.trajectories.batch_size() {
            let mut sum = 0.0;
            for t in 0..steps {
                let x = data.trajectories.data[[b, t, 0]];
                let y = data.trajectories.data[[b, t, 1]];
                let yaw = data.trajectories.data[[b, t, 2]];
                let bearing = (target_y - y).atan2(target_x - x);
                sum += utils::shortest_angular_distance(yaw, bearing).abs();
            }
            let mean = sum / steps as f64;
            data.costs[b] += weighted_cost(mean, self.config.weight, self.config.power);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::critics::test_support::CriticFixture;
    use control_types::{Path, Pose};
    use std::f64::consts::PI;

    fn path_behind() -> Path {
        // Path runs in -X; a robot facing +X is fully misaligned.
        let poses: Vec<Pose> = (0..30)
            .map(|i| Pose::new(-0.1 * f64::from(i), 0.0, PI))
            .collect();
        Path::from_poses(&poses, 0.0)
    }

    #[test]
    fn inactive_when_facing_path() {
        let mut fixture = CriticFixture::new(1, 4, false);
        let poses: Vec<Pose> = (0..30).map(|i| Pose::new(0.1 * f64::from(i), 0.0, 0.0)).collect();
        fixture.path = Path::from_poses(&poses, 0.0);

        let mut data = fixture.data();
        PathAngleCritic::new(PathAngleCriticConfig::default()).score(&mut data);

        assert!(data.costs.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn penalizes_misaligned_trajectories() {
        let mut fixture = CriticFixture::new(2, 4, false);
        fixture.path = path_behind();
        // First trajectory turns toward the path (yaw near pi), second stays
        // facing +X.
        fixture
            .trajectories
            .data
            .slice_mut(ndarray::s![0, .., 2])
            .fill(PI);

        let mut data = fixture.data();
        PathAngleCritic::new(PathAngleCriticConfig::default()).score(&mut data);

        assert!(data.costs[0] < data.costs[1]);
        assert!(data.costs[1] > 0.0);
    }

    #[test]
    fn empty_path_contributes_nothing() {
        let mut fixture = CriticFixture::new(1, 4, false);
        let mut data = fixture.data();

        PathAngleCritic::new(PathAngleCriticConfig::default()).score(&mut data);

        assert!(data.costs.iter().all(|&c| c == 0.0));
    }
}
