//! Trajectory scoring.
//!
//! Each critic adds one weighted objective term to the per-trajectory cost
//! vector. Critics are fungible: they all share the `(weight, power)` cost
//! shape `(raw * weight) ^ power` and communicate only through [`CriticData`].

mod goal;
mod obstacles;
mod path_align;
mod path_angle;
mod path_follow;
mod prefer_forward;
mod twirling;

pub use goal::{GoalAngleCritic, GoalCritic};
pub use obstacles::ObstaclesCritic;
pub use path_align::PathAlignCritic;
pub use path_angle::PathAngleCritic;
pub use path_follow::PathFollowCritic;
pub use prefer_forward::PreferForwardCritic;
pub use twirling::TwirlingCritic;

use ndarray::Array1;

use control_types::{Costmap, GoalChecker, Path, Pose, Twist};

use crate::state::State;
use crate::trajectory::Trajectories;
use crate::utils;

/// Shared scratch passed through the critic chain during one evaluation.
///
/// Critics read the rollout tensors and add their contribution to `costs` in
/// place. Two flags flow back to the optimizer: `fail_flag` requests a
/// reset-and-retry, `goal_reached` short-circuits the path critics.
pub struct CriticData<'a> {
    /// Sampler state for the current iteration.
    pub state: &'a State,
    /// Integrated trajectories for the current iteration.
    pub trajectories: &'a Trajectories,
    /// Reference plan.
    pub path: &'a Path,
    /// Robot pose at tick start.
    pub pose: &'a Pose,
    /// Robot velocity at tick start.
    pub speed: &'a Twist,
    /// Occupancy costs, read-only during the tick.
    pub costmap: &'a Costmap,
    /// Host goal predicate.
    pub goal_checker: &'a dyn GoalChecker,
    /// Per-trajectory accumulated costs, shape `(batch,)`.
    pub costs: &'a mut Array1<f64>,
    /// Model timestep in seconds.
    pub model_dt: f64,
    /// Set by a critic to request reset-and-retry (e.g. total collision).
    pub fail_flag: bool,
    /// Set by goal-detector critics; later critics are skipped unless they
    /// opt in via [`CriticFunction::enabled_after_goal`].
    pub goal_reached: bool,
    furthest_reached_path_point: Option<usize>,
}

impl<'a> CriticData<'a> {
    /// Assemble critic data for one evaluation pass.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        state: &'a State,
        trajectories: &'a Trajectories,
        path: &'a Path,
        pose: &'a Pose,
        speed: &'a Twist,
        costmap: &'a Costmap,
        goal_checker: &'a dyn GoalChecker,
        costs: &'a mut Array1<f64>,
        model_dt: f64,
    ) -> Self {
        Self {
            state,
            trajectories,
            path,
            pose,
            speed,
            costmap,
            goal_checker,
            costs,
            model_dt,
            fail_flag: false,
            goal_reached: false,
            furthest_reached_path_point: None,
        }
    }

    /// Furthest path point reached by any trajectory, computed once per
    /// evaluation and shared by the path critics.
    pub fn furthest_reached_path_point(&mut self) -> usize {
        if let Some(idx) = self.furthest_reached_path_point {
            return idx;
        }
        let idx = utils::furthest_reached_path_point(self.trajectories, self.path);
        self.furthest_reached_path_point = Some(idx);
        idx
    }

    /// Fraction of the path reached by the trajectory batch.
    pub fn path_ratio_reached(&mut self) -> f64 {
        if self.path.is_empty() {
            return 0.0;
        }
        let len = self.path.len();
        self.furthest_reached_path_point() as f64 / len as f64
    }
}

/// One trajectory-scoring objective.
pub trait CriticFunction: Send {
    /// Name the critic is registered under.
    fn name(&self) -> &'static str;

    /// Whether the critic still runs after a goal-detector set
    /// `goal_reached`. Only the goal-proximity critics do.
    fn enabled_after_goal(&self) -> bool {
        false
    }

    /// Add this critic's contribution to `data.costs` in place.
    fn score(&self, data: &mut CriticData<'_>);
}

/// The uniform critic cost shape: `(raw * weight) ^ power`.
#[must_use]
pub(crate) fn weighted_cost(raw: f64, weight: f64, power: u32) -> f64 {
    (raw * weight).powi(power as i32)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
pub(crate) mod test_support {
    use super::*;
    use control_types::SimpleGoalChecker;

    /// Everything a critic needs, owned in one place so tests can borrow a
    /// [`CriticData`] from it.
    pub struct CriticFixture {
        pub state: State,
        pub trajectories: Trajectories,
        pub path: Path,
        pub pose: Pose,
        pub speed: Twist,
        pub costmap: Costmap,
        pub goal_checker: SimpleGoalChecker,
        pub costs: Array1<f64>,
    }

    impl CriticFixture {
        pub fn new(batch_size: usize, time_steps: usize, holonomic: bool) -> Self {
            use crate::state::StateLayout;

            let mut state = State::new(batch_size, time_steps, StateLayout::new(holonomic));
            state.reset(batch_size, time_steps, 0.1);
            Self {
                state,
                trajectories: Trajectories::new(batch_size, time_steps),
                path: Path::empty(0.0),
                pose: Pose::default(),
                speed: Twist::zero(),
                costmap: Costmap::new(100, 100, 0.1, -5.0, -5.0, "odom"),
                goal_checker: SimpleGoalChecker::new(0.25, 0.25),
                costs: Array1::zeros(batch_size),
            }
        }

        pub fn data(&mut self) -> CriticData<'_> {
            CriticData::new(
                &self.state,
                &self.trajectories,
                &self.path,
                &self.pose,
                &self.speed,
                &self.costmap,
                &self.goal_checker,
                &mut self.costs,
                0.1,
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::test_support::CriticFixture;
    use super::*;
    use control_types::Pose;

    #[test]
    fn weighted_cost_shape() {
        assert_eq!(weighted_cost(2.0, 3.0, 1), 6.0);
        assert_eq!(weighted_cost(2.0, 3.0, 2), 36.0);
        assert_eq!(weighted_cost(0.0, 5.0, 2), 0.0);
    }

    #[test]
    fn furthest_point_is_cached() {
        let mut fixture = CriticFixture::new(2, 4, false);
        fixture.path = Path::from_poses(
            &[
                Pose::new(0.0, 0.0, 0.0),
                Pose::new(1.0, 0.0, 0.0),
                Pose::new(2.0, 0.0, 0.0),
            ],
            0.0,
        );
        fixture.trajectories.data[[1, 3, 0]] = 1.9;

        let mut data = fixture.data();
        assert_eq!(data.furthest_reached_path_point(), 2);
        // Cached value survives even though nothing recomputes it.
        assert_eq!(data.furthest_reached_path_point(), 2);
        assert!(data.path_ratio_reached() > 0.6);
    }

    #[test]
    fn path_ratio_on_empty_path_is_zero() {
        let mut fixture = CriticFixture::new(1, 3, false);
        let mut data = fixture.data();
        assert_eq!(data.path_ratio_reached(), 0.0);
    }
}
