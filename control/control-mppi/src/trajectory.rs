//! Trajectory rollout.
//!
//! Integrates the realized velocity columns of the sampler state into world
//! poses with forward Euler. Ordering matters for the critic math: the
//! heading advances with the *previous* step's `wz`, and translation uses the
//! pre-update yaw of the previous step.

use ndarray::{s, Array3, ArrayView2};

use control_types::Pose;

use crate::state::State;

/// Sampled world-frame trajectories, shape `(batch, time_steps, 3)`.
///
/// The last axis is `(x, y, yaw)`; step 0 is the robot pose.
#[derive(Debug, Clone)]
pub struct Trajectories {
    /// The dense buffer.
    pub data: Array3<f64>,
}

impl Trajectories {
    /// A zeroed trajectory tensor.
    #[must_use]
    pub fn new(batch_size: usize, time_steps: usize) -> Self {
        Self {
            data: Array3::zeros((batch_size, time_steps, 3)),
        }
    }

    /// Re-allocate for the given dimensions.
    pub fn reset(&mut self, batch_size: usize, time_steps: usize) {
        self.data = Array3::zeros((batch_size, time_steps, 3));
    }

    /// Number of trajectories.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.data.shape()[0]
    }

    /// Horizon length.
    #[must_use]
    pub fn time_steps(&self) -> usize {
        self.data.shape()[1]
    }

    /// View of the x coordinates, shape `(batch, time_steps)`.
    #[must_use]
    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.data.slice(s![.., .., 0])
    }

    /// View of the y coordinates.
    #[must_use]
    pub fn y(&self) -> ArrayView2<'_, f64> {
        self.data.slice(s![.., .., 1])
    }

    /// View of the yaws.
    #[must_use]
    pub fn yaws(&self) -> ArrayView2<'_, f64> {
        self.data.slice(s![.., .., 2])
    }
}

/// Forward-Euler rollout of state velocities into poses.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrajectoryIntegrator;

impl TrajectoryIntegrator {
    /// Integrate `state` from `pose` into `out`.
    ///
    /// Step 0 of every trajectory is the robot pose. For `t >= 1`:
    ///
    /// ```text
    /// yaw[t] = yaw[t-1] + wz[t-1] * dt
    /// x[t]   = x[t-1] + (vx[t-1] * cos(yaw[t-1]) - vy[t-1] * sin(yaw[t-1])) * dt
    /// y[t]   = y[t-1] + (vx[t-1] * sin(yaw[t-1]) + vy[t-1] * cos(yaw[t-1])) * dt
    /// ```
    ///
    /// The `vy` terms vanish for non-holonomic layouts.
    pub fn integrate(&self, out: &mut Trajectories, state: &State, pose: &Pose) {
        let layout = state.layout;
        let batch = state.batch_size();
        let steps = state.time_steps();
        debug_assert_eq!(out.data.shape(), &[batch, steps, 3]);

        out.data.slice_mut(s![.., 0, 0]).fill(pose.x);
        out.data.slice_mut(s![.., 0, 1]).fill(pose.y);
        out.data.slice_mut(s![.., 0, 2]).fill(pose.yaw);

        for b in 0..batch {
            for t in 1..steps {
                let dt = state.data[[b, t - 1, layout.dt()]];
                let vx = state.data[[b, t - 1, layout.vx()]];
                let vy = layout.vy().map_or(0.0, |col| state.data[[b, t - 1, col]]);
                let wz = state.data[[b, t - 1, layout.wz()]];

                let x = out.data[[b, t - 1, 0]];
                let y = out.data[[b, t - 1, 1]];
                let yaw = out.data[[b, t - 1, 2]];
                let (sin, cos) = yaw.sin_cos();

                out.data[[b, t, 0]] = x + (vx * cos - vy * sin) * dt;
                out.data[[b, t, 1]] = y + (vx * sin + vy * cos) * dt;
                out.data[[b, t, 2]] = yaw + wz * dt;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::state::StateLayout;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn state_with_velocity(vx: f64, wz: f64, batch: usize, steps: usize) -> State {
        let layout = StateLayout::new(false);
        let mut state = State::new(batch, steps, layout);
        state.reset(batch, steps, 0.1);
        state.column_mut(layout.vx()).fill(vx);
        state.column_mut(layout.wz()).fill(wz);
        state
    }

    #[test]
    fn zero_velocity_stays_put() {
        let state = state_with_velocity(0.0, 0.0, 3, 8);
        let mut out = Trajectories::new(3, 8);

        TrajectoryIntegrator.integrate(&mut out, &state, &Pose::new(1.0, 2.0, 0.5));

        for b in 0..3 {
            for t in 0..8 {
                assert_eq!(out.data[[b, t, 0]], 1.0);
                assert_eq!(out.data[[b, t, 1]], 2.0);
                assert_eq!(out.data[[b, t, 2]], 0.5);
            }
        }
    }

    #[test]
    fn straight_line_rollout() {
        let state = state_with_velocity(1.0, 0.0, 1, 11);
        let mut out = Trajectories::new(1, 11);

        TrajectoryIntegrator.integrate(&mut out, &state, &Pose::default());

        // 10 steps of 1 m/s at dt = 0.1.
        assert_relative_eq!(out.data[[0, 10, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(out.data[[0, 10, 1]], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn heading_uses_previous_step_rate() {
        let state = state_with_velocity(1.0, FRAC_PI_2 / 0.1, 1, 3);
        let mut out = Trajectories::new(1, 3);

        TrajectoryIntegrator.integrate(&mut out, &state, &Pose::default());

        // Translation at t=1 used the yaw *before* the 90 degree turn.
        assert_relative_eq!(out.data[[0, 1, 0]], 0.1, epsilon = 1e-12);
        assert_relative_eq!(out.data[[0, 1, 2]], FRAC_PI_2, epsilon = 1e-12);
        // At t=2 the turn is in effect: motion is along +Y.
        assert_relative_eq!(out.data[[0, 2, 0]], 0.1, epsilon = 1e-9);
        assert_relative_eq!(out.data[[0, 2, 1]], 0.1, epsilon = 1e-9);
    }

    #[test]
    fn holonomic_lateral_motion() {
        let layout = StateLayout::new(true);
        let mut state = State::new(1, 5, layout);
        state.reset(1, 5, 0.1);
        state.column_mut(layout.vy().unwrap()).fill(0.5);

        let mut out = Trajectories::new(1, 5);
        TrajectoryIntegrator.integrate(&mut out, &state, &Pose::default());

        // Pure vy at zero yaw moves along +Y.
        assert_relative_eq!(out.data[[0, 4, 0]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(out.data[[0, 4, 1]], 0.2, epsilon = 1e-12);
    }
}
