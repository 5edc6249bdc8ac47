//! Kinematic motion models.
//!
//! The three platform families form a closed, hot set, so they are an enum
//! with methods rather than trait objects. The sampled controls *are* the
//! commanded velocities; pose integration happens in the trajectory
//! integrator, which keeps the predictor linear over the batch.

use ndarray::s;

use control_types::{ControlError, MotionModelKind, Result};

use crate::state::State;

/// Forward-kinematics predictor with model-specific constraints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionModel {
    /// Differential drive: `(vx, wz)`, no lateral motion.
    DiffDrive,
    /// Omnidirectional: `(vx, vy, wz)`.
    Omni,
    /// Car-like steering bounded by a minimum turning radius.
    Ackermann {
        /// Minimum turning radius in meters.
        min_turning_radius: f64,
    },
}

impl MotionModel {
    /// Resolve a model from its configured name.
    ///
    /// Unknown names are fatal at initialization.
    pub fn from_name(name: &str, min_turning_radius: f64) -> Result<Self> {
        match name.parse::<MotionModelKind>()? {
            MotionModelKind::DiffDrive => Ok(Self::DiffDrive),
            MotionModelKind::Omni => Ok(Self::Omni),
            MotionModelKind::Ackermann => {
                if min_turning_radius <= 0.0 {
                    return Err(ControlError::invalid_config(
                        "ackermann_min_turning_radius must be positive",
                    ));
                }
                Ok(Self::Ackermann { min_turning_radius })
            }
        }
    }

    /// Whether the model permits an independent lateral velocity.
    #[must_use]
    pub const fn is_holonomic(&self) -> bool {
        matches!(self, Self::Omni)
    }

    /// Write the velocities of step `t` from the controls of step `t - 1`.
    ///
    /// For all three models the commanded velocity is realized one step
    /// later, so prediction copies the control columns of the previous step
    /// into the velocity columns of the current one.
    pub fn predict(&self, state: &mut State, t: usize) {
        debug_assert!(t >= 1 && t < state.time_steps());
        let layout = state.layout;
        let (mut next, prev) = state.data.multi_slice_mut((
            s![.., t, layout.vbegin()..layout.vend()],
            s![.., t - 1, layout.cbegin()..layout.cend()],
        ));
        next.assign(&prev);
    }

    /// Apply model-specific constraints to the sampled controls.
    ///
    /// Ackermann clamps the angular control so `|wz| <= |vx| / r_min`
    /// elementwise; the other models have no extra constraints.
    pub fn apply_constraints(&self, state: &mut State) {
        let Self::Ackermann { min_turning_radius } = *self else {
            return;
        };

        let layout = state.layout;
        let (mut cwz, cvx) = state
            .data
            .multi_slice_mut((s![.., .., layout.cwz()], s![.., .., layout.cvx()]));

        ndarray::Zip::from(&mut cwz).and(&cvx).for_each(|wz, &vx| {
            let bound = vx.abs() / min_turning_radius;
            if wz.abs() > bound {
                *wz = wz.signum() * bound;
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::state::StateLayout;
    use approx::assert_relative_eq;

    #[test]
    fn from_name_resolves_models() {
        assert_eq!(
            MotionModel::from_name("DiffDrive", 0.2).unwrap(),
            MotionModel::DiffDrive
        );
        assert_eq!(MotionModel::from_name("Omni", 0.2).unwrap(), MotionModel::Omni);
        assert!(matches!(
            MotionModel::from_name("Ackermann", 0.2).unwrap(),
            MotionModel::Ackermann { .. }
        ));
        assert!(MotionModel::from_name("Bicycle", 0.2).is_err());
    }

    #[test]
    fn holonomy_flags() {
        assert!(!MotionModel::DiffDrive.is_holonomic());
        assert!(MotionModel::Omni.is_holonomic());
        assert!(!MotionModel::Ackermann {
            min_turning_radius: 0.2
        }
        .is_holonomic());
    }

    #[test]
    fn predict_copies_previous_controls() {
        let layout = StateLayout::new(false);
        let mut state = State::new(2, 3, layout);
        state.data[[0, 0, layout.cvx()]] = 0.4;
        state.data[[0, 0, layout.cwz()]] = -0.2;
        state.data[[1, 0, layout.cvx()]] = 0.1;

        MotionModel::DiffDrive.predict(&mut state, 1);

        assert_eq!(state.data[[0, 1, layout.vx()]], 0.4);
        assert_eq!(state.data[[0, 1, layout.wz()]], -0.2);
        assert_eq!(state.data[[1, 1, layout.vx()]], 0.1);
        // Step 0 velocities untouched.
        assert_eq!(state.data[[0, 0, layout.vx()]], 0.0);
    }

    #[test]
    fn predict_copies_lateral_when_holonomic() {
        let layout = StateLayout::new(true);
        let mut state = State::new(1, 2, layout);
        state.data[[0, 0, layout.cvy().unwrap()]] = 0.3;

        MotionModel::Omni.predict(&mut state, 1);

        assert_eq!(state.data[[0, 1, layout.vy().unwrap()]], 0.3);
    }

    #[test]
    fn ackermann_bounds_turning_rate() {
        let layout = StateLayout::new(false);
        let mut state = State::new(1, 2, layout);
        state.data[[0, 0, layout.cvx()]] = 0.5;
        state.data[[0, 0, layout.cwz()]] = 4.0;
        state.data[[0, 1, layout.cvx()]] = 0.5;
        state.data[[0, 1, layout.cwz()]] = -4.0;

        let model = MotionModel::Ackermann {
            min_turning_radius: 0.5,
        };
        model.apply_constraints(&mut state);

        // |wz| <= |vx| / r = 1.0, sign preserved.
        assert_relative_eq!(state.data[[0, 0, layout.cwz()]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(state.data[[0, 1, layout.cwz()]], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn diff_drive_constraints_are_noop() {
        let layout = StateLayout::new(false);
        let mut state = State::new(1, 2, layout);
        state.data[[0, 0, layout.cwz()]] = 4.0;

        MotionModel::DiffDrive.apply_constraints(&mut state);

        assert_eq!(state.data[[0, 0, layout.cwz()]], 4.0);
    }
}
