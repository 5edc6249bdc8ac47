//! Dense optimization state.
//!
//! The sampler state is one `(batch, time_steps, dim)` tensor. The last axis
//! packs realized velocities, sampled control velocities, and the per-step
//! interval; [`StateLayout`] maps symbolic column names to indices so the same
//! buffer serves holonomic and non-holonomic models.

use ndarray::{s, Array2, Array3, ArrayView2, ArrayViewMut2};

/// Column indices of the state tensor's last axis.
///
/// The layout depends on holonomy: holonomic models carry `vy`/`cvy` columns,
/// the rest do not. Recomputed whenever the motion model changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLayout {
    holonomic: bool,
}

impl StateLayout {
    /// Layout for the given holonomy.
    #[must_use]
    pub const fn new(holonomic: bool) -> Self {
        Self { holonomic }
    }

    /// Whether the layout carries lateral columns.
    #[must_use]
    pub const fn is_holonomic(&self) -> bool {
        self.holonomic
    }

    /// Number of velocity columns.
    #[must_use]
    pub const fn vdim(&self) -> usize {
        if self.holonomic {
            3
        } else {
            2
        }
    }

    /// Number of control columns.
    #[must_use]
    pub const fn cdim(&self) -> usize {
        self.vdim()
    }

    /// Total columns: velocities, controls, and the `dt` column.
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.vdim() + self.cdim() + 1
    }

    /// Column of the realized forward velocity.
    #[must_use]
    pub const fn vx(&self) -> usize {
        0
    }

    /// Column of the realized lateral velocity, when holonomic.
    #[must_use]
    pub const fn vy(&self) -> Option<usize> {
        if self.holonomic {
            Some(1)
        } else {
            None
        }
    }

    /// Column of the realized angular velocity.
    #[must_use]
    pub const fn wz(&self) -> usize {
        self.vdim() - 1
    }

    /// First velocity column (inclusive).
    #[must_use]
    pub const fn vbegin(&self) -> usize {
        0
    }

    /// Past-the-end velocity column.
    #[must_use]
    pub const fn vend(&self) -> usize {
        self.vdim()
    }

    /// Column of the sampled forward control.
    #[must_use]
    pub const fn cvx(&self) -> usize {
        self.vdim()
    }

    /// Column of the sampled lateral control, when holonomic.
    #[must_use]
    pub const fn cvy(&self) -> Option<usize> {
        if self.holonomic {
            Some(self.vdim() + 1)
        } else {
            None
        }
    }

    /// Column of the sampled angular control.
    #[must_use]
    pub const fn cwz(&self) -> usize {
        self.vdim() + self.cdim() - 1
    }

    /// First control column (inclusive).
    #[must_use]
    pub const fn cbegin(&self) -> usize {
        self.vdim()
    }

    /// Past-the-end control column.
    #[must_use]
    pub const fn cend(&self) -> usize {
        self.vdim() + self.cdim()
    }

    /// Column of the per-step time interval.
    #[must_use]
    pub const fn dt(&self) -> usize {
        self.dim() - 1
    }
}

/// Sampler state for every trajectory in the batch.
///
/// Shape is `(batch_size, time_steps, layout.dim())`. Velocities for step 0
/// are the measured robot speed; later steps are produced by the motion
/// model's predictor from the previous step's controls.
#[derive(Debug, Clone)]
pub struct State {
    /// The dense buffer.
    pub data: Array3<f64>,
    /// Column layout of the last axis.
    pub layout: StateLayout,
}

impl State {
    /// A zeroed state for the given dimensions.
    #[must_use]
    pub fn new(batch_size: usize, time_steps: usize, layout: StateLayout) -> Self {
        Self {
            data: Array3::zeros((batch_size, time_steps, layout.dim())),
            layout,
        }
    }

    /// Re-allocate for the given dimensions and fill the `dt` column.
    pub fn reset(&mut self, batch_size: usize, time_steps: usize, model_dt: f64) {
        self.data = Array3::zeros((batch_size, time_steps, self.layout.dim()));
        self.data
            .slice_mut(s![.., .., self.layout.dt()])
            .fill(model_dt);
    }

    /// Number of sampled trajectories.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.data.shape()[0]
    }

    /// Planning horizon length.
    #[must_use]
    pub fn time_steps(&self) -> usize {
        self.data.shape()[1]
    }

    /// View of one named column, shape `(batch, time_steps)`.
    #[must_use]
    pub fn column(&self, col: usize) -> ArrayView2<'_, f64> {
        self.data.slice(s![.., .., col])
    }

    /// Mutable view of one named column.
    #[must_use]
    pub fn column_mut(&mut self, col: usize) -> ArrayViewMut2<'_, f64> {
        self.data.slice_mut(s![.., .., col])
    }
}

/// The warm-started nominal control sequence, shape `(time_steps, cdim)`.
///
/// Columns follow the control part of [`StateLayout`]: `cvx, [cvy], cwz`.
/// Zeroed on reset; refined every tick by the softmax reweighting.
#[derive(Debug, Clone)]
pub struct ControlSequence {
    /// The dense buffer.
    pub data: Array2<f64>,
    layout: StateLayout,
}

impl ControlSequence {
    /// A zeroed sequence for the given horizon.
    #[must_use]
    pub fn new(time_steps: usize, layout: StateLayout) -> Self {
        Self {
            data: Array2::zeros((time_steps, layout.cdim())),
            layout,
        }
    }

    /// Re-allocate (and zero) for the given horizon.
    pub fn reset(&mut self, time_steps: usize) {
        self.data = Array2::zeros((time_steps, self.layout.cdim()));
    }

    /// Horizon length.
    #[must_use]
    pub fn time_steps(&self) -> usize {
        self.data.shape()[0]
    }

    /// Column of the forward control.
    #[must_use]
    pub const fn vx(&self) -> usize {
        0
    }

    /// Column of the lateral control, when holonomic.
    #[must_use]
    pub const fn vy(&self) -> Option<usize> {
        if self.layout.is_holonomic() {
            Some(1)
        } else {
            None
        }
    }

    /// Column of the angular control.
    #[must_use]
    pub const fn wz(&self) -> usize {
        self.layout.cdim() - 1
    }

    /// Roll the sequence one step into the past: `U[t] = U[t+1]`, with the
    /// final row retained, so the time axis tracks wall time between ticks.
    pub fn shift(&mut self) {
        let steps = self.time_steps();
        for t in 0..steps.saturating_sub(1) {
            let next = self.data.row(t + 1).to_owned();
            self.data.row_mut(t).assign(&next);
        }
    }
}
