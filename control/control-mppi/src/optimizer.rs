//! The MPPI optimizer.
//!
//! Owns the warm-started nominal control sequence and every hot-path buffer.
//! One `eval_control` call is one controller tick: sample noised control
//! batches, roll them out, score them, reweight the nominal sequence, emit
//! the first control.

use ndarray::{s, Array1, Array2, Axis, Zip};
use tracing::{debug, info, warn};

use control_types::{
    ControlError, ControllerConfig, Costmap, GoalChecker, Path, Pose, PoseStamped, Result,
    SamplingStd, Twist, TwistStamped, VelocityConstraints, NO_SPEED_LIMIT,
};

use crate::critics::CriticData;
use crate::manager::CriticManager;
use crate::motion::MotionModel;
use crate::noise::NoiseGenerator;
use crate::state::{ControlSequence, State, StateLayout};
use crate::trajectory::{Trajectories, TrajectoryIntegrator};

const PERIOD_EPS: f64 = 1e-6;

/// Settings frozen for the lifetime of a configuration.
///
/// `constraints` is the active bound set; it tracks `base_constraints` except
/// while a speed limit is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerSettings {
    /// Model timestep in seconds.
    pub model_dt: f64,
    /// Planning horizon in timesteps.
    pub time_steps: usize,
    /// Sampled trajectories per iteration.
    pub batch_size: usize,
    /// Optimization iterations per tick.
    pub iteration_count: usize,
    /// Softmax temperature.
    pub temperature: f64,
    /// Retries permitted after a failed optimization.
    pub retry_attempt_limit: usize,
    /// Whether the nominal sequence rolls one step between ticks.
    pub shift_control_sequence: bool,
    /// Velocity bounds before speed limiting.
    pub base_constraints: VelocityConstraints,
    /// Active velocity bounds.
    pub constraints: VelocityConstraints,
    /// Perturbation standard deviations.
    pub sampling_std: SamplingStd,
}

/// Sampling-based model predictive controller.
///
/// # Example
///
/// ```
/// use control_mppi::Optimizer;
/// use control_types::{
///     ControllerConfig, Costmap, Path, Pose, PoseStamped, SimpleGoalChecker, Twist,
/// };
///
/// let mut config = ControllerConfig::default();
/// config.seed = Some(7);
/// let mut optimizer = Optimizer::new(&config).unwrap();
///
/// let pose = PoseStamped::new(Pose::default(), "odom", 0.0);
/// let plan = Path::from_poses(
///     &[Pose::new(0.0, 0.0, 0.0), Pose::new(1.0, 0.0, 0.0)],
///     0.0,
/// );
/// let costmap = Costmap::new(100, 100, 0.1, -5.0, -5.0, "odom");
/// let checker = SimpleGoalChecker::default();
///
/// let cmd = optimizer
///     .eval_control(&pose, &Twist::zero(), &plan, &costmap, &checker)
///     .unwrap();
/// assert_eq!(cmd.frame_id, "odom");
/// ```
pub struct Optimizer {
    settings: OptimizerSettings,
    motion_model: MotionModel,
    state: State,
    control_sequence: ControlSequence,
    trajectories: Trajectories,
    integrator: TrajectoryIntegrator,
    costs: Array1<f64>,
    noise_generator: NoiseGenerator,
    critic_manager: CriticManager,
    robot_pose: Pose,
    robot_speed: Twist,
    // Retry budget is per optimizer instance; independent controllers must
    // not share failure history.
    retry_counter: usize,
}

impl Optimizer {
    /// Build an optimizer from config.
    ///
    /// Fails on invalid settings, an unknown motion model name, or a
    /// controller period longer than `model_dt`.
    pub fn new(config: &ControllerConfig) -> Result<Self> {
        config.validate()?;

        let motion_model =
            MotionModel::from_name(&config.motion_model, config.ackermann_min_turning_radius)?;
        let holonomic = motion_model.is_holonomic();
        let layout = StateLayout::new(holonomic);

        let shift_control_sequence =
            resolve_shift(config.controller_frequency, config.model_dt)?;

        let settings = OptimizerSettings {
            model_dt: config.model_dt,
            time_steps: config.time_steps,
            batch_size: config.batch_size,
            iteration_count: config.iteration_count,
            temperature: config.temperature,
            retry_attempt_limit: config.retry_attempt_limit,
            shift_control_sequence,
            base_constraints: config.base_constraints,
            constraints: config.base_constraints,
            sampling_std: config.sampling_std,
        };

        let mut optimizer = Self {
            settings,
            motion_model,
            state: State::new(settings.batch_size, settings.time_steps, layout),
            control_sequence: ControlSequence::new(settings.time_steps, layout),
            trajectories: Trajectories::new(settings.batch_size, settings.time_steps),
            integrator: TrajectoryIntegrator,
            costs: Array1::zeros(settings.batch_size),
            noise_generator: NoiseGenerator::new(config.seed, &config.sampling_std, holonomic)?,
            critic_manager: CriticManager::from_config(&config.critics)?,
            robot_pose: Pose::default(),
            robot_speed: Twist::zero(),
            retry_counter: 0,
        };
        optimizer.reset()?;

        info!(
            motion_model = %config.motion_model,
            batch_size = settings.batch_size,
            time_steps = settings.time_steps,
            "optimizer configured"
        );
        Ok(optimizer)
    }

    /// Re-apply configuration. The host calls this between ticks; it rebuilds
    /// every buffer and clears the warm start.
    pub fn set_config(&mut self, config: &ControllerConfig) -> Result<()> {
        *self = Self::new(config)?;
        Ok(())
    }

    /// Re-allocate all hot-path buffers to the current dimensions and zero
    /// the nominal sequence.
    pub fn reset(&mut self) -> Result<()> {
        let s = &self.settings;
        self.state.reset(s.batch_size, s.time_steps, s.model_dt);
        self.control_sequence.reset(s.time_steps);
        self.trajectories.reset(s.batch_size, s.time_steps);
        self.costs = Array1::zeros(s.batch_size);
        self.noise_generator.reset(
            s.batch_size,
            s.time_steps,
            &s.sampling_std,
            self.motion_model.is_holonomic(),
        )?;
        debug!("optimizer reset");
        Ok(())
    }

    /// Swap the motion model, rebuilding the tensor layouts to match its
    /// holonomy.
    pub fn set_motion_model(&mut self, name: &str) -> Result<()> {
        let model = MotionModel::from_name(
            name,
            match self.motion_model {
                MotionModel::Ackermann { min_turning_radius } => min_turning_radius,
                _ => 0.2,
            },
        )?;
        self.motion_model = model;

        let layout = StateLayout::new(model.is_holonomic());
        self.state = State::new(self.settings.batch_size, self.settings.time_steps, layout);
        self.control_sequence = ControlSequence::new(self.settings.time_steps, layout);
        self.reset()
    }

    /// Scale the active velocity constraints.
    ///
    /// With `percentage`, `speed_limit` is a percentage of the base bounds;
    /// otherwise it is an absolute forward bound and the lateral/angular
    /// bounds scale proportionally. [`NO_SPEED_LIMIT`] restores the base.
    pub fn set_speed_limit(&mut self, speed_limit: f64, percentage: bool) {
        let s = &mut self.settings;
        if speed_limit == NO_SPEED_LIMIT {
            s.constraints = s.base_constraints;
        } else if percentage {
            let ratio = speed_limit / 100.0;
            s.constraints.vx = s.base_constraints.vx * ratio;
            s.constraints.vy = s.base_constraints.vy * ratio;
            s.constraints.wz = s.base_constraints.wz * ratio;
        } else {
            let ratio = speed_limit / s.base_constraints.vx;
            s.constraints.vx = speed_limit;
            s.constraints.vy = s.base_constraints.vy * ratio;
            s.constraints.wz = s.base_constraints.wz * ratio;
        }
    }

    /// Compute the next command.
    ///
    /// Runs the configured iterations, retrying after a critic-signaled
    /// failure up to the retry limit, then emits the head of the refreshed
    /// nominal sequence stamped with the plan time and costmap frame.
    pub fn eval_control(
        &mut self,
        pose: &PoseStamped,
        speed: &Twist,
        plan: &Path,
        costmap: &Costmap,
        goal_checker: &dyn GoalChecker,
    ) -> Result<TwistStamped> {
        self.prepare(pose, speed);

        loop {
            let fail = self.optimize(plan, costmap, goal_checker);
            if !self.fallback(fail)? {
                break;
            }
        }

        let control = self.control_from_sequence_as_twist(plan.stamp, costmap.frame_id());

        if self.settings.shift_control_sequence {
            self.control_sequence.shift();
        }

        Ok(control)
    }

    /// Roll out the nominal sequence alone and return its `(time_steps, 3)`
    /// trajectory, for visualization.
    #[must_use]
    pub fn optimized_trajectory(&self) -> Array2<f64> {
        let layout = self.state.layout;
        let steps = self.settings.time_steps;

        let mut state = State::new(1, steps, layout);
        state.reset(1, steps, self.settings.model_dt);
        state
            .data
            .slice_mut(s![0, .., layout.cbegin()..layout.cend()])
            .assign(&self.control_sequence.data);
        Self::update_state_velocities(&mut state, &self.robot_speed, &self.motion_model);

        let mut out = Trajectories::new(1, steps);
        self.integrator.integrate(&mut out, &state, &self.robot_pose);
        out.data.index_axis(Axis(0), 0).to_owned()
    }

    /// Active settings.
    #[must_use]
    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    /// Whether the current motion model is holonomic.
    #[must_use]
    pub fn is_holonomic(&self) -> bool {
        self.motion_model.is_holonomic()
    }

    /// The sampler state of the latest iteration.
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The trajectories of the latest iteration.
    #[must_use]
    pub fn generated_trajectories(&self) -> &Trajectories {
        &self.trajectories
    }

    /// The warm-started nominal sequence.
    #[must_use]
    pub fn control_sequence(&self) -> &ControlSequence {
        &self.control_sequence
    }

    fn prepare(&mut self, pose: &PoseStamped, speed: &Twist) {
        self.robot_pose = pose.pose;
        self.robot_speed = *speed;
        self.costs.fill(0.0);
    }

    fn optimize(&mut self, plan: &Path, costmap: &Costmap, goal_checker: &dyn GoalChecker) -> bool {
        let mut fail = false;
        for _ in 0..self.settings.iteration_count {
            fail = self.optimize_once(plan, costmap, goal_checker);
        }
        fail
    }

    fn optimize_once(
        &mut self,
        plan: &Path,
        costmap: &Costmap,
        goal_checker: &dyn GoalChecker,
    ) -> bool {
        self.costs.fill(0.0);
        self.generate_noised_controls();
        self.apply_control_constraints();
        Self::update_state_velocities(&mut self.state, &self.robot_speed, &self.motion_model);
        self.integrator
            .integrate(&mut self.trajectories, &self.state, &self.robot_pose);

        let mut data = CriticData::new(
            &self.state,
            &self.trajectories,
            plan,
            &self.robot_pose,
            &self.robot_speed,
            costmap,
            goal_checker,
            &mut self.costs,
            self.settings.model_dt,
        );
        self.critic_manager.eval_trajectories_scores(&mut data);
        let fail = data.fail_flag;

        self.update_control_sequence();
        fail
    }

    /// Perturb the nominal sequence into the state's control columns.
    fn generate_noised_controls(&mut self) {
        let layout = self.state.layout;
        let noise = self.noise_generator.generate();
        let nominal = &self.control_sequence.data;
        let mut controls = self
            .state
            .data
            .slice_mut(s![.., .., layout.cbegin()..layout.cend()]);

        Zip::indexed(&mut controls)
            .and(noise)
            .for_each(|(_, t, c), ctrl, &n| {
                *ctrl = nominal[[t, c]] + n;
            });
    }

    /// Clip sampled controls to the active bounds, then let the motion model
    /// apply its own constraints. The model runs last so its bounds hold on
    /// the clipped values (Ackermann only ever shrinks `|wz|`).
    fn apply_control_constraints(&mut self) {
        let layout = self.state.layout;
        let bounds = self.settings.constraints;

        self.state
            .column_mut(layout.cvx())
            .mapv_inplace(|v| v.clamp(-bounds.vx, bounds.vx));
        if let Some(cvy) = layout.cvy() {
            self.state
                .column_mut(cvy)
                .mapv_inplace(|v| v.clamp(-bounds.vy, bounds.vy));
        }
        self.state
            .column_mut(layout.cwz())
            .mapv_inplace(|v| v.clamp(-bounds.wz, bounds.wz));

        self.motion_model.apply_constraints(&mut self.state);
    }

    /// Broadcast the measured speed into step 0 and propagate the motion
    /// model forward over the horizon.
    fn update_state_velocities(state: &mut State, speed: &Twist, motion_model: &MotionModel) {
        let layout = state.layout;
        state.data.slice_mut(s![.., 0, layout.vx()]).fill(speed.vx);
        state.data.slice_mut(s![.., 0, layout.wz()]).fill(speed.wz);
        if let Some(vy) = layout.vy() {
            state.data.slice_mut(s![.., 0, vy]).fill(speed.vy);
        }

        for t in 1..state.time_steps() {
            motion_model.predict(state, t);
        }
    }

    /// The defining MPPI update: softmax-reweight the sampled controls into
    /// the nominal sequence.
    fn update_control_sequence(&mut self) {
        let temperature = self.settings.temperature;
        // Subtract the minimum before exponentiation to avoid underflow.
        let min_cost = self.costs.iter().copied().fold(f64::INFINITY, f64::min);
        let mut weights = self.costs.mapv(|c| (-(c - min_cost) / temperature).exp());
        let total = weights.sum();
        weights /= total;

        let layout = self.state.layout;
        let controls = self
            .state
            .data
            .slice(s![.., .., layout.cbegin()..layout.cend()]);

        self.control_sequence.data.fill(0.0);
        for (b, &w) in weights.iter().enumerate() {
            self.control_sequence
                .data
                .scaled_add(w, &controls.slice(s![b, .., ..]));
        }
    }

    /// Reset-and-retry bookkeeping. Returns whether to run another attempt.
    fn fallback(&mut self, fail: bool) -> Result<bool> {
        if !fail {
            self.retry_counter = 0;
            return Ok(false);
        }

        warn!(attempt = self.retry_counter + 1, "optimization failed, resetting");
        self.reset()?;
        self.retry_counter += 1;

        if self.retry_counter > self.settings.retry_attempt_limit {
            self.retry_counter = 0;
            return Err(ControlError::FailedToComputePath);
        }
        Ok(true)
    }

    fn control_from_sequence_as_twist(&self, stamp: f64, frame_id: &str) -> TwistStamped {
        let offset = usize::from(self.settings.shift_control_sequence);
        let seq = &self.control_sequence;
        let twist = Twist::new(
            seq.data[[offset, seq.vx()]],
            seq.vy().map_or(0.0, |col| seq.data[[offset, col]]),
            seq.data[[offset, seq.wz()]],
        );
        TwistStamped::new(twist, frame_id, stamp)
    }
}

/// Decide control-sequence shifting from the host tick period.
///
/// Shifting keeps the nominal sequence's time axis aligned with wall time,
/// which only works when the tick period equals the model timestep. A longer
/// period would leave the sequence stale and is rejected outright.
fn resolve_shift(controller_frequency: f64, model_dt: f64) -> Result<bool> {
    let period = 1.0 / controller_frequency;

    if (period - model_dt).abs() < PERIOD_EPS {
        info!("controller period equals model_dt, control sequence shifting enabled");
        return Ok(true);
    }
    if period < model_dt {
        warn!(
            period,
            model_dt, "controller period is shorter than model_dt, consider setting them equal"
        );
        return Ok(false);
    }
    Err(ControlError::ControllerPeriodTooLong { period, model_dt })
}
