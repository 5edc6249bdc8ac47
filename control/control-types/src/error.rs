//! Error types for the control stack.

use thiserror::Error;

/// Errors that can occur in controller configuration and optimization.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// Motion model name not recognized.
    #[error("unknown motion model: {name} (valid options are DiffDrive, Omni, Ackermann)")]
    UnknownMotionModel {
        /// The rejected model name.
        name: String,
    },

    /// Controller period exceeds the model timestep.
    #[error(
        "controller period {period} s exceeds model_dt {model_dt} s, set it equal to model_dt"
    )]
    ControllerPeriodTooLong {
        /// The controller period (1 / controller_frequency).
        period: f64,
        /// The optimizer model timestep.
        model_dt: f64,
    },

    /// Optimization failed after exhausting all retry attempts.
    #[error("optimizer failed to compute path")]
    FailedToComputePath,
}

impl ControlError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Creates an unknown motion model error.
    #[must_use]
    pub fn unknown_motion_model(name: impl Into<String>) -> Self {
        Self::UnknownMotionModel { name: name.into() }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::UnknownMotionModel { .. }
                | Self::ControllerPeriodTooLong { .. }
        )
    }
}
