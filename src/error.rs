//! Controller construction errors.
//!
//! Only configuration problems are errors. Once a [`KinematicController`]
//! exists, every simulation step produces a valid actor state and nothing
//! is surfaced through this type.
//!
//! [`KinematicController`]: crate::controller::KinematicController

use thiserror::Error;

/// Errors raised while assembling a controller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControllerError {
    /// The builder finished without an [`ActorShape`](crate::config::ActorShape).
    #[error("kinematic controller requires an actor shape")]
    MissingShape,

    /// The builder finished without a [`GravityConfig`](crate::gravity::GravityConfig).
    #[error("kinematic controller requires a gravity module")]
    MissingGravity,

    /// A configuration value is out of its accepted range.
    #[error("invalid controller configuration `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Human readable constraint that was violated.
        reason: String,
    },
}

impl ControllerError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_message_names_field() {
        let error = ControllerError::invalid("ray_count", "must be at least 1");
        assert_eq!(
            error.to_string(),
            "invalid controller configuration `ray_count`: must be at least 1"
        );
    }

    #[test]
    fn missing_collaborators_have_distinct_messages() {
        assert_ne!(
            ControllerError::MissingShape.to_string(),
            ControllerError::MissingGravity.to_string()
        );
    }
}
