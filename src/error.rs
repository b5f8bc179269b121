//! Runtime error types for signal controllers.

use thiserror::Error;

/// Convenient result alias for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;

/// Errors raised while resolving, running or observing transitions.
///
/// State names are carried as strings so the error type stays independent
/// of the signal vocabulary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ControllerError {
    #[error("State '{state}' is not part of the configured vocabulary")]
    UnknownState { state: String },

    #[error("State '{state}' is transient and cannot be requested directly")]
    TransientTarget { state: String },

    #[error("Transition from '{from}' to '{to}' is not allowed")]
    IllegalTransition { from: String, to: String },

    #[error("Redirect from '{from}' towards '{to}' does not settle after one hop")]
    RedirectCycle { from: String, to: String },

    #[error("Observer failed: {0}")]
    Observer(#[from] ObserverError),

    #[error("Cannot wait for the controller to go idle from inside its own transition")]
    WaitFromWorker,

    #[error("Controller has been stopped")]
    Stopped,

    #[error("Transition worker could not be started: {0}")]
    WorkerSpawn(String),
}

impl ControllerError {
    pub(crate) fn unknown_state(state: &impl crate::core::State) -> Self {
        Self::UnknownState {
            state: state.name().to_string(),
        }
    }

    pub(crate) fn illegal(from: &impl crate::core::State, to: &impl crate::core::State) -> Self {
        Self::IllegalTransition {
            from: from.name().to_string(),
            to: to.name().to_string(),
        }
    }
}

/// Failure reported by a registered observer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ObserverError {
    #[error("{0}")]
    Failed(String),

    #[error("observer panicked: {0}")]
    Panicked(String),
}

impl ObserverError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_transition_message_names_both_states() {
        let err = ControllerError::IllegalTransition {
            from: "Off".to_string(),
            to: "Open".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Transition from 'Off' to 'Open' is not allowed"
        );
    }

    #[test]
    fn observer_error_converts_into_controller_error() {
        let err: ControllerError = ObserverError::failed("lamp driver offline").into();
        assert_eq!(err.to_string(), "Observer failed: lamp driver offline");
    }
}
