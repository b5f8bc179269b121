//! Runtime options for a controller.
//!
//! Options are plain data with serde defaults, so hosts can keep them
//! next to the rest of their configuration and load them as JSON.

use crate::core::{DefaultPolicy, DEFAULT_HISTORY_LIMIT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables applied when a controller is built.
///
/// # Example
///
/// ```rust
/// use signalbox::config::ControllerOptions;
/// use signalbox::core::DefaultPolicy;
///
/// let options = ControllerOptions::from_json(
///     r#"{ "default_policy": "deny", "time_scale": 0.0 }"#,
/// )
/// .unwrap();
///
/// assert_eq!(options.default_policy, Some(DefaultPolicy::Deny));
/// assert_eq!(options.history_limit, 256);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerOptions {
    /// Overrides the transition table's policy for unlisted pairs.
    pub default_policy: Option<DefaultPolicy>,
    /// Overrides the dwell of states without an explicit dwell.
    pub default_dwell_ms: Option<u64>,
    /// Multiplies every dwell; `0.0` makes transitions instantaneous.
    pub time_scale: f64,
    /// Settled transitions kept in history.
    pub history_limit: usize,
    /// Name of the transition worker thread.
    pub worker_name: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            default_policy: None,
            default_dwell_ms: None,
            time_scale: 1.0,
            history_limit: DEFAULT_HISTORY_LIMIT,
            worker_name: "signal-transitions".to_string(),
        }
    }
}

impl ControllerOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn default_dwell(&self) -> Option<Duration> {
        self.default_dwell_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let options = ControllerOptions::from_json("{}").unwrap();
        assert_eq!(options, ControllerOptions::default());
    }

    #[test]
    fn dwell_override_is_parsed_as_milliseconds() {
        let options = ControllerOptions::from_json(r#"{ "default_dwell_ms": 1500 }"#).unwrap();
        assert_eq!(options.default_dwell(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(ControllerOptions::from_json(r#"{ "default_policy": "maybe" }"#).is_err());
    }

    #[test]
    fn options_roundtrip_through_json() {
        let options = ControllerOptions {
            default_policy: Some(DefaultPolicy::Permit),
            worker_name: "crossing-7".to_string(),
            ..ControllerOptions::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(ControllerOptions::from_json(&json).unwrap(), options);
    }
}
