//! Signalbox: a thread-safe signal light controller.
//!
//! A controller drives a fixed set of named lamps through a small
//! vocabulary of signal states. The pure core decides what a move means
//! (which pattern each state shows, which moves are allowed, redirected
//! or rejected, which transient states are shown on the way) and a thin
//! scheduling shell runs the moves one at a time on a transition worker.
//!
//! # Core Concepts
//!
//! - **State**: signal-state vocabulary via the `State` trait and `state_enum!`
//! - **Pattern**: the lamp configuration shown in each state
//! - **Transition table**: per-pair policy with at most one redirect hop
//! - **Controller**: FIFO scheduling of move requests, observers and history
//!
//! # Example
//!
//! ```rust
//! use signalbox::observer::StepPhase;
//! use signalbox::traffic::{self, TrafficSignal};
//! use std::sync::{Arc, Mutex};
//!
//! let light = traffic::traffic_light().instant().spawn().unwrap();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let recorder = Arc::clone(&seen);
//! light.add_callback(move |_, notification| {
//!     if notification.phase == StepPhase::Settled {
//!         recorder.lock().unwrap().push(notification.state);
//!     }
//!     Ok(())
//! });
//!
//! light.move_to(TrafficSignal::Closed).unwrap();
//! light.move_to(TrafficSignal::Open).unwrap();
//! light.wait_idle().unwrap();
//!
//! assert_eq!(*seen.lock().unwrap(), vec![TrafficSignal::Closed, TrafficSignal::Open]);
//! ```

pub mod builder;
pub mod config;
pub mod controller;
pub mod core;
pub mod error;
pub mod machine;
pub mod observer;
pub mod traffic;

// Re-export commonly used types
pub use builder::{BuildError, ControllerBuilder};
pub use config::ControllerOptions;
pub use controller::{Controller, ControllerHandle};
pub use crate::core::{LightState, Pattern, RequestId, State};
pub use error::{ControllerError, ObserverError, Result};
pub use observer::{Notification, StepPhase};
