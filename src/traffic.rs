//! The stock three-lamp traffic light.
//!
//! Red, amber and green lamps with six signal states. `Closed` is
//! approached through amber (`Closing`) and `Open` through red and amber
//! (`Opening`). A request to switch an open signal off is redirected to
//! `Closed` so traffic is always stopped first.
//!
//! # Example
//!
//! ```rust
//! use signalbox::traffic::{self, TrafficSignal};
//!
//! let light = traffic::traffic_light().instant().build_stepped().unwrap();
//! light.close().unwrap();
//! light.open().unwrap();
//! light.run_pending();
//!
//! assert_eq!(light.state(), TrafficSignal::Open);
//! assert_eq!(light.pattern().to_string(), "red: Off, amber: Off, green: On");
//! ```

use crate::builder::ControllerBuilder;
use crate::controller::ControllerHandle;
use crate::core::{LightState, RequestId};
use crate::error::Result;
use crate::state_enum;
use std::time::Duration;

state_enum! {
    /// Signal states of the stock traffic light.
    pub enum TrafficSignal {
        Off,
        Closing,
        Closed,
        Opening,
        Open,
        Warning,
    }
    transient: [Closing, Opening]
}

/// Lamp names, in display order.
pub const LIGHT_NAMES: [&str; 3] = ["red", "amber", "green"];

const DWELL: Duration = Duration::from_millis(3000);
const APPROACH_DWELL: Duration = Duration::from_millis(2000);

/// Builder preset for the stock traffic light.
///
/// Starts `Off`. Further rules, options or an initial state can be added
/// before building.
pub fn traffic_light() -> ControllerBuilder<TrafficSignal> {
    use LightState::{Flashing, Off, SteadyOn};

    ControllerBuilder::new()
        .lights(LIGHT_NAMES)
        .pattern(TrafficSignal::Off, lamps(Off, Off, Off))
        .pattern(TrafficSignal::Closing, lamps(Off, SteadyOn, Off))
        .pattern(TrafficSignal::Closed, lamps(SteadyOn, Off, Off))
        .pattern(TrafficSignal::Opening, lamps(SteadyOn, SteadyOn, Off))
        .pattern(TrafficSignal::Open, lamps(Off, Off, SteadyOn))
        .pattern(TrafficSignal::Warning, lamps(Off, Flashing, Off))
        .approach(TrafficSignal::Closed, [TrafficSignal::Closing])
        .approach(TrafficSignal::Open, [TrafficSignal::Opening])
        .default_dwell(DWELL)
        .dwell(TrafficSignal::Closing, APPROACH_DWELL)
        .dwell(TrafficSignal::Opening, APPROACH_DWELL)
        .redirect(TrafficSignal::Open, TrafficSignal::Off, TrafficSignal::Closed)
        .reject(TrafficSignal::Off, TrafficSignal::Open)
}

fn lamps(red: LightState, amber: LightState, green: LightState) -> [(&'static str, LightState); 3] {
    [
        (LIGHT_NAMES[0], red),
        (LIGHT_NAMES[1], amber),
        (LIGHT_NAMES[2], green),
    ]
}

impl ControllerHandle<TrafficSignal> {
    pub fn open(&self) -> Result<RequestId> {
        self.move_to(TrafficSignal::Open)
    }

    pub fn close(&self) -> Result<RequestId> {
        self.move_to(TrafficSignal::Closed)
    }

    pub fn warning(&self) -> Result<RequestId> {
        self.move_to(TrafficSignal::Warning)
    }

    pub fn off(&self) -> Result<RequestId> {
        self.move_to(TrafficSignal::Off)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControllerError;
    use crate::observer::StepPhase;
    use std::sync::{Arc, Mutex};

    #[test]
    fn preset_validates() {
        assert!(traffic_light().validate().is_ok());
    }

    #[test]
    fn closing_shows_amber_before_red() {
        let light = traffic_light().instant().build_stepped().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        light.add_callback(move |_, notification| {
            recorder
                .lock()
                .unwrap()
                .push((notification.pattern.to_string(), notification.phase));
            Ok(())
        });

        light.close().unwrap();
        light.run_pending();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("red: Off, amber: On, green: Off".to_string(), StepPhase::Intermediate),
                ("red: On, amber: Off, green: Off".to_string(), StepPhase::Settled),
            ]
        );
    }

    #[test]
    fn opening_shows_red_and_amber_before_green() {
        let light = traffic_light().instant().build_stepped().unwrap();
        light.close().unwrap();
        light.run_pending();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        light.add_callback(move |_, notification| {
            recorder
                .lock()
                .unwrap()
                .push((notification.state, notification.pattern.to_string()));
            Ok(())
        });
        light.open().unwrap();
        light.run_pending();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (TrafficSignal::Opening, "red: On, amber: On, green: Off".to_string()),
                (TrafficSignal::Open, "red: Off, amber: Off, green: On".to_string()),
            ]
        );
        let last = light.history().last().cloned().unwrap();
        assert_eq!(last.steps, vec![TrafficSignal::Opening, TrafficSignal::Open]);
    }

    #[test]
    fn switching_off_an_open_signal_closes_it() {
        let light = traffic_light().instant().build_stepped().unwrap();
        light.close().unwrap();
        light.open().unwrap();
        light.off().unwrap();
        light.run_pending();

        assert_eq!(light.state(), TrafficSignal::Closed);
        let last = light.history().last().cloned().unwrap();
        assert_eq!(last.requested, TrafficSignal::Off);
        assert!(last.was_redirected());
    }

    #[test]
    fn opening_from_off_is_rejected() {
        let light = traffic_light().build_stepped().unwrap();
        assert_eq!(
            light.open(),
            Err(ControllerError::IllegalTransition {
                from: "Off".to_string(),
                to: "Open".to_string()
            })
        );
        assert!(!light.is_in_transition());
    }

    #[test]
    fn original_demo_sequence_is_accepted() {
        let light = traffic_light().instant().build_stepped().unwrap();
        light.close().unwrap();
        light.open().unwrap();
        light.close().unwrap();
        light.warning().unwrap();
        light.off().unwrap();
        assert_eq!(light.run_pending(), 5);

        assert_eq!(
            light.history().path(),
            vec![
                TrafficSignal::Off,
                TrafficSignal::Closed,
                TrafficSignal::Open,
                TrafficSignal::Closed,
                TrafficSignal::Warning,
                TrafficSignal::Off,
            ]
        );
    }
}
