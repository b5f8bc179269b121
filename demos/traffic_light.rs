//! Traffic Light Controller
//!
//! Drives the stock three-lamp traffic light through a queued sequence
//! of moves while a monitor callback prints every step.
//!
//! Key concepts:
//! - Requests are queued and run one at a time on the transition worker
//! - Closing shows amber before red
//! - Observers see every step and may query the controller
//!
//! Run with: cargo run --example traffic_light

use signalbox::config::ControllerOptions;
use signalbox::traffic::{self, TrafficSignal};
use signalbox::{ControllerHandle, Notification};

fn monitor(
    light: &ControllerHandle<TrafficSignal>,
    notification: &Notification<TrafficSignal>,
) -> Result<(), signalbox::ObserverError> {
    println!("State: {} ({})", notification.state, notification.pattern);
    if notification.is_settled() {
        println!("  settled, {} request(s) still queued", light.pending());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Traffic Light Controller ===\n");

    // Quarter-speed dwell keeps the demo short.
    let options = ControllerOptions {
        time_scale: 0.25,
        ..ControllerOptions::default()
    };
    let light = traffic::traffic_light().options(options).spawn()?;
    light.add_callback(monitor);

    println!("Initial state: {}\n", light.state());

    light.close()?;
    light.open()?;
    light.close()?;
    light.warning()?;
    light.off()?;

    light.wait_idle()?;

    println!("\nVisited: {:?}", light.history().path());
    println!("\n=== Example Complete ===");
    Ok(())
}
