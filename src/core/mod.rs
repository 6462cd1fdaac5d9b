//! Core module - clocks, events, and the system ordering everything else
//! plugs into.

mod clock;
mod events;
mod plugin;
mod rng;

pub use clock::Countdown;
pub use events::*;
pub use plugin::{AgentSet, CorePlugin};
pub use rng::SimulationRng;
