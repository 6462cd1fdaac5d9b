//! Proximity-over-time trigger.

use crate::agents::AgentView;
use crate::core::Countdown;

use super::AngerTrigger;

/// Fires once the target has stayed within `radius` for `required_time`
/// seconds. Stepping outside (or the target vanishing) starts over.
#[derive(Debug, Clone)]
pub struct ProximityDuration {
    radius: f32,
    required_time: f32,
    remaining: Countdown,
}

impl ProximityDuration {
    pub fn new(radius: f32, required_time: f32) -> Self {
        Self {
            radius,
            required_time,
            remaining: Countdown::new(required_time),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl AngerTrigger for ProximityDuration {
    fn name(&self) -> &'static str {
        "ProximityDuration"
    }

    fn should_trigger(&mut self, view: &AgentView) -> bool {
        let inside = view
            .distance_to_target()
            .is_some_and(|distance| distance <= self.radius);

        if !inside {
            self.remaining.reset(self.required_time);
            return false;
        }

        self.remaining.tick(view.delta);
        if self.remaining.is_expired() {
            self.remaining.reset(self.required_time);
            return true;
        }
        false
    }

    fn reset(&mut self) {
        self.remaining.reset(self.required_time);
    }
}
