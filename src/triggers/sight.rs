//! Sight-based triggers.

use crate::agents::AgentView;
use crate::core::Countdown;

use super::AngerTrigger;

/// Fires the first tick the target is perceived, then never again.
#[derive(Debug, Clone, Default)]
pub struct AlwaysOnSight {
    fired: bool,
}

impl AlwaysOnSight {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AngerTrigger for AlwaysOnSight {
    fn name(&self) -> &'static str {
        "AlwaysOnSight"
    }

    fn should_trigger(&mut self, view: &AgentView) -> bool {
        if self.fired || !view.perceives_target {
            return false;
        }
        self.fired = true;
        true
    }

    fn reset(&mut self) {
        self.fired = false;
    }

    fn has_fired(&self) -> bool {
        self.fired
    }
}

/// Fires once the target has been perceived without interruption for
/// `required_time` seconds. Losing sight for a single tick starts over,
/// and so does firing.
#[derive(Debug, Clone)]
pub struct SustainedSight {
    required_time: f32,
    remaining: Countdown,
}

impl SustainedSight {
    pub fn new(required_time: f32) -> Self {
        Self {
            required_time,
            remaining: Countdown::new(required_time),
        }
    }
}

impl AngerTrigger for SustainedSight {
    fn name(&self) -> &'static str {
        "SustainedSight"
    }

    fn should_trigger(&mut self, view: &AgentView) -> bool {
        if !view.perceives_target {
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
