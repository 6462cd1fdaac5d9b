//! Damage-based trigger.

use crate::agents::AgentView;

use super::AngerTrigger;

/// Fires the first tick after the agent was damaged, once.
#[derive(Debug, Clone, Default)]
pub struct OnDamaged {
    fired: bool,
}

impl OnDamaged {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AngerTrigger for OnDamaged {
    fn name(&self) -> &'static str {
        "OnDamaged"
    }

    fn should_trigger(&mut self, view: &AgentView) -> bool {
        if self.fired || !view.was_damaged {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_on_damage() {
        let mut trigger = OnDamaged::new();
        let calm = AgentView::default();
        let hurt = AgentView {
            was_damaged: true,
            ..Default::default()
        };

        assert!(!trigger.should_trigger(&calm));
        assert!(trigger.should_trigger(&hurt));
        assert!(!trigger.should_trigger(&hurt));
        assert!(trigger.has_fired());
    }
}
