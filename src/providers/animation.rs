//! Buffered animation commands.

use super::AnimationSink;

/// One animation parameter change requested by an agent.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationCommand {
    Trigger(String),
    Bool(String, bool),
}

/// Records animation commands until the host drains them.
///
/// Repeated identical bools are collapsed, since agents re-assert
/// `Running`/`Idle` every frame while chasing or standing.
#[derive(Debug, Clone, Default)]
pub struct AnimationQueue {
    pending: Vec<AnimationCommand>,
}

impl AnimationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[AnimationCommand] {
        &self.pending
    }
}

impl AnimationSink for AnimationQueue {
    fn set_trigger(&mut self, name: &str) {
        self.pending.push(AnimationCommand::Trigger(name.to_string()));
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        let duplicate = self
            .pending
            .iter()
            .rev()
            .find_map(|command| match command {
                AnimationCommand::Bool(existing, v) if existing == name => Some(*v),
                _ => None,
            })
            == Some(value);
        if !duplicate {
            self.pending.push(AnimationCommand::Bool(name.to_string(), value));
        }
    }

    fn take_pending(&mut self) -> Vec<AnimationCommand> {
        std::mem::take(&mut self.pending)
    }
}
