//! Frame-delta driven countdowns.
//!
//! Every timed rule in the framework (action cooldowns, the hostility
//! window, trigger accumulators, corpse timers, searches) counts down
//! through [`Countdown`], so the "remaining -= dt; if remaining <= 0"
//! bookkeeping lives in exactly one place.

use std::time::Duration;

use bevy::prelude::*;

/// A one-shot countdown clamped at zero.
///
/// Backed by a [`Timer`] in [`TimerMode::Once`], which keeps the
/// elapsed time clamped to the duration once it finishes.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    timer: Timer,
}

impl Countdown {
    /// A countdown with nothing left on it.
    pub fn ready() -> Self {
        Self::default()
    }

    /// A countdown starting at `seconds`.
    pub fn new(seconds: f32) -> Self {
        Self {
            timer: Timer::from_seconds(sanitize(seconds), TimerMode::Once),
        }
    }

    /// Advance by a frame delta. Non-positive or non-finite deltas are ignored.
    pub fn tick(&mut self, delta_seconds: f32) {
        if delta_seconds.is_finite() && delta_seconds > 0.0 {
            self.timer.tick(Duration::from_secs_f32(delta_seconds));
        }
    }

    pub fn is_expired(&self) -> bool {
        self.timer.remaining().is_zero()
    }

    /// Restart with a new duration.
    pub fn reset(&mut self, seconds: f32) {
        self.timer = Timer::from_seconds(sanitize(seconds), TimerMode::Once);
    }

    /// Drop any remaining time.
    pub fn clear(&mut self) {
        self.timer = Timer::default();
    }

    pub fn remaining_secs(&self) -> f32 {
        self.timer.remaining_secs()
    }

    pub fn duration_secs(&self) -> f32 {
        self.timer.duration().as_secs_f32()
    }

    /// Fraction of the duration already spent, 1.0 when expired.
    pub fn fraction_elapsed(&self) -> f32 {
        if self.timer.duration().is_zero() {
            1.0
        } else {
            self.timer.fraction()
        }
    }
}

fn sanitize(seconds: f32) -> f32 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_countdown_is_expired() {
        let countdown = Countdown::ready();
        assert!(countdown.is_expired());
        assert_eq!(countdown.remaining_secs(), 0.0);
    }

    #[test]
    fn ticks_down_and_clamps_at_zero() {
        let mut countdown = Countdown::new(1.0);
        countdown.tick(0.25);
        assert!(!countdown.is_expired());
        assert!((countdown.remaining_secs() - 0.75).abs() < 1e-6);

        countdown.tick(5.0);
        assert!(countdown.is_expired());
        assert_eq!(countdown.remaining_secs(), 0.0);
    }

    #[test]
    fn reset_restarts_with_new_duration() {
        let mut countdown = Countdown::new(0.5);
        countdown.tick(1.0);
        assert!(countdown.is_expired());

        countdown.reset(2.0);
        assert!(!countdown.is_expired());
        assert!((countdown.remaining_secs() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn ignores_bad_input() {
        let mut countdown = Countdown::new(1.0);
        countdown.tick(-1.0);
        countdown.tick(f32::NAN);
        assert!((countdown.remaining_secs() - 1.0).abs() < 1e-6);

        countdown.reset(-3.0);
        assert!(countdown.is_expired());
        countdown.reset(f32::INFINITY);
        assert!(countdown.is_expired());
    }

    #[test]
    fn clear_expires_immediately() {
        let mut countdown = Countdown::new(4.0);
        countdown.clear();
        assert!(countdown.is_expired());
    }
}
