//! Behavior layer: the per-bird state machine and the flight envelope guard.
//!
//! [`BirdBrain::evaluate`] is a pull-style API returning a [`BehaviorDecision`];
//! [`BehaviorDecision::dispatch`] replays the same decision against an
//! [`IntentSink`] for callers that prefer callbacks.

mod brain;
mod decision;
mod envelope;

pub use brain::{
    scheduled_outcome, BehaviorInput, BirdBrain, ScheduledOutcome, ALERT_CLEAR_RATIO,
    DECISION_DELAY_MAX, DECISION_DELAY_MIN, FLEE_DISTANCE_RATIO, SOAR_CHANCE,
};
pub use decision::{BehaviorDecision, IntentSink, TransitionReason};
pub use envelope::{EnvelopeBreach, FlightEnvelopeGuard, MIN_TAKEOFF_HEADROOM};

#[cfg(test)]
pub(crate) mod test_rng {
    use rand::RngCore;
    use std::collections::VecDeque;

    /// Replays scripted uniform draws so tests can force specific branches.
    ///
    /// Each value `v` in `[0, 1)` is encoded so that both `gen::<f32>()` and
    /// `gen_range(a..b)` observe (approximately) `v`. Once the script runs out
    /// the last value repeats.
    pub struct ScriptedRng {
        values: VecDeque<f32>,
        last: f32,
    }

    impl ScriptedRng {
        pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
            Self {
                values: values.into_iter().collect(),
                last: 0.0,
            }
        }

        pub fn constant(value: f32) -> Self {
            Self {
                values: VecDeque::new(),
                last: value,
            }
        }

        fn next_value(&mut self) -> f32 {
            if let Some(value) = self.values.pop_front() {
                self.last = value;
            }
            self.last
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            let value = self.next_value().clamp(0.0, 0.999_999);
            ((value * (1u32 << 24) as f32) as u32) << 8
        }

        fn next_u64(&mut self) -> u64 {
            let high = self.next_u32() as u64;
            high << 32
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(4) {
                let bytes = self.next_u32().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }
}
