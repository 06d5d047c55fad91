use bevy::prelude::*;

use crate::components::{BirdState, FlightMode};

/// Why a bird changed state. Carried on every transition so listeners
/// (animation, audio, debug overlays) can react without re-deriving it.
#[derive(Reflect, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionReason {
    /// Random draw on the decision schedule
    Scheduled,
    /// Player came inside the alert distance
    PlayerNearby,
    /// Player came inside the flee distance
    Flee,
    /// Player moved far enough away while alert
    AlertCleared,
    /// Climb-out reached the bottom of the cruise band
    TakeoffComplete,
    SoaringStarted,
    SoaringEnded,
    /// Cruised above the species band after the minimum flight time
    CruiseCeiling,
    /// Airborne for longer than the envelope allows
    FlightTimeExceeded,
    /// Crossed the envelope ceiling
    AltitudeExceeded,
    /// An emergency landing already in progress
    EmergencyLanding,
    Touchdown,
}

/// Outcome of one behavior evaluation.
///
/// `reason` is `Some` exactly when the decision asks for something to happen;
/// a decision without a reason leaves the bird as it is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BehaviorDecision {
    pub next_state: BirdState,
    pub next_flight_mode: FlightMode,
    pub start_flight: bool,
    pub start_landing: bool,
    pub emergency_landing: bool,
    pub reason: Option<TransitionReason>,
}

impl BehaviorDecision {
    /// Keep the current state and mode
    pub fn hold(state: BirdState, mode: FlightMode) -> Self {
        Self {
            next_state: state,
            next_flight_mode: mode,
            start_flight: false,
            start_landing: false,
            emergency_landing: false,
            reason: None,
        }
    }

    pub fn change(state: BirdState, mode: FlightMode, reason: TransitionReason) -> Self {
        Self {
            reason: Some(reason),
            ..Self::hold(state, mode)
        }
    }

    pub fn take_off(reason: TransitionReason) -> Self {
        Self {
            start_flight: true,
            ..Self::change(BirdState::TakingOff, FlightMode::Ascending, reason)
        }
    }

    pub fn land(emergency: bool, reason: TransitionReason) -> Self {
        let mode = if emergency {
            FlightMode::Descending
        } else {
            FlightMode::LandingApproach
        };
        Self {
            start_landing: true,
            emergency_landing: emergency,
            ..Self::change(BirdState::Landing, mode, reason)
        }
    }

    pub fn is_hold(&self) -> bool {
        self.reason.is_none()
    }

    /// Replays the decision as calls on `sink`. Landing outranks flight,
    /// which outranks a plain state change.
    pub fn dispatch<S: IntentSink>(&self, sink: &mut S) {
        let Some(reason) = self.reason else {
            return;
        };

        if self.start_landing {
            sink.start_landing(self.emergency_landing, reason);
        } else if self.start_flight {
            sink.start_flight(reason);
        } else {
            sink.change_state(self.next_state, self.next_flight_mode, reason);
        }
    }
}

/// Callback-style receiver for behavior intents.
///
/// Implemented by the creature that owns the runtime state, so all mutation
/// happens in the owner after the decision has been computed.
pub trait IntentSink {
    fn change_state(&mut self, state: BirdState, mode: FlightMode, reason: TransitionReason);
    fn start_flight(&mut self, reason: TransitionReason);
    fn start_landing(&mut self, emergency: bool, reason: TransitionReason);
    fn force_grounding(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<String>,
    }

    impl IntentSink for RecordingSink {
        fn change_state(&mut self, state: BirdState, mode: FlightMode, _reason: TransitionReason) {
            self.calls.push(format!("change {:?} {:?}", state, mode));
        }

        fn start_flight(&mut self, _reason: TransitionReason) {
            self.calls.push("flight".to_string());
        }

        fn start_landing(&mut self, emergency: bool, _reason: TransitionReason) {
            self.calls.push(format!("landing {}", emergency));
        }

        fn force_grounding(&mut self) {
            self.calls.push("ground".to_string());
        }
    }

    #[test]
    fn test_hold_dispatches_nothing() {
        let mut sink = RecordingSink::default();
        BehaviorDecision::hold(BirdState::Idle, FlightMode::Grounded).dispatch(&mut sink);
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn test_landing_outranks_other_intents() {
        let mut sink = RecordingSink::default();
        let mut decision = BehaviorDecision::land(true, TransitionReason::AltitudeExceeded);
        decision.start_flight = true;
        decision.dispatch(&mut sink);
        assert_eq!(sink.calls, vec!["landing true".to_string()]);
    }

    #[test]
    fn test_state_change_dispatch() {
        let mut sink = RecordingSink::default();
        BehaviorDecision::change(BirdState::Alert, FlightMode::Grounded, TransitionReason::PlayerNearby)
            .dispatch(&mut sink);
        assert_eq!(sink.calls, vec!["change Alert Grounded".to_string()]);
    }

    #[test]
    fn test_take_off_targets_ascending() {
        let decision = BehaviorDecision::take_off(TransitionReason::Flee);
        assert!(decision.start_flight);
        assert_eq!(decision.next_state, BirdState::TakingOff);
        assert_eq!(decision.next_flight_mode, FlightMode::Ascending);
    }
}
