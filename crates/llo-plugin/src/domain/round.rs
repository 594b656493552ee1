//! Per-round phase tracker
//!
//! The host engine owns the driving loop. This tracker gives it (and the
//! integration harness) a deterministic view of where one round stands.
//!
//! State Machine:
//! ```text
//! [AWAITING_QUERY] ──query──→ [AWAITING_OBSERVATION] ──observation──→ [AWAITING_QUORUM]
//!                                                                          │
//!                                          validated >= 2f+1 ──────────────┘
//!                                                  │
//!                                                  ↓
//!                                          [OUTCOME_READY] ──outcome──→ ... ──reports──→ [REPORTS_EMITTED]
//! ```

use serde::{Deserialize, Serialize};

/// Phase of one round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoundPhase {
    #[default]
    AwaitingQuery,
    AwaitingObservation,
    /// Collecting validated observations
    AwaitingQuorum { validated: usize },
    /// Quorum reached; outcome derivation may run
    OutcomeReady { validated: usize },
    /// Outcome derived and turned into reports. Terminal.
    ReportsEmitted,
}

/// Events that move a round forward
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundEvent {
    QueryEmitted,
    ObservationEmitted,
    ObservationValidated,
    ObservationRejected,
    OutcomeDerived,
    ReportsEmitted,
}

/// Tracker for a single sequence number
#[derive(Debug)]
pub struct RoundTracker {
    seq_nr: u64,
    quorum: usize,
    phase: RoundPhase,
    outcome_derived: bool,
    rejected: usize,
}

impl RoundTracker {
    /// Create a tracker for `seq_nr` requiring `quorum` validated observations
    pub fn new(seq_nr: u64, quorum: usize) -> Self {
        Self {
            seq_nr,
            quorum,
            phase: RoundPhase::AwaitingQuery,
            outcome_derived: false,
            rejected: 0,
        }
    }

    pub fn seq_nr(&self) -> u64 {
        self.seq_nr
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn outcome_derived(&self) -> bool {
        self.outcome_derived
    }

    /// Whether outcome derivation may run
    pub fn has_quorum(&self) -> bool {
        matches!(self.phase, RoundPhase::OutcomeReady { .. })
    }

    /// Process an event and transition state
    pub fn process_event(&mut self, event: RoundEvent) -> RoundPhase {
        let next = self.next_phase(event);

        match (self.phase, event) {
            (RoundPhase::AwaitingQuorum { .. }, RoundEvent::ObservationRejected)
            | (RoundPhase::OutcomeReady { .. }, RoundEvent::ObservationRejected) => {
                self.rejected += 1;
            }
            (RoundPhase::OutcomeReady { .. }, RoundEvent::OutcomeDerived) => {
                self.outcome_derived = true;
            }
            _ => {}
        }

        self.phase = next;
        next
    }

    /// Pure transition function; events out of order leave the phase unchanged
    fn next_phase(&self, event: RoundEvent) -> RoundPhase {
        match (self.phase, event) {
            (RoundPhase::AwaitingQuery, RoundEvent::QueryEmitted) => {
                RoundPhase::AwaitingObservation
            }
            (RoundPhase::AwaitingObservation, RoundEvent::ObservationEmitted) => {
                self.after_validation(0)
            }

            (RoundPhase::AwaitingQuorum { validated }, RoundEvent::ObservationValidated) => {
                self.after_validation(validated + 1)
            }
            // Late observations are still validated but do not change the phase
            (RoundPhase::OutcomeReady { validated }, RoundEvent::ObservationValidated) => {
                RoundPhase::OutcomeReady {
                    validated: validated + 1,
                }
            }

            (RoundPhase::OutcomeReady { .. }, RoundEvent::ReportsEmitted)
                if self.outcome_derived =>
            {
                RoundPhase::ReportsEmitted
            }

            (phase, _) => phase,
        }
    }

    fn after_validation(&self, validated: usize) -> RoundPhase {
        if validated >= self.quorum {
            RoundPhase::OutcomeReady { validated }
        } else {
            RoundPhase::AwaitingQuorum { validated }
        }
    }
}
