//! Debate state machine — phases, transitions, and session tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Phase of a debate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebatePhase {
    /// Run created but not started.
    Idle,
    /// Researcher produces the initial analysis.
    Opening,
    /// Critic and Researcher alternate until the directive says stop
    /// or the round budget runs out.
    IterativeCritique,
    /// Synthesizer then Validator, exactly once each.
    SynthesisValidation,
    /// Run finished with a full transcript.
    Complete,
    /// Gateway failure ended the run; partial transcript preserved.
    Failed,
}

impl DebatePhase {
    /// Whether this is a terminal phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// Whether this phase allows transition to a new phase.
    pub fn can_transition(self) -> bool {
        !self.is_terminal()
    }

    /// Valid transitions from this phase.
    pub fn valid_transitions(self) -> &'static [DebatePhase] {
        match self {
            Self::Idle => &[Self::Opening, Self::Failed],
            Self::Opening => &[Self::IterativeCritique, Self::Failed],
            Self::IterativeCritique => &[Self::SynthesisValidation, Self::Failed],
            Self::SynthesisValidation => &[Self::Complete, Self::Failed],
            Self::Complete | Self::Failed => &[],
        }
    }
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Opening => write!(f, "opening"),
            Self::IterativeCritique => write!(f, "iterative_critique"),
            Self::SynthesisValidation => write!(f, "synthesis_validation"),
            Self::Complete => write!(f, "complete"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A phase transition record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateTransition {
    /// Previous phase.
    pub from: DebatePhase,
    /// New phase.
    pub to: DebatePhase,
    /// When the transition occurred.
    pub timestamp: DateTime<Utc>,
    /// Reason for the transition.
    pub reason: String,
}

/// Error for invalid state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: DebatePhase,
    pub to: DebatePhase,
    pub reason: String,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid transition {} -> {}: {}",
            self.from, self.to, self.reason
        )
    }
}

impl std::error::Error for TransitionError {}

/// Per-run session state — created at run start, owned by the
/// orchestrator, discarded when the run ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSession {
    /// Unique run identifier.
    pub id: String,
    /// Current phase.
    pub phase: DebatePhase,
    /// Completed or in-progress critique rounds (1-indexed once the
    /// first Critic turn starts).
    pub current_round: u32,
    /// Hard round ceiling; guarantees termination regardless of the
    /// directive signal.
    pub max_rounds: u32,
    /// Transition history.
    pub transitions: Vec<DebateTransition>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl DebateSession {
    /// Create a new session in `Idle`.
    pub fn new(max_rounds: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            phase: DebatePhase::Idle,
            current_round: 0,
            max_rounds,
            transitions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Transition to a new phase with a reason.
    pub fn transition(&mut self, to: DebatePhase, reason: &str) -> Result<(), TransitionError> {
        if !self.phase.valid_transitions().contains(&to) {
            return Err(TransitionError {
                from: self.phase,
                to,
                reason: format!(
                    "not a valid transition (allowed: {:?})",
                    self.phase.valid_transitions()
                ),
            });
        }

        self.transitions.push(DebateTransition {
            from: self.phase,
            to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.phase = to;
        Ok(())
    }

    /// Start the run (Idle → Opening).
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.transition(DebatePhase::Opening, "debate started")
    }

    /// Begin the next critique round and return its number.
    pub fn begin_round(&mut self) -> u32 {
        self.current_round += 1;
        self.current_round
    }

    /// Whether the round budget allows another round.
    pub fn has_rounds_remaining(&self) -> bool {
        self.current_round < self.max_rounds
    }

    /// Whether the run has ended.
    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Compact status line.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] round {}/{} | id={}",
            self.phase, self.current_round, self.max_rounds, self.id
        )
    }
}
