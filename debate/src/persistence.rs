//! Debate persistence — checkpoint and resume for interrupted runs.
//!
//! Serializes session and transcript to JSON for checkpointing, and
//! restores with integrity validation so a corrupted or hand-edited
//! checkpoint cannot resume into an impossible state.

use serde::{Deserialize, Serialize};

use crate::conversation::{AgentRole, Turn};
use crate::state::DebateSession;

/// A complete debate checkpoint for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateCheckpoint {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// The session state at checkpoint time.
    pub session: DebateSession,
    /// Transcript accumulated so far.
    pub turns: Vec<Turn>,
    /// Checkpoint reason.
    pub reason: String,
    /// Monotonic checkpoint sequence number.
    pub sequence: u32,
}

impl DebateCheckpoint {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new checkpoint.
    pub fn new(session: &DebateSession, turns: &[Turn], reason: &str, sequence: u32) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            session: session.clone(),
            turns: turns.to_vec(),
            reason: reason.to_string(),
            sequence,
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(self).map_err(|e| PersistenceError::SerializeFailed {
            reason: e.to_string(),
        })
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let checkpoint: Self =
            serde_json::from_str(json).map_err(|e| PersistenceError::DeserializeFailed {
                reason: e.to_string(),
            })?;

        if checkpoint.version > Self::CURRENT_VERSION {
            return Err(PersistenceError::VersionMismatch {
                expected: Self::CURRENT_VERSION,
                found: checkpoint.version,
            });
        }

        Ok(checkpoint)
    }
}

/// Error during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Serialization failed.
    SerializeFailed { reason: String },
    /// Deserialization failed.
    DeserializeFailed { reason: String },
    /// Schema version mismatch.
    VersionMismatch { expected: u32, found: u32 },
    /// Integrity check failed on restore.
    IntegrityCheckFailed { reason: String },
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SerializeFailed { reason } => write!(f, "serialize failed: {}", reason),
            Self::DeserializeFailed { reason } => write!(f, "deserialize failed: {}", reason),
            Self::VersionMismatch { expected, found } => {
                write!(f, "version mismatch: expected {}, found {}", expected, found)
            }
            Self::IntegrityCheckFailed { reason } => {
                write!(f, "integrity check failed: {}", reason)
            }
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Integrity check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityStatus {
    /// Checkpoint is valid and can be resumed.
    Valid,
    /// Checkpoint has minor issues but is recoverable.
    Recoverable { warnings: Vec<String> },
    /// Checkpoint is corrupted and cannot be used.
    Corrupted { errors: Vec<String> },
}

impl IntegrityStatus {
    /// Whether resume is safe.
    pub fn can_resume(&self) -> bool {
        matches!(self, Self::Valid | Self::Recoverable { .. })
    }
}

/// Validate a checkpoint's integrity before resuming.
pub fn validate_checkpoint(checkpoint: &DebateCheckpoint) -> IntegrityStatus {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    // Check version
    if checkpoint.version > DebateCheckpoint::CURRENT_VERSION {
        errors.push(format!(
            "version {} > current {}",
            checkpoint.version,
            DebateCheckpoint::CURRENT_VERSION
        ));
    }

    // Turn indices must be 1..=N with no gaps
    for (i, turn) in checkpoint.turns.iter().enumerate() {
        if turn.turn_index as usize != i + 1 {
            errors.push(format!(
                "turn index {} at position {} breaks contiguity",
                turn.turn_index, i
            ));
            break;
        }
    }

    // Round counter can't run past the budget
    if checkpoint.session.current_round > checkpoint.session.max_rounds {
        errors.push(format!(
            "current_round {} exceeds max_rounds {}",
            checkpoint.session.current_round, checkpoint.session.max_rounds
        ));
    }

    // Critic turn count should track the round counter
    let critic_turns = checkpoint
        .turns
        .iter()
        .filter(|t| t.role == AgentRole::Critic)
        .count() as u32;
    if critic_turns > checkpoint.session.current_round {
        warnings.push(format!(
            "{} critic turns recorded for round {}",
            critic_turns, checkpoint.session.current_round
        ));
    }

    // Check transition history consistency
    if let Some(last_transition) = checkpoint.session.transitions.last() {
        if last_transition.to != checkpoint.session.phase {
            errors.push(format!(
                "last transition target {:?} doesn't match current phase {:?}",
                last_transition.to, checkpoint.session.phase
            ));
        }
    }

    if !errors.is_empty() {
        IntegrityStatus::Corrupted { errors }
    } else if !warnings.is_empty() {
        IntegrityStatus::Recoverable { warnings }
    } else {
        IntegrityStatus::Valid
    }
}

/// Manages checkpointing for a debate session.
pub struct CheckpointManager {
    /// Current checkpoint sequence number.
    sequence: u32,
    /// Maximum checkpoints to retain.
    max_retained: usize,
    /// Stored checkpoints (most recent last).
    checkpoints: Vec<DebateCheckpoint>,
}

impl CheckpointManager {
    /// Create a new checkpoint manager.
    pub fn new(max_retained: usize) -> Self {
        Self {
            sequence: 0,
            max_retained,
            checkpoints: Vec::new(),
        }
    }

    /// Create a checkpoint of the current debate state.
    pub fn checkpoint(
        &mut self,
        session: &DebateSession,
        turns: &[Turn],
        reason: &str,
    ) -> DebateCheckpoint {
        self.sequence += 1;
        let cp = DebateCheckpoint::new(session, turns, reason, self.sequence);

        self.checkpoints.push(cp.clone());

        // Evict old checkpoints
        while self.checkpoints.len() > self.max_retained {
            self.checkpoints.remove(0);
        }

        cp
    }

    /// Get the latest checkpoint.
    pub fn latest(&self) -> Option<&DebateCheckpoint> {
        self.checkpoints.last()
    }

    /// Get a checkpoint by sequence number.
    pub fn get_by_sequence(&self, seq: u32) -> Option<&DebateCheckpoint> {
        self.checkpoints.iter().find(|cp| cp.sequence == seq)
    }

    /// Number of stored checkpoints.
    pub fn count(&self) -> usize {
        self.checkpoints.len()
    }

    /// Current sequence number.
    pub fn current_sequence(&self) -> u32 {
        self.sequence
    }

    /// Restore from a JSON checkpoint, validating integrity.
    pub fn restore(json: &str) -> Result<(DebateCheckpoint, IntegrityStatus), PersistenceError> {
        let checkpoint = DebateCheckpoint::from_json(json)?;
        let status = validate_checkpoint(&checkpoint);

        if let IntegrityStatus::Corrupted { ref errors } = status {
            return Err(PersistenceError::IntegrityCheckFailed {
                reason: errors.join("; "),
            });
        }

        Ok((checkpoint, status))
    }
}
