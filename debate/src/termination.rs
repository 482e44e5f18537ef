//! Termination evaluation — reads the directive embedded in Critic turns.
//!
//! The Critic is asked to close every response with a directive
//! section carrying a status token. Absence of the directive never
//! implies satisfaction; ambiguity resolves toward more scrutiny.

use serde::{Deserialize, Serialize};

use crate::conversation::Turn;

/// Section label the Critic embeds its directive under.
pub const DIRECTIVE_LABEL: &str = "Debate Status";

/// Token signaling the Critic's concerns are addressed.
pub const TOKEN_SATISFIED: &str = "SATISFIED";

/// Token requesting another researcher/critic round.
pub const TOKEN_CONTINUE: &str = "CONTINUE";

/// Whether the debate has converged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationStatus {
    /// The Critic's concerns are addressed.
    Satisfied,
    /// Another round is needed (default when the signal is missing or
    /// ambiguous).
    NeedsMoreRounds,
}

impl std::fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfied => write!(f, "satisfied"),
            Self::NeedsMoreRounds => write!(f, "needs_more_rounds"),
        }
    }
}

/// Decision derived from one Critic turn. Not persisted as its own
/// entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationDecision {
    pub status: TerminationStatus,
    /// Remainder of the directive section body, if any.
    pub reason: String,
}

impl TerminationDecision {
    /// Whether debate can move on to synthesis.
    pub fn is_satisfied(&self) -> bool {
        self.status == TerminationStatus::Satisfied
    }

    fn needs_more(reason: &str) -> Self {
        Self {
            status: TerminationStatus::NeedsMoreRounds,
            reason: reason.to_string(),
        }
    }
}

/// Evaluates the directive section of a Critic turn.
#[derive(Debug, Clone)]
pub struct TerminationEvaluator {
    directive_label: String,
}

impl Default for TerminationEvaluator {
    fn default() -> Self {
        Self::new(DIRECTIVE_LABEL)
    }
}

impl TerminationEvaluator {
    /// Create an evaluator that looks for the given section label.
    pub fn new(directive_label: &str) -> Self {
        Self {
            directive_label: directive_label.to_string(),
        }
    }

    /// The label this evaluator scans for.
    pub fn directive_label(&self) -> &str {
        &self.directive_label
    }

    /// Derive a decision from one turn's sections.
    ///
    /// Pure over the turn; meaningful only for Critic turns. Missing
    /// sections, a missing directive, or both tokens at once all
    /// default to `NeedsMoreRounds`.
    pub fn evaluate(&self, turn: &Turn) -> TerminationDecision {
        let Some(body) = turn.section(&self.directive_label) else {
            return TerminationDecision::needs_more("directive section absent");
        };

        let has_satisfied = body.contains(TOKEN_SATISFIED);
        let has_continue = body.contains(TOKEN_CONTINUE);

        let status = if has_satisfied && !has_continue {
            TerminationStatus::Satisfied
        } else {
            TerminationStatus::NeedsMoreRounds
        };

        let mut reason = body.to_string();
        for token in [TOKEN_SATISFIED, TOKEN_CONTINUE] {
            reason = reason.replacen(token, "", 1);
        }
        let reason = reason
            .trim()
            .trim_start_matches(['-', ':', '.'])
            .trim()
            .to_string();

        TerminationDecision { status, reason }
    }
}
