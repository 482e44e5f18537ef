//! Conversation log — append-only ordered record of persona turns.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the four fixed debate personas.
///
/// The set is closed: prompt selection and dispatch match exhaustively
/// on this enum, so adding a persona is a compile-time change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Analyzes the corpus and surfaces patterns and findings.
    Researcher,
    /// Challenges the analysis and emits the termination directive.
    Critic,
    /// Merges the debate into a collective insight.
    Synthesizer,
    /// Fact-checks the synthesis against the corpus.
    Validator,
}

impl AgentRole {
    /// All roles in invocation order of a minimal run.
    pub const ALL: [AgentRole; 4] = [
        Self::Researcher,
        Self::Critic,
        Self::Synthesizer,
        Self::Validator,
    ];

    /// Persona display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Researcher => "Dr. Research",
            Self::Critic => "Dr. Critical",
            Self::Synthesizer => "Dr. Synthesis",
            Self::Validator => "Dr. Verify",
        }
    }

    /// Short description of the persona's job in the debate.
    pub fn description(self) -> &'static str {
        match self {
            Self::Researcher => "Meticulous analyst — patterns, findings, research gaps",
            Self::Critic => "Rigorous skeptic — challenges assumptions, signals convergence",
            Self::Synthesizer => "Connector — agreements, novel connections, hypotheses",
            Self::Validator => "Evidence checker — verifies claims against the corpus",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Researcher => write!(f, "researcher"),
            Self::Critic => write!(f, "critic"),
            Self::Synthesizer => write!(f, "synthesizer"),
            Self::Validator => write!(f, "validator"),
        }
    }
}

/// One appended contribution to the debate.
///
/// Immutable once appended. `sections` is present only when the
/// cascading parser matched something in `raw_text`; unstructured
/// output is kept verbatim with `sections: None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Persona that produced this turn.
    pub role: AgentRole,
    /// 1-based position in the conversation at append time.
    pub turn_index: u32,
    /// Verbatim persona output.
    pub raw_text: String,
    /// Named sections extracted from `raw_text`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<BTreeMap<String, String>>,
    /// When the turn was appended.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Look up a section body by label.
    pub fn section(&self, label: &str) -> Option<&str> {
        self.sections
            .as_ref()
            .and_then(|s| s.get(label))
            .map(String::as_str)
    }

    /// Number of parsed sections (0 when unstructured).
    pub fn section_count(&self) -> usize {
        self.sections.as_ref().map_or(0, BTreeMap::len)
    }
}

/// Append-only ordered record of turns.
///
/// Exclusively owned and mutated by the orchestrator during a run.
/// `append` assigns indices internally, so turn indices always form
/// the contiguous sequence `1..=len()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn and return a reference to it.
    pub fn append(
        &mut self,
        role: AgentRole,
        raw_text: String,
        sections: Option<BTreeMap<String, String>>,
    ) -> &Turn {
        let turn = Turn {
            role,
            turn_index: self.turns.len() as u32 + 1,
            raw_text,
            sections,
            timestamp: Utc::now(),
        };
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    /// Ordered view of all turns so far. Observers must treat the
    /// slice as an immutable snapshot.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Most recent turn by the given role.
    pub fn last_of(&self, role: AgentRole) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == role)
    }

    /// Number of turns by the given role.
    pub fn count_of(&self, role: AgentRole) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }

    /// Total number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the conversation has no turns yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Consume the log, yielding the ordered turns.
    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }
}
