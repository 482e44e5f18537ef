//! Multi-Agent Research Debate Engine
//!
//! Four fixed personas debate a corpus of research documents through a
//! bounded, strictly sequential conversation: a Researcher opens, a
//! Critic and the Researcher iterate, then a Synthesizer and a
//! Validator close the run.
//!
//! # Debate Flow
//!
//! ```text
//! Idle → Opening → IterativeCritique → SynthesisValidation → Complete
//!           │            │  ⟲                  │
//!           │   (Critic / Researcher           │
//!           │    until SATISFIED or            │
//!           │    max rounds)                   │
//!           └────────────┴─────────────────────┴─ gateway failure → Failed
//! ```
//!
//! Responses come back as free-form text; a cascading section parser
//! recovers structure when present, and the termination evaluator reads
//! the Critic's directive section to decide whether another round is
//! warranted.

pub mod conversation;
pub mod corpus;
pub mod gateway;
pub mod orchestrator;
pub mod parser;
pub mod persistence;
pub mod state;
pub mod termination;

pub use conversation::{AgentRole, Conversation, Turn};
pub use corpus::{Corpus, DocumentRecord};
pub use gateway::{AgentGateway, GatewayError, HttpAgentGateway, HttpGatewayConfig};
pub use orchestrator::{DebateConfig, DebateError, DebateObserver, DebateOutcome, Orchestrator};
pub use parser::{parse, parse_with, ParserConfig};
pub use persistence::{CheckpointManager, DebateCheckpoint, IntegrityStatus, PersistenceError};
pub use state::{DebatePhase, DebateSession, DebateTransition, TransitionError};
pub use termination::{TerminationDecision, TerminationEvaluator, TerminationStatus};
