//! Debate orchestrator — drives the four-persona phase loop.
//!
//! Owns the phase state machine and decides which role is invoked
//! next. Execution is strictly sequential: one outstanding gateway
//! call at a time, turns appended in order, the gateway call being
//! the only suspension point.
//!
//! ```text
//! Idle → Opening → IterativeCritique ⟲ → SynthesisValidation → Complete
//!          │             │                      │
//!          └─────────────┴──────────────────────┴── gateway failure → Failed
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::conversation::{AgentRole, Conversation, Turn};
use crate::corpus::Corpus;
use crate::gateway::{AgentGateway, GatewayError};
use crate::parser::{self, ParserConfig};
use crate::state::{DebatePhase, DebateSession};
use crate::termination::{TerminationDecision, TerminationEvaluator, DIRECTIVE_LABEL};

/// Configuration consumed by the core. Constructed once and passed
/// in; immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateConfig {
    /// Hard ceiling on critique rounds. Guarantees termination even
    /// if no persona ever emits a usable directive.
    pub max_rounds: u32,
    /// Section label the termination evaluator scans for.
    pub directive_label: String,
    /// Parser knobs.
    pub parser: ParserConfig,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_rounds: 4,
            directive_label: DIRECTIVE_LABEL.to_string(),
            parser: ParserConfig::default(),
        }
    }
}

/// Synchronous progress observer, notified after each successfully
/// appended turn with the conversation snapshot so far. Never invoked
/// with a partially constructed turn; the snapshot must be treated as
/// immutable.
pub trait DebateObserver {
    fn on_turn(&mut self, conversation: &[Turn]);
}

/// Error from the debate orchestrator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DebateError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("transition failed: {0}")]
    Transition(String),
}

/// Result of a completed (or failed) run. Partial progress is always
/// preserved; no failure is silently swallowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateOutcome {
    /// Ordered transcript up to completion or failure.
    pub conversation: Vec<Turn>,
    /// Session snapshot with phase and transition history.
    pub session: DebateSession,
    /// Critique rounds executed.
    pub rounds_completed: u32,
    /// Last directive decision from the Critic, if any was reached.
    pub final_decision: Option<TerminationDecision>,
    pub success: bool,
    /// Gateway failure description when `success` is false.
    pub error: Option<String>,
}

impl DebateOutcome {
    /// Compact summary line.
    pub fn summary_line(&self) -> String {
        let status = if self.success { "COMPLETE" } else { "FAILED" };
        format!(
            "[{}] {} turns | {} rounds | id={}",
            status,
            self.conversation.len(),
            self.rounds_completed,
            self.session.id
        )
    }
}

fn advance(
    session: &mut DebateSession,
    to: DebatePhase,
    reason: &str,
) -> Result<(), DebateError> {
    session
        .transition(to, reason)
        .map_err(|e| DebateError::Transition(e.to_string()))
}

/// The debate orchestrator.
///
/// Usage: construct with a gateway, call [`Orchestrator::run`] once
/// per debate. Per-run state (session, conversation) is created inside
/// `run` and returned in the outcome, so one orchestrator can serve
/// sequential runs.
pub struct Orchestrator {
    gateway: Box<dyn AgentGateway>,
    config: DebateConfig,
    evaluator: TerminationEvaluator,
}

impl Orchestrator {
    /// Create an orchestrator with default configuration.
    pub fn new(gateway: Box<dyn AgentGateway>) -> Self {
        Self::with_config(gateway, DebateConfig::default())
    }

    /// Create an orchestrator with custom configuration.
    pub fn with_config(gateway: Box<dyn AgentGateway>, config: DebateConfig) -> Self {
        let evaluator = TerminationEvaluator::new(&config.directive_label);
        Self {
            gateway,
            config,
            evaluator,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    /// Run one debate over the corpus.
    ///
    /// On gateway failure the state machine stops immediately: no turn
    /// is appended for the failed call and the outcome carries the
    /// partial conversation with `success: false`.
    pub async fn run(
        &self,
        corpus: &Corpus,
        mut observer: Option<&mut dyn DebateObserver>,
    ) -> DebateOutcome {
        // max_rounds is an integer >= 1 by contract; a zero from a
        // hand-edited config must not skip the critique phase.
        let mut session = DebateSession::new(self.config.max_rounds.max(1));
        let mut conversation = Conversation::new();
        let mut final_decision = None;

        info!(
            id = %session.id,
            max_rounds = session.max_rounds,
            documents = corpus.len(),
            "debate run starting"
        );

        let result = self
            .drive(
                corpus,
                &mut session,
                &mut conversation,
                &mut final_decision,
                &mut observer,
            )
            .await;

        let rounds_completed = session.current_round;
        match result {
            Ok(()) => {
                info!(
                    id = %session.id,
                    turns = conversation.len(),
                    rounds = rounds_completed,
                    "debate complete"
                );
                DebateOutcome {
                    conversation: conversation.into_turns(),
                    session,
                    rounds_completed,
                    final_decision,
                    success: true,
                    error: None,
                }
            }
            Err(err) => {
                warn!(id = %session.id, error = %err, "debate run failed");
                if session.phase.can_transition() {
                    if let Err(te) = session.transition(DebatePhase::Failed, &err.to_string()) {
                        warn!(error = %te, "could not record failure transition");
                    }
                }
                DebateOutcome {
                    conversation: conversation.into_turns(),
                    session,
                    rounds_completed,
                    final_decision,
                    success: false,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    async fn drive(
        &self,
        corpus: &Corpus,
        session: &mut DebateSession,
        conversation: &mut Conversation,
        final_decision: &mut Option<TerminationDecision>,
        observer: &mut Option<&mut dyn DebateObserver>,
    ) -> Result<(), DebateError> {
        session
            .start()
            .map_err(|e| DebateError::Transition(e.to_string()))?;

        // Opening: Researcher analyzes the corpus once.
        self.take_turn(AgentRole::Researcher, corpus, conversation, observer)
            .await?;
        advance(session, DebatePhase::IterativeCritique, "opening analysis complete")?;

        // Iterative critique: Critic each round, Researcher in between
        // while the directive (or the budget) allows.
        let reason = loop {
            let round = session.begin_round();
            let critic_turn = self
                .take_turn(AgentRole::Critic, corpus, conversation, observer)
                .await?;

            let decision = self.evaluator.evaluate(&critic_turn);
            info!(round, status = %decision.status, reason = %decision.reason, "critic directive evaluated");
            let satisfied = decision.is_satisfied();
            *final_decision = Some(decision);

            if satisfied {
                break "critic satisfied";
            }
            if !session.has_rounds_remaining() {
                info!(round, max_rounds = session.max_rounds, "round budget exhausted");
                break "round budget exhausted";
            }

            self.take_turn(AgentRole::Researcher, corpus, conversation, observer)
                .await?;
        };
        advance(session, DebatePhase::SynthesisValidation, reason)?;

        // Synthesis and validation run unconditionally, once each.
        self.take_turn(AgentRole::Synthesizer, corpus, conversation, observer)
            .await?;
        self.take_turn(AgentRole::Validator, corpus, conversation, observer)
            .await?;
        advance(session, DebatePhase::Complete, "synthesis validated")?;

        Ok(())
    }

    /// Invoke one persona, parse, append, and notify the observer.
    async fn take_turn(
        &self,
        role: AgentRole,
        corpus: &Corpus,
        conversation: &mut Conversation,
        observer: &mut Option<&mut dyn DebateObserver>,
    ) -> Result<Turn, DebateError> {
        let raw = self
            .gateway
            .invoke(role, corpus, conversation.turns())
            .await?;
        let sections = parser::parse_with(&raw, &self.config.parser);
        let turn = conversation.append(role, raw, sections).clone();
        debug!(
            turn = turn.turn_index,
            role = %role,
            sections = turn.section_count(),
            "turn appended"
        );

        if let Some(obs) = observer.as_mut() {
            obs.on_turn(conversation.turns());
        }
        Ok(turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Gateway that replays a fixed script of responses.
    struct ScriptedGateway {
        responses: Mutex<VecDeque<Result<String, GatewayError>>>,
    }

    impl ScriptedGateway {
        fn new(responses: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
            }
        }
    }

    #[async_trait]
    impl AgentGateway for ScriptedGateway {
        async fn invoke(
            &self,
            _role: AgentRole,
            _corpus: &Corpus,
            _history: &[Turn],
        ) -> Result<String, GatewayError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Unavailable("script exhausted".to_string())))
        }
    }

    fn researcher_text() -> Result<String, GatewayError> {
        Ok("## Key Patterns\n- lab beats field accuracy\n## Research Gaps\n- no shared baseline".to_string())
    }

    fn critic_continue() -> Result<String, GatewayError> {
        Ok("## Methodological Concerns\n- apples to oranges\n## Debate Status\nCONTINUE - baseline question open".to_string())
    }

    fn critic_satisfied() -> Result<String, GatewayError> {
        Ok("## Methodological Concerns\n- none remaining\n## Debate Status\nSATISFIED - contexts acknowledged".to_string())
    }

    fn synthesizer_text() -> Result<String, GatewayError> {
        Ok("## Points of Agreement\n- both dimensions matter".to_string())
    }

    fn validator_text() -> Result<String, GatewayError> {
        Ok("## Verified Claims\n- accuracy drop documented\n## Confidence Assessment\n- Overall confidence: High".to_string())
    }

    #[tokio::test]
    async fn test_single_round_satisfied() {
        let gateway = ScriptedGateway::new(vec![
            researcher_text(),
            critic_satisfied(),
            synthesizer_text(),
            validator_text(),
        ]);
        let orch = Orchestrator::new(Box::new(gateway));
        let outcome = orch.run(&Corpus::default(), None).await;

        assert!(outcome.success);
        assert_eq!(outcome.session.phase, DebatePhase::Complete);
        assert_eq!(outcome.rounds_completed, 1);
        assert_eq!(outcome.conversation.len(), 4);

        let roles: Vec<AgentRole> = outcome.conversation.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                AgentRole::Researcher,
                AgentRole::Critic,
                AgentRole::Synthesizer,
                AgentRole::Validator
            ]
        );
        assert!(outcome.final_decision.as_ref().unwrap().is_satisfied());
        assert!(outcome.summary_line().contains("COMPLETE"));
    }

    #[tokio::test]
    async fn test_second_round_convergence() {
        let gateway = ScriptedGateway::new(vec![
            researcher_text(),
            critic_continue(),
            researcher_text(),
            critic_satisfied(),
            synthesizer_text(),
            validator_text(),
        ]);
        let orch = Orchestrator::new(Box::new(gateway));
        let outcome = orch.run(&Corpus::default(), None).await;

        assert!(outcome.success);
        assert_eq!(outcome.rounds_completed, 2);
        assert_eq!(outcome.conversation.len(), 6);
    }

    #[tokio::test]
    async fn test_gateway_failure_preserves_partial_progress() {
        let gateway = ScriptedGateway::new(vec![
            researcher_text(),
            Err(GatewayError::Unavailable("connection reset".to_string())),
        ]);
        let orch = Orchestrator::new(Box::new(gateway));
        let outcome = orch.run(&Corpus::default(), None).await;

        assert!(!outcome.success);
        assert_eq!(outcome.conversation.len(), 1);
        assert_eq!(outcome.session.phase, DebatePhase::Failed);
        assert!(outcome.error.as_ref().unwrap().contains("connection reset"));
        assert!(outcome.summary_line().contains("FAILED"));
    }

    #[tokio::test]
    async fn test_observer_sees_every_appended_turn() {
        struct CountingObserver {
            snapshots: Vec<usize>,
        }
        impl DebateObserver for CountingObserver {
            fn on_turn(&mut self, conversation: &[Turn]) {
                // Every turn in the snapshot must be fully constructed.
                for (i, turn) in conversation.iter().enumerate() {
                    assert_eq!(turn.turn_index as usize, i + 1);
                }
                self.snapshots.push(conversation.len());
            }
        }

        let gateway = ScriptedGateway::new(vec![
            researcher_text(),
            critic_satisfied(),
            synthesizer_text(),
            validator_text(),
        ]);
        let orch = Orchestrator::new(Box::new(gateway));
        let mut observer = CountingObserver { snapshots: vec![] };
        let outcome = orch.run(&Corpus::default(), Some(&mut observer)).await;

        assert!(outcome.success);
        assert_eq!(observer.snapshots, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_zero_max_rounds_is_clamped() {
        let config = DebateConfig {
            max_rounds: 0,
            ..Default::default()
        };
        let gateway = ScriptedGateway::new(vec![
            researcher_text(),
            critic_continue(),
            synthesizer_text(),
            validator_text(),
        ]);
        let orch = Orchestrator::with_config(Box::new(gateway), config);
        let outcome = orch.run(&Corpus::default(), None).await;

        assert!(outcome.success);
        assert_eq!(outcome.rounds_completed, 1);
    }

    #[test]
    fn test_config_default() {
        let config = DebateConfig::default();
        assert_eq!(config.max_rounds, 4);
        assert_eq!(config.directive_label, DIRECTIVE_LABEL);
    }

    #[test]
    fn test_debate_error_display() {
        let err = DebateError::Gateway(GatewayError::RateLimited);
        assert!(err.to_string().contains("rate limited"));

        let err = DebateError::Transition("bad edge".to_string());
        assert!(err.to_string().contains("bad edge"));
    }
}
