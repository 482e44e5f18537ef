//! Transcript fixtures — realistic persona responses in the formats
//! models actually produce, run through the full pipeline.
//!
//! Models frequently ignore formatting instructions; these fixtures
//! exercise the parser's fallback strategies and the termination
//! evaluator's fail-open behavior against that reality.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use debate::{
    parse, AgentGateway, AgentRole, Corpus, DebateConfig, DebatePhase, DocumentRecord,
    GatewayError, Orchestrator, TerminationStatus, Turn,
};

struct ScriptedGateway {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedGateway {
    fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
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
            .ok_or_else(|| GatewayError::Unavailable("fixture exhausted".to_string()))
    }
}

fn fixture_corpus() -> Corpus {
    Corpus::new(vec![DocumentRecord {
        title: "Replication Rates in Behavioral Studies".to_string(),
        abstract_text: "Surveys replication outcomes across 120 studies".to_string(),
        methodology: "Meta-analysis".to_string(),
        key_findings: "41% of effects replicate at original magnitude".to_string(),
        results: "Replication correlates with sample size".to_string(),
        limitations: "English-language journals only".to_string(),
    }])
}

// ── Fixture: well-formed heading responses ─────────────────────────

const RESEARCHER_HEADINGS: &str = "\
## Key Patterns
- Replication success tracks sample size (Paper 1)
- Effect magnitudes shrink on replication

## Major Findings
- Only 41% of effects replicate at original magnitude

## Research Gaps
- Non-English literature is entirely absent";

// ── Fixture: bold-label fallback (model ignored ## instruction) ────

const CRITIC_BOLD_LABELS: &str = "\
**Methodological Concerns:**
The meta-analysis pools heterogeneous designs without weighting for study quality, which inflates the apparent replication failure rate.

**Questionable Assumptions:**
Treating original magnitude as the bar for replication ignores regression to the mean entirely.

**Debate Status:**
CONTINUE - the pooling concern needs a direct response before synthesis is credible.";

// ── Fixture: numbered bold items ───────────────────────────────────

const RESEARCHER_NUMBERED: &str = "\
1. **Pooling Response:** The original paper stratifies by design in its appendix; quality-weighted rates move from 41% to 47%, which does not change the headline conclusion.
2. **Magnitude Bar:** Agreed that magnitude is a strict bar; sign-and-significance replication sits at 62%, and both figures are worth reporting.";

const CRITIC_SATISFIED_BOLD: &str = "\
**Remaining Concerns:**
None that block synthesis; the stratified rates address the pooling objection directly.

**Debate Status:**
SATISFIED - both the weighted and unweighted rates are now on the table.";

const SYNTHESIZER_HEADINGS: &str = "\
## Points of Agreement
- Replication rates depend heavily on the chosen bar

## Proposed Hypothesis
- Reporting both magnitude and sign-level rates would reduce framing disputes";

const VALIDATOR_HEADINGS: &str = "\
## Verified Claims
- 41% magnitude-level replication (Paper 1)

## Confidence Assessment
- Overall confidence: High
- The stratified appendix figures were checked against the source";

// ── Fixture: unstructured prose (no strategy matches) ──────────────

const CRITIC_PROSE: &str = "\
I have looked at the researcher's summary and broadly it seems reasonable, \
though I would want to see the stratified numbers before going further. \
There is not much more to say at this stage.";

#[tokio::test]
async fn test_mixed_format_transcript_runs_to_completion() {
    let gateway = ScriptedGateway::new(vec![
        RESEARCHER_HEADINGS,
        CRITIC_BOLD_LABELS,
        RESEARCHER_NUMBERED,
        CRITIC_SATISFIED_BOLD,
        SYNTHESIZER_HEADINGS,
        VALIDATOR_HEADINGS,
    ]);
    let orch = Orchestrator::new(Box::new(gateway));
    let outcome = orch.run(&fixture_corpus(), None).await;

    assert!(outcome.success);
    assert_eq!(outcome.session.phase, DebatePhase::Complete);
    assert_eq!(outcome.rounds_completed, 2);
    assert_eq!(outcome.conversation.len(), 6);

    // Bold-label fallback recovered the directive
    let first_critic = &outcome.conversation[1];
    assert_eq!(first_critic.role, AgentRole::Critic);
    let directive = first_critic.section("Debate Status").unwrap();
    assert!(directive.contains("CONTINUE"));

    // Numbered items recovered from the rebuttal
    let rebuttal = &outcome.conversation[2];
    assert!(rebuttal.section("Pooling Response").is_some());
    assert!(rebuttal.section("Magnitude Bar").is_some());

    assert_eq!(
        outcome.final_decision.unwrap().status,
        TerminationStatus::Satisfied
    );
}

#[tokio::test]
async fn test_prose_critic_fails_open_to_round_budget() {
    let config = DebateConfig {
        max_rounds: 2,
        ..Default::default()
    };
    let gateway = ScriptedGateway::new(vec![
        RESEARCHER_HEADINGS,
        CRITIC_PROSE,
        RESEARCHER_NUMBERED,
        CRITIC_PROSE,
        SYNTHESIZER_HEADINGS,
        VALIDATOR_HEADINGS,
    ]);
    let orch = Orchestrator::with_config(Box::new(gateway), config);
    let outcome = orch.run(&fixture_corpus(), None).await;

    // An unparseable critic never satisfies; the budget closes the run
    assert!(outcome.success);
    assert_eq!(outcome.rounds_completed, 2);
    assert_eq!(
        outcome.final_decision.unwrap().status,
        TerminationStatus::NeedsMoreRounds
    );

    // The prose turns carry no recovered structure
    let first_critic = &outcome.conversation[1];
    assert!(first_critic.sections.is_none());
    assert_eq!(first_critic.raw_text, CRITIC_PROSE);
}

// ── Parser fixtures standalone ─────────────────────────────────────

#[test]
fn test_heading_fixture_sections() {
    let sections = parse(RESEARCHER_HEADINGS).unwrap();
    assert_eq!(sections.len(), 3);
    assert!(sections["Key Patterns"].contains("sample size"));
    assert!(sections["Research Gaps"].contains("Non-English"));
}

#[test]
fn test_bold_label_fixture_sections() {
    let sections = parse(CRITIC_BOLD_LABELS).unwrap();
    assert_eq!(sections.len(), 3);
    assert!(sections["Methodological Concerns"].contains("heterogeneous designs"));
    assert!(sections["Debate Status"].starts_with("CONTINUE"));
}

#[test]
fn test_numbered_fixture_sections() {
    let sections = parse(RESEARCHER_NUMBERED).unwrap();
    assert_eq!(sections.len(), 2);
    assert!(sections["Pooling Response"].contains("stratifies by design"));
}

#[test]
fn test_prose_fixture_yields_no_sections() {
    assert!(parse(CRITIC_PROSE).is_none());
}

#[test]
fn test_heading_strategy_wins_over_embedded_bold_labels() {
    let mixed = "## Summary\n**Note:** this bold label lives inside a heading section and must not split it\n## Verdict\nfine";
    let sections = parse(mixed).unwrap();
    assert_eq!(sections.len(), 2);
    assert!(sections["Summary"].contains("**Note:**"));
}
