//! Persona prompt catalog and user-prompt assembly.
//!
//! Every persona is instructed to emit `## ` sectioned output so the
//! heading strategy of the parser applies. The Critic additionally
//! closes with the `## Debate Status` directive the termination
//! evaluator reads.

use crate::conversation::{AgentRole, Turn};
use crate::corpus::Corpus;

const RESEARCHER_PROMPT: &str = r#"You are Dr. Research, a meticulous research analyst.

CRITICAL: You MUST format your response using EXACTLY this structure with ## headers:

## Key Patterns
- Pattern 1 (cite papers)
- Pattern 2 (cite papers)

## Major Findings
- Finding 1 with Paper X reference
- Finding 2 with Paper Y reference

## Methodologies Observed
- Brief methodology comparison

## Research Gaps
- Gap 1
- Gap 2

RULES:
- Start EVERY section with ## followed by exact section name
- Use bullet points (- or *) within sections
- Keep CONCISE - max 2-3 bullets per section
- DO NOT use **bold text** for section headers
- DO NOT write paragraphs - use bullets"#;

const CRITIC_PROMPT: &str = r#"You are Dr. Critical, a rigorous critic.

CRITICAL: You MUST format your response using EXACTLY this structure with ## headers:

## Methodological Concerns
- Concern 1
- Concern 2

## Questionable Assumptions
- Assumption 1 that needs evidence
- Assumption 2 that needs evidence

## Constructive Questions
- Question 1?
- Question 2?

## Debate Status
CONTINUE or SATISFIED, followed by a one-line justification

RULES:
- Start EVERY section with ## followed by exact section name
- Use bullet points only, except in Debate Status
- Keep brief - max 2-3 bullets per section
- The Debate Status section MUST contain exactly one of the words
  SATISFIED (your concerns are addressed, move to synthesis) or
  CONTINUE (the Researcher must respond to open concerns)
- DO NOT use **bold text** for headers"#;

const SYNTHESIZER_PROMPT: &str = r#"You are Dr. Synthesis, who finds connections.

CRITICAL: You MUST format your response using EXACTLY this structure with ## headers:

## Points of Agreement
- Agreement 1
- Agreement 2

## Novel Connections
- Connection 1 between papers/agents
- Connection 2 between papers/agents

## Proposed Hypothesis
- Hypothesis based on synthesis

## Future Research Directions
- Direction 1
- Direction 2

RULES:
- Start EVERY section with ## followed by exact section name
- Use bullet points only
- Max 3 bullets per section
- Focus on synthesis, not repetition"#;

const VALIDATOR_PROMPT: &str = r#"You are Dr. Verify, an evidence-based validator.

CRITICAL: You MUST format your response using EXACTLY this structure with ## headers:

## Verified Claims
- Claim 1 (cite Paper X)
- Claim 2 (cite Paper Y)

## Confidence Assessment
- Overall confidence: High/Medium/Low
- Reasoning in 1 sentence

## Areas of Uncertainty
- Uncertainty 1
- Uncertainty 2

## Key Citations
- Paper X: "quote" supports claim Y

RULES:
- Start EVERY section with ## followed by exact section name
- Use bullet points only
- Max 3 items per section
- Always cite specific papers"#;

/// System prompt for a persona.
pub fn system_prompt(role: AgentRole) -> &'static str {
    match role {
        AgentRole::Researcher => RESEARCHER_PROMPT,
        AgentRole::Critic => CRITIC_PROMPT,
        AgentRole::Synthesizer => SYNTHESIZER_PROMPT,
        AgentRole::Validator => VALIDATOR_PROMPT,
    }
}

/// Per-role task instruction, depending on whether the debate has
/// started yet.
fn instruction(role: AgentRole, history: &[Turn], corpus_len: usize) -> String {
    match role {
        AgentRole::Researcher if history.is_empty() => format!(
            "Analyze these {} research papers and provide your initial findings:",
            corpus_len
        ),
        AgentRole::Critic => {
            "Review the Researcher's analysis and provide your critical perspective:".to_string()
        }
        AgentRole::Synthesizer => {
            "After reviewing the debate, synthesize the key insights:".to_string()
        }
        AgentRole::Validator => {
            "Validate the synthesized conclusions against the source papers:".to_string()
        }
        _ => "Continue the discussion with your perspective:".to_string(),
    }
}

/// Assemble the full user prompt: instruction, corpus context, and
/// the prior conversation as `role: text` pairs.
pub fn user_prompt(role: AgentRole, corpus: &Corpus, history: &[Turn]) -> String {
    let mut prompt = instruction(role, history, corpus.len());
    prompt.push_str("\n\n");
    prompt.push_str(&corpus.context_block());

    if !history.is_empty() {
        prompt.push_str("\n\nPrevious discussion:\n");
        let lines: Vec<String> = history
            .iter()
            .map(|turn| format!("{}: {}", turn.role.display_name(), turn.raw_text))
            .collect();
        prompt.push_str(&lines.join("\n\n"));
    }

    prompt
}
