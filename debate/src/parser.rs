//! Cascading section parser — free-form persona text → named sections.
//!
//! Three extraction strategies are tried in fixed priority; the first
//! one that yields any section wins outright and the rest are skipped:
//!
//! 1. `## Heading` markers (the format the prompts ask for)
//! 2. `**Emphasized label:**` lines
//! 3. `1. **Enumerated label:** body` list items
//!
//! No match is not an error — the turn is kept as unstructured text.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default minimum trimmed body length for the emphasis and enumerated
/// strategies. Short incidental bold text is not a section.
pub const DEFAULT_MIN_BODY_LEN: usize = 20;

/// Tunable parser knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Bodies at or below this length are dropped by the emphasis and
    /// enumerated strategies. The heading strategy keeps everything:
    /// an explicit `## ` marker is already a deliberate signal.
    pub min_body_len: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            min_body_len: DEFAULT_MIN_BODY_LEN,
        }
    }
}

fn emphasis_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*\*(.+?):\*\*\s*$").expect("valid regex"))
}

fn numbered_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s+\*\*(.+?):\*\*\s*(.*)$").expect("valid regex"))
}

fn numbered_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s").expect("valid regex"))
}

/// Parse raw persona output with default configuration.
pub fn parse(raw: &str) -> Option<BTreeMap<String, String>> {
    parse_with(raw, &ParserConfig::default())
}

/// Parse raw persona output into a label → body map.
///
/// Returns `None` when no strategy matches; callers keep the raw text
/// unchanged in that case.
pub fn parse_with(raw: &str, config: &ParserConfig) -> Option<BTreeMap<String, String>> {
    let sections = heading_sections(raw);
    if !sections.is_empty() {
        return Some(sections);
    }

    let sections = emphasis_sections(raw, config.min_body_len);
    if !sections.is_empty() {
        return Some(sections);
    }

    let sections = enumerated_sections(raw, config.min_body_len);
    if !sections.is_empty() {
        return Some(sections);
    }

    None
}

/// Strategy 1: `## Label` headings. The body is everything between a
/// heading and the next one (or end of text). Later duplicate labels
/// overwrite earlier ones.
fn heading_sections(raw: &str) -> BTreeMap<String, String> {
    let mut sections = BTreeMap::new();
    let mut label: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("## ") {
            if let Some(prev) = label.take() {
                sections.insert(prev, body.join("\n").trim().to_string());
            }
            body.clear();
            let trimmed = rest.trim();
            if !trimmed.is_empty() {
                label = Some(trimmed.to_string());
            }
        } else if label.is_some() {
            body.push(line);
        }
    }
    if let Some(prev) = label {
        sections.insert(prev, body.join("\n").trim().to_string());
    }

    sections
}

/// Strategy 2: `**Label:**` lines. The body runs until the next
/// emphasized line or a numbered-list marker.
fn emphasis_sections(raw: &str, min_body_len: usize) -> BTreeMap<String, String> {
    let mut sections = BTreeMap::new();
    let mut label: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    let mut flush = |label: &mut Option<String>, body: &mut Vec<&str>| {
        if let Some(prev) = label.take() {
            let content = body.join("\n").trim().to_string();
            if content.len() > min_body_len {
                sections.insert(prev, content);
            }
        }
        body.clear();
    };

    for line in raw.lines() {
        if let Some(caps) = emphasis_label_re().captures(line.trim_end()) {
            flush(&mut label, &mut body);
            label = Some(caps[1].trim().to_string());
        } else if line.starts_with("**") || numbered_line_re().is_match(line) {
            // Emphasis without the label shape, or a list item: the
            // current section ends here.
            flush(&mut label, &mut body);
        } else if label.is_some() {
            body.push(line);
        }
    }
    flush(&mut label, &mut body);

    sections
}

/// Strategy 3: `1. **Label:** body` numbered items. The body runs
/// until the next numbered item.
fn enumerated_sections(raw: &str, min_body_len: usize) -> BTreeMap<String, String> {
    let mut sections = BTreeMap::new();
    let mut label: Option<String> = None;
    let mut body: Vec<String> = Vec::new();

    let mut flush = |label: &mut Option<String>, body: &mut Vec<String>| {
        if let Some(prev) = label.take() {
            let content = body.join("\n").trim().to_string();
            if content.len() > min_body_len {
                sections.insert(prev, content);
            }
        }
        body.clear();
    };

    for line in raw.lines() {
        if let Some(caps) = numbered_item_re().captures(line) {
            flush(&mut label, &mut body);
            label = Some(caps[1].trim().to_string());
            let rest = caps[2].trim();
            if !rest.is_empty() {
                body.push(rest.to_string());
            }
        } else if numbered_line_re().is_match(line) {
            flush(&mut label, &mut body);
        } else if label.is_some() {
            body.push(line.to_string());
        }
    }
    flush(&mut label, &mut body);

    sections
}
