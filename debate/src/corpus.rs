//! Corpus input — externally supplied research document records.
//!
//! The debate engine consumes a corpus; it never produces or mutates
//! one. Ingestion and search live outside this crate.

use serde::{Deserialize, Serialize};

/// One research document record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub methodology: String,
    pub key_findings: String,
    pub results: String,
    pub limitations: String,
}

/// Ordered list of document records the debate reasons about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    pub documents: Vec<DocumentRecord>,
}

impl Corpus {
    /// Create a corpus from ordered document records.
    pub fn new(documents: Vec<DocumentRecord>) -> Self {
        Self { documents }
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Render the corpus as the numbered context block sent to the
    /// generative service. Documents are separated by `---` rules.
    pub fn context_block(&self) -> String {
        self.documents
            .iter()
            .enumerate()
            .map(|(idx, doc)| {
                format!(
                    "Paper {}: {}\nAbstract: {}\nMethodology: {}\nKey Findings: {}\nResults: {}\nLimitations: {}",
                    idx + 1,
                    doc.title,
                    doc.abstract_text,
                    doc.methodology,
                    doc.key_findings,
                    doc.results,
                    doc.limitations
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }
}
