//! Small static domain lexicon used for keyword tag derivation and type
//! inference (spec §4.3, §4.4; SPEC_FULL.md §4 NEW).
//!
//! These lists are heuristics, not ground truth — every entry point that
//! consumes them also accepts an explicit override (declared tags, an
//! explicit [`DocumentType`](financebuddy_core::DocumentType)).

/// Finance/securities domain terms used to derive content-based tags.
pub const DOMAIN_TERMS: &[&str] = &[
    "option",
    "derivative",
    "custodian",
    "prospectus",
    "suitability",
    "margin",
    "equity",
    "bond",
    "dividend",
    "portfolio",
    "hedge",
    "volatility",
    "liquidity",
    "broker",
    "dealer",
    "fiduciary",
    "underwriter",
    "arbitrage",
    "municipal",
    "treasury",
];

/// Markers that suggest a document is a question/answer pair.
const QA_PATH_MARKERS: &[&str] = &["qa"];
const QA_CONTENT_MARKERS: &[&str] = &["question:", "q:", "answer:", "a:"];

/// Markers that suggest a document is regulatory text.
const REGULATION_MARKERS: &[&str] = &["regulation", "rule", "section", "shall", "sec"];

/// Derive content-keyword tags by lowercasing `content` and checking which
/// [`DOMAIN_TERMS`] appear as whole words.
#[must_use]
pub fn derive_keyword_tags(content: &str) -> Vec<String> {
    let lowered = content.to_lowercase();
    DOMAIN_TERMS
        .iter()
        .filter(|term| contains_word(&lowered, term))
        .map(|t| (*t).to_string())
        .collect()
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.split(|c: char| !c.is_alphanumeric()).any(|w| w == word)
}

/// Infer a document's type from its path and content when no explicit type
/// was supplied. This is a heuristic (spec §9 Open Question i); callers
/// should prefer an explicit override when one is available.
#[must_use]
pub fn infer_document_type_markers(path: &str, content: &str) -> InferredType {
    let path_lower = path.to_lowercase();
    let content_lower = content.to_lowercase();

    if QA_PATH_MARKERS.iter().any(|m| path_lower.contains(m))
        || QA_CONTENT_MARKERS.iter().any(|m| content_lower.contains(m))
    {
        return InferredType::QaPair;
    }
    if REGULATION_MARKERS
        .iter()
        .any(|m| path_lower.contains(m) || content_lower.contains(m))
    {
        return InferredType::Regulation;
    }
    InferredType::Textbook
}

/// Outcome of heuristic type inference, kept distinct from
/// [`financebuddy_core::DocumentType`] so a caller can log/trace that a
/// value was inferred rather than declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredType {
    Textbook,
    QaPair,
    Regulation,
}

impl From<InferredType> for financebuddy_core::DocumentType {
    fn from(value: InferredType) -> Self {
        match value {
            InferredType::Textbook => Self::Textbook,
            InferredType::QaPair => Self::QaPair,
            InferredType::Regulation => Self::Regulation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_tags_only_for_whole_word_matches() {
        let tags = derive_keyword_tags("A put option is a type of derivative contract.");
        assert!(tags.contains(&"option".to_string()));
        assert!(tags.contains(&"derivative".to_string()));
        assert!(!tags.contains(&"bond".to_string()));
    }

    #[test]
    fn infers_qa_pair_from_path() {
        let t = infer_document_type_markers("bank/qa/options_qa.md", "Some content");
        assert_eq!(t, InferredType::QaPair);
    }

    #[test]
    fn infers_qa_pair_from_content_markers() {
        let t = infer_document_type_markers("bank/misc.md", "Q: What is a put?\nA: ...");
        assert_eq!(t, InferredType::QaPair);
    }

    #[test]
    fn infers_regulation_from_content() {
        let t = infer_document_type_markers(
            "bank/misc.md",
            "Section 12(a) shall apply to all registered broker-dealers.",
        );
        assert_eq!(t, InferredType::Regulation);
    }

    #[test]
    fn defaults_to_textbook() {
        let t = infer_document_type_markers("bank/chapter1.md", "Options are contracts...");
        assert_eq!(t, InferredType::Textbook);
    }
}
