//! BM25-style keyword scoring for hybrid retrieval (spec §4.5(b)).
//!
//! A normalized, capped variant is used rather than raw BM25 so its output
//! can be linearly blended with a `[0, 1]` vector similarity score.

use financebuddy_core::Document;
use std::collections::HashMap;

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "of", "to", "in", "on", "and", "or", "for",
    "with", "as", "by", "at", "from", "that", "this", "it", "be", "has", "have", "not",
];

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOPWORDS.contains(w))
        .map(ToString::to_string)
        .collect()
}

/// Compute a normalized, capped BM25-style keyword score in `[0, 1]` for a
/// single document against a query, based on term-frequency counts over
/// `title + content`. This is a simplified scorer (no corpus-wide IDF) so
/// it can run per-candidate without a separate index build step; hybrid
/// retrieval (see `crate::retriever`) applies this over the same candidate
/// pool fetched from the vector store rather than maintaining a second,
/// separately-indexed copy of the corpus.
#[must_use]
pub fn keyword_score(query: &str, document: &Document) -> f32 {
    let query_terms = tokenize(query);
    if query_terms.is_empty() {
        return 0.0;
    }
    let haystack = format!("{} {}", document.title, document.content);
    let doc_terms = tokenize(&haystack);
    if doc_terms.is_empty() {
        return 0.0;
    }

    let mut term_freq: HashMap<&str, usize> = HashMap::new();
    for term in &doc_terms {
        *term_freq.entry(term.as_str()).or_insert(0) += 1;
    }

    let matches: usize = query_terms
        .iter()
        .map(|t| term_freq.get(t.as_str()).copied().unwrap_or(0))
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let score = matches as f32 / query_terms.len() as f32;
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use financebuddy_core::{DocumentId, DocumentType};

    fn doc(content: &str) -> Document {
        Document::new(DocumentId::from_raw("d"), "title", content, DocumentType::Textbook, "s")
    }

    #[test]
    fn exact_term_match_scores_above_zero() {
        let d = doc("A call option conveys the right to buy an asset.");
        assert!(keyword_score("call option", &d) > 0.0);
    }

    #[test]
    fn unrelated_query_scores_zero() {
        let d = doc("A call option conveys the right to buy an asset.");
        assert_eq!(keyword_score("municipal bond yield", &d), 0.0);
    }

    #[test]
    fn score_is_capped_at_one() {
        let d = doc("option option option option option option");
        assert!(keyword_score("option", &d) <= 1.0);
    }

    #[test]
    fn empty_query_scores_zero() {
        let d = doc("content here");
        assert_eq!(keyword_score("", &d), 0.0);
    }
}
