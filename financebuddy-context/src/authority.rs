//! Source credibility table for the reranker's authority term (spec §4.5).

use financebuddy_core::Document;

/// Static authority scores for known issuer/authority strings.
const AUTHORITY_TABLE: &[(&str, f32)] = &[
    ("SEC", 1.0),
    ("FINRA", 0.95),
    ("TREASURY", 0.95),
    ("TEXTBOOK", 0.6),
    ("UNKNOWN", 0.3),
];

/// Compute the authority score `A` in `[0, 1]` for a document, from its
/// metadata's `authority` field (looked up in [`AUTHORITY_TABLE`]) plus a
/// `verified: true` boost, per spec §4.5.
#[must_use]
pub fn authority_score(document: &Document) -> f32 {
    let declared = document
        .metadata
        .get("authority")
        .and_then(|v| v.as_str())
        .map(str::to_uppercase);

    let base = declared
        .as_deref()
        .and_then(|key| AUTHORITY_TABLE.iter().find(|(k, _)| *k == key))
        .map_or(0.3, |(_, score)| *score);

    let verified = document
        .metadata
        .get("verified")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);

    if verified {
        (base + 0.1).min(1.0)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use financebuddy_core::{DocumentId, DocumentType};
    use serde_json::json;

    fn doc_with_metadata(authority: Option<&str>, verified: bool) -> Document {
        let mut d = Document::new(DocumentId::from_raw("d"), "t", "c", DocumentType::Regulation, "s");
        if let Some(a) = authority {
            d.metadata.insert("authority".to_string(), json!(a));
        }
        d.metadata.insert("verified".to_string(), json!(verified));
        d
    }

    #[test]
    fn sec_authority_scores_highest() {
        let d = doc_with_metadata(Some("SEC"), false);
        assert!((authority_score(&d) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_authority_defaults_low() {
        let d = doc_with_metadata(None, false);
        assert!((authority_score(&d) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn verified_boosts_score_but_caps_at_one() {
        let d = doc_with_metadata(Some("SEC"), true);
        assert!(authority_score(&d) <= 1.0);
    }
}
