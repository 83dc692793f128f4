//! Central configuration management for FinanceBuddy: layers environment
//! variables over documented defaults and validates at startup (spec §6).

use financebuddy_core::error::{Classified, ErrorKind};
use financebuddy_core::Difficulty;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building or validating [`FinanceBuddyConfig`].
///
/// Every variant is a `Fatal` classification: configuration problems are
/// meant to stop startup, not degrade a request in flight.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The underlying `config` crate failed to build a layered config.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A loaded value violates one of this crate's validation rules.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Classified for ConfigError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Fatal
    }
}

/// Result alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Four non-negative reranking weights that should sum to at most 1.0.
///
/// Named `w_s` (base score), `w_a` (authority), `w_r` (recency), `w_t`
/// (type preference) to match spec §4.5. These are documented defaults,
/// not tuned constants — only relative ordering should be relied upon.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RerankWeights {
    pub w_s: f32,
    pub w_a: f32,
    pub w_r: f32,
    pub w_t: f32,
}

impl Default for RerankWeights {
    fn default() -> Self {
        Self {
            w_s: 0.6,
            w_a: 0.15,
            w_r: 0.1,
            w_t: 0.15,
        }
    }
}

impl RerankWeights {
    fn validate(&self) -> Result<()> {
        let weights = [self.w_s, self.w_a, self.w_r, self.w_t];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(ConfigError::Invalid(
                "rerank weights must be non-negative".into(),
            ));
        }
        if weights.iter().sum::<f32>() > 1.0 + f32::EPSILON {
            return Err(ConfigError::Invalid(
                "rerank weights must sum to at most 1.0".into(),
            ));
        }
        Ok(())
    }
}

/// Central, validated configuration surface enumerated in spec §6.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FinanceBuddyConfig {
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Batch size passed to the embedding provider.
    pub embedding_batch_size: usize,
    /// Vector database connection URL (consumed by a concrete driver, out of scope here).
    pub vector_db_url: String,
    /// Vector collection/namespace name.
    pub vector_collection: String,
    /// Session time-to-live, in minutes.
    pub session_ttl_minutes: i64,
    /// Whether templated-fallback explanations/keyword-only retrieval are allowed.
    pub enable_llm_fallback: bool,
    /// Hybrid retrieval's vector/keyword blend factor.
    pub hybrid_alpha: f32,
    /// Reranker weights.
    pub rerank_weights: RerankWeights,
    /// Default difficulty when a caller does not specify one.
    pub default_difficulty: Difficulty,
    /// Maximum questions allowed in a single session.
    pub max_questions_per_session: usize,
}

impl Default for FinanceBuddyConfig {
    fn default() -> Self {
        Self {
            embedding_model: "text-embedding-004".to_string(),
            embedding_batch_size: 50,
            vector_db_url: String::new(),
            vector_collection: "financebuddy".to_string(),
            session_ttl_minutes: 60,
            enable_llm_fallback: false,
            hybrid_alpha: 0.7,
            rerank_weights: RerankWeights::default(),
            default_difficulty: Difficulty::Intermediate,
            max_questions_per_session: 20,
        }
    }
}

impl FinanceBuddyConfig {
    /// Load configuration by layering `FINANCEBUDDY_*` environment variables
    /// over the documented defaults, then validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if an environment variable cannot be
    /// parsed into its target type, or [`ConfigError::Invalid`] if a loaded
    /// value violates a validation rule (e.g. rerank weights summing above
    /// 1.0, a non-positive TTL).
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        let built = config::Config::builder()
            .set_default("embedding_model", defaults.embedding_model.clone())?
            .set_default("embedding_batch_size", defaults.embedding_batch_size as i64)?
            .set_default("vector_db_url", defaults.vector_db_url.clone())?
            .set_default("vector_collection", defaults.vector_collection.clone())?
            .set_default("session_ttl_minutes", defaults.session_ttl_minutes)?
            .set_default("enable_llm_fallback", defaults.enable_llm_fallback)?
            .set_default("hybrid_alpha", f64::from(defaults.hybrid_alpha))?
            .add_source(
                config::Environment::with_prefix("FINANCEBUDDY")
                    .try_parsing(true)
                    .separator("__"),
            )
            .build()?;

        let mut cfg: Self = built.try_deserialize().unwrap_or_else(|_| defaults);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate invariants that cannot be expressed through `config`'s
    /// deserialization alone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on the first rule violated.
    pub fn validate(&mut self) -> Result<()> {
        if self.session_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "session_ttl_minutes must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.hybrid_alpha) {
            return Err(ConfigError::Invalid(
                "hybrid_alpha must be within [0, 1]".into(),
            ));
        }
        if self.max_questions_per_session == 0 {
            return Err(ConfigError::Invalid(
                "max_questions_per_session must be positive".into(),
            ));
        }
        self.rerank_weights.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_valid() {
        let mut cfg = FinanceBuddyConfig::default();
        cfg.validate().unwrap();
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let mut cfg = FinanceBuddyConfig {
            session_ttl_minutes: 0,
            ..FinanceBuddyConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rerank_weights_summing_above_one_are_rejected() {
        let weights = RerankWeights {
            w_s: 0.7,
            w_a: 0.3,
            w_r: 0.3,
            w_t: 0.1,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn hybrid_alpha_out_of_range_is_rejected() {
        let mut cfg = FinanceBuddyConfig {
            hybrid_alpha: 1.5,
            ..FinanceBuddyConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
