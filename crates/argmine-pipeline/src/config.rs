//! Configuration for the pipeline

use argmine_domain::IdentityEngine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Thresholds and switches threaded through every pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Tagged spans scoring below this are dropped
    pub min_component_score: f64,

    /// Trimmed fragments shorter than this many characters are dropped
    pub min_component_length: usize,

    /// Component relations scoring below this are dropped
    pub min_relation_score: f64,

    /// Statements classified with less confidence take no part in linking
    pub min_statement_classification_score: f64,

    /// Statement relations scoring below this are rejected
    pub min_statement_relation_score: f64,

    /// Re-run classification and linking for statements that already have results
    #[serde(rename = "override")]
    pub override_cached: bool,

    /// Only Claim components may be the target of a cross-statement relation
    ///
    /// Cross-statement pairs join major claims, which are always Claims, so
    /// with the current selector both settings produce the same graph.
    pub cross_statement_claim_targets_only: bool,

    /// Maximum time for a single scoring call (seconds)
    pub scoring_timeout_secs: u64,

    /// Secret seed of the identity hash, shared by every process writing one store
    pub hash_seed: u64,
}

impl PipelineConfig {
    /// Get the scoring timeout as a Duration
    pub fn scoring_timeout(&self) -> Duration {
        Duration::from_secs(self.scoring_timeout_secs)
    }

    /// The identity engine for this configuration's seed
    pub fn identity(&self) -> IdentityEngine {
        IdentityEngine::new(self.hash_seed)
    }

    /// Copy of this configuration with the override switch set
    pub fn with_override(mut self, override_cached: bool) -> Self {
        self.override_cached = override_cached;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let thresholds = [
            ("min_component_score", self.min_component_score),
            ("min_relation_score", self.min_relation_score),
            (
                "min_statement_classification_score",
                self.min_statement_classification_score,
            ),
            ("min_statement_relation_score", self.min_statement_relation_score),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be within [0.0, 1.0], got {}", name, value));
            }
        }
        if self.scoring_timeout_secs == 0 {
            return Err("scoring_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            min_component_score: 0.5,
            min_component_length: 10,
            min_relation_score: 0.5,
            min_statement_classification_score: 0.5,
            min_statement_relation_score: 0.5,
            override_cached: false,
            cross_statement_claim_targets_only: true,
            scoring_timeout_secs: 300,
            hash_seed: 0,
        }
    }
}

impl PipelineConfig {
    /// Strict preset: only confident model output makes it into the graph
    pub fn strict() -> Self {
        Self {
            min_component_score: 0.75,
            min_component_length: 15,
            min_relation_score: 0.75,
            min_statement_classification_score: 0.75,
            min_statement_relation_score: 0.75,
            ..Self::default()
        }
    }

    /// Lenient preset: keep most model output, for exploring a new corpus
    pub fn lenient() -> Self {
        Self {
            min_component_score: 0.25,
            min_component_length: 5,
            min_relation_score: 0.25,
            min_statement_classification_score: 0.25,
            min_statement_relation_score: 0.25,
            scoring_timeout_secs: 600,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.override_cached);
        assert!(config.cross_statement_claim_targets_only);
    }

    #[test]
    fn test_strict_config_is_valid() {
        assert!(PipelineConfig::strict().validate().is_ok());
    }

    #[test]
    fn test_lenient_config_is_valid() {
        assert!(PipelineConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut config = PipelineConfig::default();
        config.min_relation_score = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.contains("min_relation_score"));

        let mut config = PipelineConfig::default();
        config.min_component_score = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let mut config = PipelineConfig::default();
        config.min_statement_relation_score = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = PipelineConfig::default();
        config.scoring_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::strict().with_override(true);
        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("override = true"));

        let parsed = PipelineConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = PipelineConfig::from_toml("min_component_length = 3\nhash_seed = 42\n").unwrap();
        assert_eq!(parsed.min_component_length, 3);
        assert_eq!(parsed.identity().seed(), 42);
        assert_eq!(parsed.min_relation_score, PipelineConfig::default().min_relation_score);
    }
}
