//! HTTP scorer implementation
//!
//! Talks to model-serving endpoints that speak the Hugging Face inference
//! format: a JSON body `{"inputs": ...}` and a JSON list of predictions back.
//! Each of the four models has its own URL.
//!
//! # Features
//!
//! - Blocking HTTP, meant to run on a blocking thread
//! - Retry logic with exponential backoff
//! - Batch alignment check on every pairwise call
//!
//! # Examples
//!
//! ```no_run
//! use argmine_scoring::{HttpScorer, ScorerConfig};
//! use argmine_domain::traits::ArgumentScorer;
//!
//! let scorer = HttpScorer::new(ScorerConfig::default()).unwrap();
//! let prediction = scorer.classify_statement("Faith is private.").unwrap();
//! println!("{} ({:.2})", prediction.label, prediction.score);
//! ```

use crate::{check_alignment, normalize_label, ScoringError};
use argmine_domain::traits::{ArgumentScorer, Prediction, TaggedSpan, TextPair};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Default model-serving endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// Default timeout for one model request
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Endpoints and transport settings of the HTTP scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Token classification model (claim/premise tagger)
    pub component_url: String,

    /// Component pair classifier
    pub relation_url: String,

    /// Statement role classifier
    pub statement_url: String,

    /// Statement pair classifier
    pub statement_relation_url: String,

    /// Bearer token sent with every request
    pub api_token: Option<String>,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Attempts per request before giving up
    pub max_retries: u32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            component_url: format!("{}/components", DEFAULT_ENDPOINT),
            relation_url: format!("{}/relations", DEFAULT_ENDPOINT),
            statement_url: format!("{}/statements", DEFAULT_ENDPOINT),
            statement_relation_url: format!("{}/statement-relations", DEFAULT_ENDPOINT),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Request body
#[derive(Serialize)]
struct InferenceRequest<'a, T: ?Sized> {
    inputs: &'a T,
}

/// One span of a token classification response
#[derive(Deserialize)]
struct RawSpan {
    #[serde(alias = "entity_group", alias = "entity")]
    label: String,
    score: f64,
    start: usize,
    end: usize,
}

/// One label of a text classification response
#[derive(Debug, Clone, Deserialize)]
struct RawPrediction {
    label: String,
    score: f64,
}

/// Text classification answers come flat, or as a top-k list per input
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPredictions {
    Flat(Vec<RawPrediction>),
    TopK(Vec<Vec<RawPrediction>>),
}

impl RawPredictions {
    /// Best prediction per input
    fn into_best(self) -> Result<Vec<Prediction>, ScoringError> {
        match self {
            RawPredictions::Flat(predictions) => Ok(predictions.into_iter().map(to_prediction).collect()),
            RawPredictions::TopK(candidates) => candidates
                .into_iter()
                .map(|top_k| {
                    top_k
                        .into_iter()
                        .max_by(|a, b| a.score.total_cmp(&b.score))
                        .map(to_prediction)
                        .ok_or_else(|| ScoringError::InvalidResponse("empty top-k list".to_string()))
                })
                .collect(),
        }
    }
}

fn to_prediction(raw: RawPrediction) -> Prediction {
    Prediction::new(normalize_label(&raw.label), raw.score)
}

/// Scorer backed by model-serving HTTP endpoints
pub struct HttpScorer {
    config: ScorerConfig,
    client: reqwest::blocking::Client,
}

impl HttpScorer {
    /// Create a scorer from its configuration
    pub fn new(config: ScorerConfig) -> Result<Self, ScoringError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScoringError::Communication(format!("Failed to build client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// The configuration in use
    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// POST `{"inputs": inputs}` to `url`, retrying with exponential backoff
    fn post<I, R>(&self, url: &str, inputs: &I) -> Result<R, ScoringError>
    where
        I: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = InferenceRequest { inputs };
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.config.max_retries {
            let mut request = self.client.post(url).json(&body);
            if let Some(token) = &self.config.api_token {
                request = request.bearer_auth(token);
            }

            match request.send() {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<R>()
                        .map_err(|e| ScoringError::InvalidResponse(format!("Failed to parse response: {}", e)));
                }
                Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => {
                    return Err(ScoringError::ModelNotAvailable(url.to_string()));
                }
                Ok(response) => {
                    let status = response.status();
                    let error_text = response.text().unwrap_or_else(|_| "Unknown error".to_string());
                    last_error = Some(ScoringError::Communication(format!("HTTP {}: {}", status, error_text)));
                }
                Err(e) => {
                    last_error = Some(ScoringError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.config.max_retries {
                // 1s, 2s, 4s, ...
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!(url, attempts, ?delay, "model request failed, retrying");
                thread::sleep(delay);
            }
        }

        Err(last_error.unwrap_or_else(|| ScoringError::Communication("Max retries exceeded".to_string())))
    }

    fn classify_pairs(&self, url: &str, pairs: &[TextPair]) -> Result<Vec<Prediction>, ScoringError> {
        let inputs: Vec<PairInput<'_>> = pairs.iter().map(PairInput::from).collect();
        let predictions = self.post::<_, RawPredictions>(url, &inputs)?.into_best()?;
        check_alignment(pairs.len(), &predictions)?;
        debug!(url, pairs = pairs.len(), "classified pair batch");
        Ok(predictions)
    }
}

#[derive(Serialize)]
struct PairInput<'a> {
    text: &'a str,
    text_pair: &'a str,
}

impl<'a> From<&'a TextPair> for PairInput<'a> {
    fn from(pair: &'a TextPair) -> Self {
        Self {
            text: &pair.text,
            text_pair: &pair.text_pair,
        }
    }
}

impl ArgumentScorer for HttpScorer {
    type Error = ScoringError;

    fn tag_components(&self, text: &str) -> Result<Vec<TaggedSpan>, Self::Error> {
        let spans: Vec<RawSpan> = self.post(&self.config.component_url, text)?;
        Ok(spans
            .into_iter()
            .map(|raw| TaggedSpan {
                start: raw.start,
                end: raw.end,
                label: normalize_label(&raw.label),
                score: raw.score,
            })
            .collect())
    }

    fn classify_relations(&self, pairs: &[TextPair]) -> Result<Vec<Prediction>, Self::Error> {
        self.classify_pairs(&self.config.relation_url, pairs)
    }

    fn classify_statement(&self, text: &str) -> Result<Prediction, Self::Error> {
        let predictions = self
            .post::<_, RawPredictions>(&self.config.statement_url, text)?
            .into_best()?;
        predictions
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| ScoringError::InvalidResponse("empty classification".to_string()))
    }

    fn classify_statement_relations(&self, pairs: &[TextPair]) -> Result<Vec<Prediction>, Self::Error> {
        self.classify_pairs(&self.config.statement_relation_url, pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScorerConfig::default();
        assert_eq!(config.relation_url, "http://localhost:8080/relations");
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_config_partial_deserialize() {
        let config: ScorerConfig =
            serde_json::from_str(r#"{"statement_url": "http://models:9000/roles", "max_retries": 1}"#).unwrap();
        assert_eq!(config.statement_url, "http://models:9000/roles");
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.component_url, ScorerConfig::default().component_url);
    }

    #[test]
    fn test_request_body_shape() {
        let pairs = [TextPair::new("a", "b")];
        let inputs: Vec<PairInput<'_>> = pairs.iter().map(PairInput::from).collect();
        let body = serde_json::to_value(InferenceRequest { inputs: &inputs }).unwrap();
        assert_eq!(body, serde_json::json!({"inputs": [{"text": "a", "text_pair": "b"}]}));
    }

    #[test]
    fn test_parse_flat_predictions() {
        let raw: RawPredictions =
            serde_json::from_str(r#"[{"label": "SUP", "score": 0.8}, {"label": "noRel", "score": 0.6}]"#).unwrap();
        let predictions = raw.into_best().unwrap();
        assert_eq!(
            predictions,
            vec![Prediction::new("Support", 0.8), Prediction::new("noRel", 0.6)]
        );
    }

    #[test]
    fn test_parse_top_k_predictions() {
        let raw: RawPredictions = serde_json::from_str(
            r#"[[{"label": "Attack", "score": 0.2}, {"label": "Support", "score": 0.7}]]"#,
        )
        .unwrap();
        assert_eq!(raw.into_best().unwrap(), vec![Prediction::new("Support", 0.7)]);
    }

    #[test]
    fn test_parse_token_classification() {
        let spans: Vec<RawSpan> = serde_json::from_str(
            r#"[{"entity_group": "CL", "score": 0.93, "word": "we must act", "start": 0, "end": 11}]"#,
        )
        .unwrap();
        assert_eq!(spans[0].label, "CL");
        assert_eq!((spans[0].start, spans[0].end), (0, 11));
    }

    #[test]
    fn test_http_error_handling() {
        // invalid port, fails before any network traffic
        let config = ScorerConfig {
            statement_url: "http://localhost:99999/statements".to_string(),
            max_retries: 1,
            ..ScorerConfig::default()
        };
        let scorer = HttpScorer::new(config).unwrap();

        match scorer.classify_statement("test") {
            Err(ScoringError::Communication(_)) => {}
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }
}
