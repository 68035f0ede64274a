pub mod profile;
pub mod script;

use serde::Serialize;
use thiserror::Error;

pub use profile::ProfileClassifier;

/// One (label, probability) pair proposed by a classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    #[serde(rename = "lang")]
    pub label: String,
    #[serde(rename = "prob")]
    pub probability: f64,
}

impl Candidate {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClassifierError {
    #[error("no features in text")]
    NoFeatures,
    #[error("{0}")]
    Internal(String),
}

/// A language classifier the detection façade delegates to.
///
/// Implementations are synchronous and expected to be cheap; they are called
/// inline on the request task.
pub trait LanguageClassifier: Send + Sync {
    /// Ranked candidates, most probable first. Callers must not rely on the
    /// ordering; the façade re-sorts.
    fn rank(&self, text: &str) -> Result<Vec<Candidate>, ClassifierError>;
}
