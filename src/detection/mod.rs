//! Text classification façade: validate, delegate to the classifier, shape.

use std::{
    any::Any,
    cmp::Ordering,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use axum::http::Method;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::classifier::{Candidate, ClassifierError, LanguageClassifier};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DetectError {
    #[error("missing '{0}' parameter")]
    MissingParameter(&'static str),
    #[error("could not detect language")]
    ClassificationFailed { details: String },
    #[error("could not read request body")]
    UnreadableBody { details: String },
}

impl DetectError {
    fn classification(details: impl Into<String>) -> Self {
        Self::ClassificationFailed {
            details: details.into(),
        }
    }
}

impl From<ClassifierError> for DetectError {
    fn from(err: ClassifierError) -> Self {
        Self::classification(err.to_string())
    }
}

/// Inputs of a classification call, independent of how they were transported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationRequest {
    pub text: Option<String>,
    pub expected_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub requested: String,
    pub detected: String,
    pub probability: f64,
    #[serde(rename = "match")]
    pub is_match: bool,
}

/// How `/detect` renders a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStyle {
    /// The bare label as `text/plain`.
    PlainText,
    /// `{"language": label}`.
    Json,
}

impl ResponseStyle {
    /// An explicit `format` of `text` or `json` wins. Otherwise GET gets the
    /// plain label and every other method gets JSON.
    pub fn negotiate(method: &Method, format: Option<&str>) -> Self {
        match format.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
            Some("text") | Some("plain") => Self::PlainText,
            Some("json") => Self::Json,
            _ if *method == Method::GET => Self::PlainText,
            _ => Self::Json,
        }
    }
}

pub fn extract_text(req: &ClassificationRequest) -> Result<&str, DetectError> {
    required(req.text.as_deref(), "text")
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, DetectError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(DetectError::MissingParameter(name))
}

#[derive(Clone)]
pub struct DetectionFacade {
    classifier: Arc<dyn LanguageClassifier>,
}

impl DetectionFacade {
    pub fn new(classifier: Arc<dyn LanguageClassifier>) -> Self {
        Self { classifier }
    }

    /// Always the first entry of [`classify_all`](Self::classify_all).
    pub fn classify_top(&self, text: &str) -> Result<String, DetectError> {
        let label = self
            .classify_all(text)?
            .into_iter()
            .next()
            .map(|c| c.label)
            .ok_or_else(|| DetectError::classification("classifier returned no candidates"))?;
        debug!(label = %label, "top label");
        Ok(label)
    }

    pub fn classify_all(&self, text: &str) -> Result<Vec<Candidate>, DetectError> {
        let ranked = normalize(self.guarded(|c| c.rank(text))?);
        if ranked.is_empty() {
            return Err(DetectError::classification("classifier returned no candidates"));
        }
        debug!(candidates = ranked.len(), top = %ranked[0].label, "ranked labels");
        Ok(ranked)
    }

    pub fn check_match(&self, req: &ClassificationRequest) -> Result<MatchReport, DetectError> {
        let text = extract_text(req)?;
        let requested = required(req.expected_label.as_deref(), "lang")?;
        let raw_requested = req.expected_label.clone().unwrap_or_default();

        let top = self
            .classify_all(text)?
            .into_iter()
            .next()
            .ok_or_else(|| DetectError::classification("classifier returned no candidates"))?;

        Ok(MatchReport {
            requested: raw_requested,
            is_match: top.label.eq_ignore_ascii_case(requested),
            detected: top.label,
            probability: top.probability,
        })
    }

    /// Runs a classifier call, turning both errors and panics into
    /// `ClassificationFailed`.
    fn guarded<T>(
        &self,
        op: impl FnOnce(&dyn LanguageClassifier) -> Result<T, ClassifierError>,
    ) -> Result<T, DetectError> {
        let classifier = self.classifier.as_ref();
        match panic::catch_unwind(AssertUnwindSafe(|| op(classifier))) {
            Ok(result) => result.map_err(|err| {
                debug!(%err, "classifier rejected text");
                DetectError::from(err)
            }),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(%message, "classifier panicked");
                Err(DetectError::classification(message))
            }
        }
    }
}

/// Drops unusable candidates, clamps probabilities and sorts descending.
fn normalize(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut kept: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.probability.is_finite() && !c.label.trim().is_empty())
        .map(|c| Candidate {
            probability: c.probability.clamp(0.0, 1.0),
            ..c
        })
        .collect();
    kept.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(Ordering::Equal)
    });
    kept
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "classifier panicked".to_string()
    }
}
