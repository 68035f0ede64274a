use serde::Serialize;

use crate::classifier::Candidate;

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct DetectProbsResponse {
    pub languages: Vec<Candidate>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}
