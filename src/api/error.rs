use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::{api::types::ErrorBody, detection::DetectError};

/// Every failure kind is the caller's problem, so all are 400s.
impl IntoResponse for DetectError {
    fn into_response(self) -> Response {
        let body = match &self {
            DetectError::MissingParameter(_) => ErrorBody::new(self.to_string()),
            DetectError::ClassificationFailed { details } => {
                debug!(%details, "classification failed");
                ErrorBody {
                    error: self.to_string(),
                    details: Some(details.clone()),
                }
            }
            DetectError::UnreadableBody { details } => ErrorBody {
                error: self.to_string(),
                details: Some(details.clone()),
            },
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
