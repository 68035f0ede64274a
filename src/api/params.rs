use std::collections::HashMap;

use axum::{
    body::to_bytes,
    extract::Request,
    http::{header, HeaderMap, Method},
};
use serde_json::Value;
use tracing::warn;

use crate::detection::{ClassificationRequest, DetectError};

const BODY_LIMIT: usize = 1024 * 1024;

#[derive(Debug)]
pub struct DetectParams {
    pub method: Method,
    pub request: ClassificationRequest,
    /// Response format override, always taken from the query string.
    pub format: Option<String>,
}

/// GET reads the query string. Any other method reads the JSON body, then
/// falls back to a form-encoded body. A body that cannot be read, including
/// one over [`BODY_LIMIT`], is rejected rather than treated as empty.
pub async fn read_params(req: Request) -> Result<DetectParams, DetectError> {
    let (parts, body) = req.into_parts();
    let query = parse_pairs(parts.uri.query().unwrap_or("").as_bytes());
    let format = query.get("format").cloned();

    let request = if parts.method == Method::GET {
        ClassificationRequest {
            text: query.get("text").cloned(),
            expected_label: query.get("lang").cloned(),
        }
    } else {
        let bytes = to_bytes(body, BODY_LIMIT).await.map_err(|err| {
            warn!(%err, "failed to read request body");
            DetectError::UnreadableBody {
                details: err.to_string(),
            }
        })?;
        from_body(&parts.headers, &bytes)
    };

    Ok(DetectParams {
        method: parts.method,
        request,
        format,
    })
}

fn from_body(headers: &HeaderMap, body: &[u8]) -> ClassificationRequest {
    let json = if is_json(headers) {
        serde_json::from_slice::<Value>(body).ok()
    } else {
        None
    };
    let form = if is_form(headers) {
        parse_pairs(body)
    } else {
        HashMap::new()
    };

    let field = |name: &str| {
        json.as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(String::from)
            .or_else(|| form.get(name).cloned())
    };

    ClassificationRequest {
        text: field("text"),
        expected_label: field("lang"),
    }
}

/// First occurrence of a repeated key wins.
fn parse_pairs(raw: &[u8]) -> HashMap<String, String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(raw).unwrap_or_default();
    let mut map = HashMap::new();
    for (key, value) in pairs {
        map.entry(key).or_insert(value);
    }
    map
}

fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

fn is_json(headers: &HeaderMap) -> bool {
    let ct = content_type(headers);
    ct == "application/json" || (ct.starts_with("application/") && ct.ends_with("+json"))
}

fn is_form(headers: &HeaderMap) -> bool {
    content_type(headers) == "application/x-www-form-urlencoded"
}
