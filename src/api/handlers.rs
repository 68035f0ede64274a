use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    api::{
        params::read_params,
        types::{DetectProbsResponse, DetectResponse, ErrorBody},
        AppState,
    },
    detection::{extract_text, DetectError, MatchReport, ResponseStyle},
};

pub async fn detect(State(state): State<AppState>, req: Request) -> Result<Response, DetectError> {
    let params = read_params(req).await?;
    let text = extract_text(&params.request)?;
    let language = state.facade.classify_top(text)?;

    Ok(
        match ResponseStyle::negotiate(&params.method, params.format.as_deref()) {
            ResponseStyle::PlainText => language.into_response(),
            ResponseStyle::Json => Json(DetectResponse { language }).into_response(),
        },
    )
}

pub async fn detect_probs(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<DetectProbsResponse>, DetectError> {
    let params = read_params(req).await?;
    let text = extract_text(&params.request)?;
    let languages = state.facade.classify_all(text)?;
    Ok(Json(DetectProbsResponse { languages }))
}

pub async fn is_language(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<MatchReport>, DetectError> {
    let params = read_params(req).await?;
    let report = state.facade.check_match(&params.request)?;
    Ok(Json(report))
}

pub async fn instance_info(State(state): State<AppState>) -> Response {
    match state.instance.instance_id().await {
        Some(id) => id.into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new("instance id not available")),
        )
            .into_response(),
    }
}
