use std::sync::Arc;

use axum::{routing::get, Router};

use crate::{detection::DetectionFacade, instance::InstanceMetadataProvider, server};

pub mod error;
pub mod handlers;
pub mod params;
pub mod types;

use handlers::{detect, detect_probs, instance_info, is_language};

#[derive(Clone)]
pub struct AppState {
    pub facade: DetectionFacade,
    pub instance: Arc<dyn InstanceMetadataProvider>,
}

impl AppState {
    pub fn new(facade: DetectionFacade, instance: Arc<dyn InstanceMetadataProvider>) -> Self {
        Self { facade, instance }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/detect", get(detect).post(detect))
        .route("/detect_probs", get(detect_probs).post(detect_probs))
        .route("/is_language", get(is_language).post(is_language))
        .route("/instance", get(instance_info))
}

/// Detection API with state and middleware attached.
pub fn build_router(state: AppState) -> Router {
    server::with_middleware(router().with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classifier::{Candidate, ClassifierError, LanguageClassifier, ProfileClassifier},
        instance::StaticInstance,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct Exploding;

    impl LanguageClassifier for Exploding {
        fn rank(&self, _text: &str) -> Result<Vec<Candidate>, ClassifierError> {
            panic!("detector state corrupted");
        }
    }

    fn app_with(classifier: impl LanguageClassifier + 'static, instance: StaticInstance) -> Router {
        build_router(AppState::new(
            DetectionFacade::new(Arc::new(classifier)),
            Arc::new(instance),
        ))
    }

    fn app() -> Router {
        app_with(ProfileClassifier::new(), StaticInstance::default())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_form(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, String, Vec<u8>) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let content_type = res
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, content_type, body.to_vec())
    }

    async fn send_json(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = send(app, req).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn get_detect_returns_plain_label() {
        let (status, content_type, body) = send(app(), get("/detect?text=Hello%20world")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(body, b"en");
    }

    #[tokio::test]
    async fn post_detect_returns_json_object() {
        let (status, body) = send_json(
            app(),
            post_json("/detect", json!({ "text": "Bonjour le monde" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "language": "fr" }));
    }

    #[tokio::test]
    async fn post_detect_accepts_form_body() {
        let (status, body) =
            send_json(app(), post_form("/detect", "text=Bonjour+le+monde")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "language": "fr" }));
    }

    #[tokio::test]
    async fn format_parameter_overrides_method_default() {
        let (_, body) = send_json(app(), get("/detect?text=Hello%20world&format=json")).await;
        assert_eq!(body, json!({ "language": "en" }));

        let (status, content_type, body) = send(
            app(),
            post_json("/detect?format=text", json!({ "text": "Hola mundo" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(body, b"es");
    }

    #[tokio::test]
    async fn empty_text_is_missing_parameter() {
        let (status, body) = send_json(app(), post_json("/detect", json!({ "text": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "missing 'text' parameter" }));
    }

    #[tokio::test]
    async fn missing_text_is_rejected_on_every_endpoint() {
        for path in ["/detect", "/detect_probs", "/is_language"] {
            for req in [
                get(path),
                get(&format!("{path}?text=%20%20")),
                post_json(path, json!({})),
                post_form(path, "lang=en"),
            ] {
                let (status, body) = send_json(app(), req).await;
                assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
                assert_eq!(body, json!({ "error": "missing 'text' parameter" }), "{path}");
            }
        }
    }

    #[tokio::test]
    async fn undetectable_text_reports_details() {
        for uri in [
            "/detect?text=12345",
            "/detect_probs?text=12345",
            "/is_language?text=12345&lang=en",
        ] {
            let (status, body) = send_json(app(), get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(
                body,
                json!({
                    "error": "could not detect language",
                    "details": "no features in text"
                })
            );
        }
    }

    #[tokio::test]
    async fn detect_probs_is_ranked_and_agrees_with_detect() {
        let (status, body) = send_json(app(), get("/detect_probs?text=Hola%20mundo")).await;
        assert_eq!(status, StatusCode::OK);

        let languages = body["languages"].as_array().expect("languages array");
        assert!(!languages.is_empty());
        let probs: Vec<f64> = languages
            .iter()
            .map(|l| l["prob"].as_f64().expect("prob"))
            .collect();
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(probs.windows(2).all(|w| w[0] >= w[1]));

        let (_, _, label) = send(app(), get("/detect?text=Hola%20mundo")).await;
        assert_eq!(languages[0]["lang"].as_str().map(str::as_bytes), Some(label.as_slice()));
    }

    #[tokio::test]
    async fn is_language_reports_match() {
        let (status, body) =
            send_json(app(), get("/is_language?text=Hola%20mundo&lang=es")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requested"], "es");
        assert_eq!(body["detected"], "es");
        assert_eq!(body["match"], true);
        assert!(body["probability"].is_f64());
    }

    #[tokio::test]
    async fn is_language_post_is_case_insensitive() {
        let (status, body) = send_json(
            app(),
            post_json("/is_language", json!({ "text": "Hello world", "lang": "EN" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requested"], "EN");
        assert_eq!(body["detected"], "en");
        assert_eq!(body["match"], true);
    }

    #[tokio::test]
    async fn is_language_echoes_untrimmed_lang() {
        let (status, body) =
            send_json(app(), get("/is_language?text=Hola%20mundo&lang=%20es%20")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requested"], " es ");
        assert_eq!(body["match"], true);
    }

    #[tokio::test]
    async fn oversized_body_is_not_reported_as_missing_text() {
        let text = "hello world ".repeat(100_000);
        for path in ["/detect", "/detect_probs", "/is_language"] {
            let req = post_json(path, json!({ "text": text, "lang": "en" }));
            let (status, body) = send_json(app(), req).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
            assert_eq!(body["error"], "could not read request body", "{path}");
            assert!(body["details"].is_string(), "{path}");
        }
    }

    #[tokio::test]
    async fn is_language_without_lang_is_missing_parameter() {
        let (status, body) = send_json(app(), get("/is_language?text=Hola%20mundo")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "missing 'lang' parameter" }));
    }

    #[tokio::test]
    async fn classifier_panic_becomes_client_error() {
        let exploding = app_with(Exploding, StaticInstance::default());
        let (status, body) = send_json(exploding, get("/detect_probs?text=Hello")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "could not detect language");
        assert_eq!(body["details"], "detector state corrupted");
    }

    #[tokio::test]
    async fn instance_endpoint() {
        let known = app_with(ProfileClassifier::new(), StaticInstance(Some("i-0abc".into())));
        let (status, _, body) = send(known, get("/instance")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"i-0abc");

        let (status, body) = send_json(app(), get("/instance")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "instance id not available" }));
    }
}
