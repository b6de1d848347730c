//! Servidor web Axum para mascaramento de PII e classificação de e-mails

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use mailmask_core::{
    config::AppConfig, corpus::demo_emails, ClassificationResult, MaskedEntity, PipelineError,
    RedactionPipeline,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: RedactionPipeline,
}

#[derive(Deserialize)]
struct EmailRequest {
    email_body: String,
}

#[derive(Serialize)]
struct MaskResponse {
    masked_email: String,
    list_of_masked_entities: Vec<MaskedEntity>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().context("configuração inválida")?;
    let pipeline = RedactionPipeline::from_config(&config).with_context(|| {
        format!(
            "falha ao montar o pipeline (artefato: {})",
            config.classifier.artifact.display()
        )
    })?;
    let state = Arc::new(AppState { pipeline });

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("não foi possível escutar em {}", config.server.bind))?;
    info!(bind = %config.server.bind, "servidor mailmask iniciado");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/classify", post(classify_handler))
        .route("/mask", post(mask_handler))
        .route("/health", get(health_handler))
        .route("/demo-emails", get(demo_emails_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Roda uma etapa síncrona do pipeline fora do runtime async
async fn run_blocking<T, F>(state: Arc<AppState>, body: String, job: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&RedactionPipeline, &str) -> Result<T, PipelineError> + Send + 'static,
{
    if body.trim().is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "corpo do e-mail vazio"));
    }

    match tokio::task::spawn_blocking(move || job(&state.pipeline, &body)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!(error = %e, "falha no pipeline");
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
        Err(e) => {
            error!(error = %e, "tarefa do pipeline abortada");
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, "falha interna"))
        }
    }
}

/// Mascara e classifica um e-mail
async fn classify_handler(State(state): State<Arc<AppState>>, Json(req): Json<EmailRequest>) -> Response {
    let result: Result<ClassificationResult, Response> =
        run_blocking(state, req.email_body, |pipeline, body| pipeline.classify_email(body)).await;
    match result {
        Ok(result) => Json(result).into_response(),
        Err(response) => response,
    }
}

/// Só mascara, sem classificar
async fn mask_handler(State(state): State<Arc<AppState>>, Json(req): Json<EmailRequest>) -> Response {
    let result = run_blocking(state, req.email_body, |pipeline, body| {
        let masked = pipeline.mask_pii(body)?;
        Ok(MaskResponse {
            list_of_masked_entities: masked.masked_entities(body),
            masked_email: masked.redacted_text,
        })
    })
    .await;
    match result {
        Ok(response) => Json(response).into_response(),
        Err(response) => response,
    }
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "rules": state.pipeline.matcher().table().len(),
    }))
}

/// Retorna e-mails de demonstração
async fn demo_emails_handler() -> impl IntoResponse {
    let emails: Vec<serde_json::Value> = demo_emails()
        .iter()
        .map(|(category, body)| {
            serde_json::json!({
                "category": category,
                "email_body": body
            })
        })
        .collect();
    Json(emails)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use mailmask_core::error::RecognizerError;
    use mailmask_core::{
        ClassifierArtifact, EntityRecognizer, LinearTextClassifier, Masker, NerModel, PatternMatcher,
        RecognizedEntity, RecognizerMode, RuleTable,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    const ARTIFACT: &str = r#"{
        "vocabulary": { "password": 1.0, "crash": 1.0 },
        "classes": [
            { "label": "Request", "weights": { "password": 1.0 } },
            { "label": "Incident", "weights": { "crash": 1.0 } }
        ]
    }"#;

    struct Failing;

    impl EntityRecognizer for Failing {
        fn recognize(&self, _text: &str) -> Result<Vec<RecognizedEntity>, RecognizerError> {
            Err(RecognizerError::Failed("indisponível".to_string()))
        }
    }

    fn state_with(recognizer: Arc<dyn EntityRecognizer>) -> Arc<AppState> {
        let classifier = LinearTextClassifier::from_artifact(ClassifierArtifact::from_json(ARTIFACT).unwrap()).unwrap();
        Arc::new(AppState {
            pipeline: RedactionPipeline::new(
                PatternMatcher::new(RuleTable::default_table().unwrap()),
                recognizer,
                Arc::new(classifier),
                Masker::default(),
            ),
        })
    }

    fn test_app() -> Router {
        app(state_with(Arc::new(NerModel::build(RecognizerMode::RulesOnly, 0))))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_classify_endpoint() {
        let body = serde_json::json!({
            "email_body": "My name is Alice Smith, reset my password. Mail: alice@example.com"
        });
        let response = test_app().oneshot(post_json("/classify", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = read_json(response).await;
        assert_eq!(json["category_of_the_email"], "Request");
        assert_eq!(
            json["masked_email"],
            "My name is [full_name], reset my password. Mail: [email]"
        );
        let entities = json["list_of_masked_entities"].as_array().unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0]["classification"], "email");
        assert_eq!(entities[1]["classification"], "full_name");
        assert_eq!(entities[1]["position"], serde_json::json!([11, 22]));
    }

    #[tokio::test]
    async fn test_mask_endpoint() {
        let body = serde_json::json!({ "email_body": "Call 9876543210" });
        let response = test_app().oneshot(post_json("/mask", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = read_json(response).await;
        assert_eq!(json["masked_email"], "Call [phone_number]");
        assert!(json.get("category_of_the_email").is_none());
    }

    #[tokio::test]
    async fn test_empty_body_is_bad_request() {
        let body = serde_json::json!({ "email_body": "   " });
        let response = test_app().oneshot(post_json("/classify", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pipeline_failure_is_500_without_partial_result() {
        let app = app(state_with(Arc::new(Failing)));
        let body = serde_json::json!({ "email_body": "Call 9876543210" });
        let response = app.oneshot(post_json("/classify", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = read_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("indisponível"));
        assert!(json.get("masked_email").is_none());
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        let json = read_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["rules"], 7);
    }

    #[test]
    fn test_bundled_artifact_classifies_demo_emails() {
        let artifact = ClassifierArtifact::from_json(include_str!("../models/email_classifier.json")).unwrap();
        let classifier = LinearTextClassifier::from_artifact(artifact).unwrap();
        let pipeline = RedactionPipeline::new(
            PatternMatcher::new(RuleTable::default_table().unwrap()),
            Arc::new(NerModel::build(RecognizerMode::RulesOnly, 0)),
            Arc::new(classifier),
            Masker::default(),
        );

        for (category, body) in demo_emails() {
            let result = pipeline.classify_email(body).unwrap();
            assert_eq!(result.category_of_the_email, category, "{}", result.masked_email);
        }
    }

    #[tokio::test]
    async fn test_demo_emails() {
        let request = Request::builder().uri("/demo-emails").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        let json = read_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 4);
        assert_eq!(json[0]["category"], "Incident");
    }
}
