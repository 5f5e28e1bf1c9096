//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for analyzing call recordings and transcripts.

use crate::agents::AgentKind;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, ServerSettings, Settings};
use crate::error::CoachError;
use crate::knowledge::KnowledgeContext;
use crate::orchestrator::Orchestrator;
use crate::report::{AnalysisReport, FileMetadata};
use crate::transcription::{SourceRouter, TranscriptSource};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, instrument, warn};

/// Multipart field carrying the uploaded recording.
const UPLOAD_FIELD: &str = "file";

/// Shared application state.
pub struct AppState {
    orchestrator: Orchestrator,
    source: Arc<dyn TranscriptSource>,
    knowledge: KnowledgeContext,
}

impl AppState {
    pub fn new(
        orchestrator: Orchestrator,
        source: Arc<dyn TranscriptSource>,
        knowledge: KnowledgeContext,
    ) -> Self {
        Self {
            orchestrator,
            source,
            knowledge,
        }
    }
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<&str>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let orchestrator = Orchestrator::from_settings(&settings, &prompts)?;
    let source = Arc::new(SourceRouter::from_settings(&settings, &prompts)?);
    let provider = source.audio_provider();
    let knowledge = KnowledgeContext::from_settings(&settings)?;

    let state = Arc::new(AppState::new(orchestrator, source, knowledge));
    let app = build_router(state, &settings.server);

    let host = host.unwrap_or(&settings.server.host);
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Callcoach API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Transcription", provider);
    Output::kv("Agents", &settings.agents.backend.to_string());
    println!();
    println!("Endpoints:");
    Output::kv("Service", "GET  /");
    Output::kv("Health", "GET  /health");
    Output::kv("Analyze Call", "POST /analyze-call");
    Output::kv("Analyze Transcript", "POST /analyze-transcript");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the API router.
pub fn build_router(state: Arc<AppState>, server: &ServerSettings) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/analyze-call", post(analyze_call))
        .route("/analyze-transcript", post(analyze_transcript))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(cors_layer(&server.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct TranscriptRequest {
    transcript: String,
    #[serde(default)]
    filename: Option<String>,
    /// Overrides the server's configured knowledge context.
    #[serde(default)]
    knowledge: Option<String>,
}

#[derive(Serialize)]
struct ServiceInfo {
    service: &'static str,
    version: &'static str,
    agents: Vec<&'static str>,
    backend: String,
    transcription: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    stage: &'static str,
    status: &'static str,
}

/// A pipeline error rendered as a JSON error response.
struct ApiError(CoachError);

impl From<CoachError> for ApiError {
    fn from(e: CoachError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoachError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CoachError::Transcription(_) | CoachError::OpenAI(_) | CoachError::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            CoachError::PipelineFailure(_) | CoachError::AgentFailure { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!("Request failed ({}): {}", self.0.stage(), self.0);

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                stage: self.0.stage(),
                status: "analysis unavailable",
            }),
        )
            .into_response()
    }
}

// === Handlers ===

async fn service_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ServiceInfo {
        service: "callcoach",
        version: env!("CARGO_PKG_VERSION"),
        agents: AgentKind::ALL.iter().map(|k| k.title()).collect(),
        backend: state.orchestrator.agents().backend().to_string(),
        transcription: state.source.name(),
    })
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[instrument(skip_all)]
async fn analyze_call(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, ApiError> {
    let read_error = |e: axum::extract::multipart::MultipartError| {
        CoachError::InvalidInput(format!("Failed to read multipart: {}", e))
    };

    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(read_error)?;
        if bytes.is_empty() {
            return Err(CoachError::InvalidInput(format!("'{}' is empty", filename)).into());
        }

        info!("Received {} ({} bytes)", filename, bytes.len());
        let report = state
            .orchestrator
            .analyze_recording(state.source.as_ref(), &bytes, &filename, &state.knowledge)
            .await?;
        return Ok(Json(report));
    }

    Err(CoachError::InvalidInput(format!("missing multipart field '{}'", UPLOAD_FIELD)).into())
}

#[instrument(skip_all)]
async fn analyze_transcript(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranscriptRequest>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let knowledge = match req.knowledge {
        Some(text) => KnowledgeContext::new(text),
        None => state.knowledge.clone(),
    };
    let file = FileMetadata::new(
        req.filename.unwrap_or_else(|| "transcript.txt".to_string()),
        req.transcript.len() as u64,
    );

    let report = state.orchestrator.run(&req.transcript, &knowledge, file).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Agent, AgentResult};
    use crate::orchestrator::AgentSet;
    use crate::transcription::{DemoSource, Transcript, DEMO_TRANSCRIPT};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "callcoach-test-boundary";

    struct FailingAgent(AgentKind);

    #[async_trait]
    impl Agent for FailingAgent {
        fn kind(&self) -> AgentKind {
            self.0
        }

        async fn run(&self, _: &Transcript, _: &KnowledgeContext) -> crate::error::Result<AgentResult> {
            Err(CoachError::OpenAI("rate limited".into()))
        }
    }

    fn create_test_app(agents: AgentSet) -> Router {
        let state = Arc::new(AppState::new(
            Orchestrator::new(agents),
            Arc::new(SourceRouter::new(Arc::new(DemoSource))),
            KnowledgeContext::empty(),
        ));
        build_router(state, &ServerSettings::default())
    }

    fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Body {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn transcript_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze-transcript")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = create_test_app(AgentSet::heuristic())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_service_info_lists_agents() {
        let response = create_test_app(AgentSet::heuristic())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["agents"].as_array().unwrap().len(), 3);
        assert_eq!(json["backend"], "heuristic");
        assert_eq!(json["transcription"], "router");
    }

    #[tokio::test]
    async fn test_analyze_transcript() {
        let response = create_test_app(AgentSet::heuristic())
            .oneshot(transcript_request(serde_json::json!({
                "transcript": DEMO_TRANSCRIPT,
                "filename": "demo.txt",
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["filename"], "demo.txt");
        assert_eq!(json["filesize"], DEMO_TRANSCRIPT.len());
        assert_eq!(json["agents"]["sales_coach"]["status"], "ok");
        assert!(json["executive_summary"]["overall_score"].is_number());
        assert_eq!(
            json["agents"]["objection_expert"]["objections_detected"][0],
            "budget"
        );
    }

    #[tokio::test]
    async fn test_empty_transcript_is_bad_request() {
        let response = create_test_app(AgentSet::heuristic())
            .oneshot(transcript_request(serde_json::json!({ "transcript": "   " })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["stage"], "input");
        assert_eq!(json["status"], "analysis unavailable");
    }

    #[tokio::test]
    async fn test_all_agents_failing_is_unavailable() {
        let agents = AgentSet::heuristic()
            .with_analyzer(Arc::new(FailingAgent(AgentKind::TranscriptAnalyzer)))
            .with_coach(Arc::new(FailingAgent(AgentKind::SalesCoach)))
            .with_objection(Arc::new(FailingAgent(AgentKind::ObjectionExpert)));

        let response = create_test_app(agents)
            .oneshot(transcript_request(serde_json::json!({ "transcript": DEMO_TRANSCRIPT })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["stage"], "pipeline");
    }

    #[tokio::test]
    async fn test_analyze_call_upload() {
        let request = Request::builder()
            .method("POST")
            .uri("/analyze-call")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(multipart_body("file", "call.wav", b"RIFF0000WAVE"))
            .unwrap();

        let response = create_test_app(AgentSet::heuristic())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["filename"], "call.wav");
        assert_eq!(json["filesize"], 12);
        assert_eq!(json["transcript"], DEMO_TRANSCRIPT);
    }

    #[tokio::test]
    async fn test_analyze_call_without_file_field() {
        let request = Request::builder()
            .method("POST")
            .uri("/analyze-call")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(multipart_body("attachment", "call.wav", b"RIFF"))
            .unwrap();

        let response = create_test_app(AgentSet::heuristic())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["stage"], "input");
    }
}
