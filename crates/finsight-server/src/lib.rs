//! Finsight Web Server
//!
//! Axum-based REST API around advisor sessions. Each session holds one
//! uploaded spreadsheet and one advisor conversation, kept in memory.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Upload size limit
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use finsight_core::prompts::PromptLibrary;
use finsight_core::{AIClient, Advisor, AdvisorBackend, AdvisorConfig, RequestBuilder};

mod handlers;

pub use handlers::SessionManager;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Shared application state
pub struct AppState {
    pub advisor: Advisor,
    pub config: AdvisorConfig,
    /// Prompts every new session starts from
    pub builder: RequestBuilder,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(client: AIClient, builder: RequestBuilder, config: AdvisorConfig) -> Self {
        Self {
            advisor: Advisor::new(client),
            config,
            builder,
            sessions: SessionManager::new(),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    info!(
        "Advisor backend: {} (default model: {}, preview rows: {})",
        state.advisor.client().host(),
        state.config.model,
        state.config.preview_rows
    );

    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/models", get(handlers::list_models))
        // Sessions (one dataset plus one conversation each)
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route(
            "/sessions/:id/upload",
            post(handlers::upload_sheet)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024)),
        )
        .route("/sessions/:id/dashboard", get(handlers::get_dashboard))
        // Advisor
        .route("/sessions/:id/insight", post(handlers::generate_insight))
        .route(
            "/sessions/:id/chat",
            get(handlers::get_chat).post(handlers::ask_question),
        )
        .route("/sessions/:id/chat/reset", post(handlers::reset_chat));

    // Restrictive default: only allow same-origin
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let csp_value = HeaderValue::from_static(concat!(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; ",
        "img-src 'self' blob: data:; connect-src 'self'; frame-ancestors 'none'"
    ));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ))
}

/// Start the server
pub async fn serve(
    client: AIClient,
    config: AdvisorConfig,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    let builder = RequestBuilder::from_library(&mut PromptLibrary::new())?;

    check_advisor_connection(&client).await;

    let app = create_router(AppState::new(client, builder, config));
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log advisor backend connection status
async fn check_advisor_connection(client: &AIClient) {
    if client.health_check().await {
        info!("✅ Advisor backend reachable: {}", client.host());
    } else {
        warn!(
            "⚠️  Advisor backend not responding: {} (requests will fail until it is)",
            client.host()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, msg)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn with_status(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<finsight_core::Error> for AppError {
    fn from(err: finsight_core::Error) -> Self {
        match client_status(&err) {
            Some(status) => Self::with_status(status, &err.to_string()),
            None => Self::from(anyhow::Error::from(err)),
        }
    }
}

/// Status for errors the client caused or can act on; `None` means internal
fn client_status(err: &finsight_core::Error) -> Option<StatusCode> {
    use finsight_core::Error;

    match err {
        Error::Schema { .. } | Error::Overflow(_) => Some(StatusCode::UNPROCESSABLE_ENTITY),
        Error::Validation(_)
        | Error::UnsupportedFormat(_)
        | Error::Import(_)
        | Error::Csv(_)
        | Error::Spreadsheet(_) => Some(StatusCode::BAD_REQUEST),
        Error::NoDataset => Some(StatusCode::CONFLICT),
        Error::AdvisorClient(_) => Some(StatusCode::BAD_GATEWAY),
        _ => None,
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
