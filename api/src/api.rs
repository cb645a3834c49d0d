use crate::compute::compute;
use crate::config::{Config, Listener as ListenerConfig};
use crate::databases::{DatabaseError, Databases};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use provisioner::{DatabaseName, NameError, ProvisionError, ProvisioningOutcome};
use resolver::{EndpointResolver, ResolvedEndpoint};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("invalid database name: {0}")]
    InvalidName(#[from] NameError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("not ready")]
    NotReady,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidName(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(DatabaseError::Provision(ProvisionError::InvalidName(_))) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::IoError(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error_message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(ApiErrorResponse {
            error_message: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    resolver: EndpointResolver,
    databases: Arc<dyn Databases>,
}

impl AppState {
    pub fn new(config: Config, resolver: EndpointResolver, databases: Arc<dyn Databases>) -> Self {
        AppState {
            config: Arc::new(config),
            resolver,
            databases,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/services/{name}/{scheme}", get(resolve_service))
        .route("/databases/{name}", post(ensure_database))
        .route("/compute", get(compute_handler))
        .with_state(state)
}

pub async fn serve(listener: &ListenerConfig, state: AppState) -> Result<(), ApiError> {
    let app = router(state);

    let addr = format!("{}:{}", listener.host, listener.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn health() -> &'static str {
    "ok"
}

async fn ready(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    if state.databases.is_ready().await {
        Ok("ready")
    } else {
        Err(ApiError::NotReady)
    }
}

#[derive(Deserialize, Debug)]
struct ResolveParams {
    index: Option<usize>,
}

async fn resolve_service(
    State(state): State<AppState>,
    Path((name, scheme)): Path<(String, String)>,
    Query(params): Query<ResolveParams>,
) -> Json<ResolvedEndpoint> {
    // A missing reference resolves to the "not available" placeholder.
    let reference = state
        .config
        .service_reference(&name, &scheme, params.index.unwrap_or(0))
        .unwrap_or_default();

    let endpoint = state
        .resolver
        .resolve_with_deadline(reference, state.config.resolve_timeout())
        .await;
    Json(endpoint)
}

#[derive(Serialize, Debug)]
struct DatabaseResponse {
    database: String,
    outcome: ProvisioningOutcome,
    ping: i32,
}

async fn ensure_database(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DatabaseResponse>, ApiError> {
    let name: DatabaseName = name.parse()?;
    let (outcome, ping) = state.databases.ensure_and_ping(&name).await?;

    Ok(Json(DatabaseResponse {
        database: name.to_string(),
        outcome,
        ping,
    }))
}

#[derive(Deserialize, Debug)]
struct ComputeParams {
    a: Option<u64>,
    b: Option<u64>,
}

#[derive(Serialize, Debug)]
struct ComputeResponse {
    total: u64,
}

async fn compute_handler(Query(params): Query<ComputeParams>) -> Json<ComputeResponse> {
    let span = tracing::info_span!("compute_request", a = ?params.a, b = ?params.b);
    let total = compute(&span, params.a, params.b).await;
    Json(ComputeResponse { total })
}
