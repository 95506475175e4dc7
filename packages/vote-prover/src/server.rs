use crate::models::{ErrorResponse, ProofRequest, ProofResponse};
use crate::node::ProverNode;
use crate::{ProverError, ProverErrorKind};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use vote_circuits::CircuitError;

pub mod api_client;

#[derive(Clone)]
pub struct AppState {
    pub node: Arc<ProverNode>,
}

impl IntoResponse for ProverError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ProverErrorKind::MalformedInput => StatusCode::BAD_REQUEST,
            ProverErrorKind::MissingArtifacts => StatusCode::SERVICE_UNAVAILABLE,
            ProverErrorKind::ProofGeneration => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

fn request_body(
    payload: Result<Json<ProofRequest>, JsonRejection>,
) -> Result<ProofRequest, ProverError> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| CircuitError::MalformedInput(rejection.body_text()).into())
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Proof not found".to_string(),
        }),
    )
        .into_response()
}

async fn generate_proof(
    State(state): State<AppState>,
    payload: Result<Json<ProofRequest>, JsonRejection>,
) -> Result<Response, ProverError> {
    let bundle = state.node.generate_proof(request_body(payload)?).await?;
    info!(nullifier_hash = %bundle.public_signals[0], "proof generated");
    Ok(Json(bundle).into_response())
}

async fn submit_job(
    State(state): State<AppState>,
    payload: Result<Json<ProofRequest>, JsonRejection>,
) -> Result<Response, ProverError> {
    let proof_id = state.node.submit_job(request_body(payload)?).await;
    Ok((
        StatusCode::ACCEPTED,
        Json(ProofResponse {
            success: true,
            message: "Request accepted successfully".to_string(),
            proof_id,
        }),
    )
        .into_response())
}

async fn job_status(State(state): State<AppState>, Path(proof_id): Path<String>) -> Response {
    match state.node.proof_manager.get_proof_status(&proof_id).await {
        Some(status) => Json(status).into_response(),
        None => not_found(),
    }
}

async fn cancel_job(State(state): State<AppState>, Path(proof_id): Path<String>) -> Response {
    if state.node.cancel_job(&proof_id).await {
        return match state.node.proof_manager.get_proof_status(&proof_id).await {
            Some(status) => Json(status).into_response(),
            None => not_found(),
        };
    }

    match state.node.proof_manager.get_proof_status(&proof_id).await {
        Some(_) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "Proof job already finished".to_string(),
            }),
        )
            .into_response(),
        None => not_found(),
    }
}

async fn health() -> &'static str {
    "ok"
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/proof", post(generate_proof))
        .route("/proof/jobs", post(submit_job))
        .route("/proof/jobs/:proof_id", get(job_status).delete(cancel_job))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn run_server(addr: &SocketAddr, state: AppState) -> Result<(), std::io::Error> {
    let app = create_router(state).layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("vote prover listening on {}", addr);
    axum::serve(listener, app).await
}
