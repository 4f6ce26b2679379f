//! The listener facade: one HTTP route per operation. Mutating calls are
//! validated, enqueued, and acknowledged with `{"status":"queued"}` before
//! they execute; read-only calls answer synchronously from model state.
//! Nothing here blocks the listener thread on model mutation.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tower_http::cors::CorsLayer;

use crate::error::BridgeError;
use crate::registry::{self, catalog, Dispatch, ReadOp};
use crate::state::SharedState;

// ── Response helpers ─────────────────────────────────────────────

fn queued_json() -> Json<Value> {
    Json(serde_json::json!({ "status": "queued" }))
}

fn err_json(status: StatusCode, error: &BridgeError) -> impl IntoResponse {
    (
        status,
        Json(serde_json::json!({
            "status": "error",
            "code": error.code(),
            "message": error.to_string(),
        })),
    )
}

// ── Handlers ─────────────────────────────────────────────────────

async fn post_tool(
    Extension(state): Extension<Arc<SharedState>>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    match registry::resolve(&name, &body) {
        Ok(Dispatch::Queue(command)) => {
            state.queue.enqueue(command);
            queued_json().into_response()
        }
        Ok(Dispatch::Read(op)) => run_read(&state, &op).into_response(),
        Err(e) => err_json(StatusCode::BAD_REQUEST, &e).into_response(),
    }
}

/// Read-only operations bypass the queue. The model lock is held only for
/// the duration of the read, which the host's access model permits off the
/// owning thread.
fn run_read(state: &SharedState, op: &ReadOp) -> Json<Value> {
    match op {
        ReadOp::GetDocument { name } => {
            let model = state.model.lock();
            match model.get_document(name) {
                Some(doc) => Json(serde_json::json!({
                    "status": "success",
                    "document": doc.name(),
                    "objects": doc.object_names().collect::<Vec<_>>(),
                })),
                None => Json(serde_json::json!({
                    "status": "error",
                    "message": "Document not found",
                })),
            }
        }
        ReadOp::ListDocuments => {
            let documents = state.model.lock().list_documents();
            Json(serde_json::json!({
                "status": "success",
                "documents": documents,
            }))
        }
    }
}

async fn get_tools() -> impl IntoResponse {
    Json(catalog::to_json_schema())
}

// ── Router ───────────────────────────────────────────────────────

/// Build the listener's router. Served by the bridge's listener thread.
pub fn router(state: Arc<SharedState>) -> Router {
    Router::new()
        .route("/api/tools", get(get_tools))
        .route("/api/tools/{name}", post(post_tool))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}
