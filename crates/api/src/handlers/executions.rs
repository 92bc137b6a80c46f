use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::AppState;
use db::repository::executions as exec_repo;
use db::repository::workflows as wf_repo;

#[derive(Serialize)]
pub struct EnqueuedDto {
    pub execution_id: Uuid,
    pub status: &'static str,
}

/// Steps 1-2 of the controller lifecycle: parse the stored definition,
/// persist a `pending` record, spawn the rest of the run in the background.
pub async fn execute(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<(StatusCode, Json<EnqueuedDto>), StatusCode> {
    let row = match wf_repo::get_workflow(&state.pool, id).await {
        Ok(row) => row,
        Err(db::DbError::NotFound) => return Err(StatusCode::NOT_FOUND),
        Err(_) => return Err(StatusCode::INTERNAL_SERVER_ERROR),
    };

    // The `id` embedded in the stored definition (if any) is discarded in
    // favour of the workflow row's own primary key, so the execution's
    // foreign key always points at the record that was actually fetched.
    let mut workflow = match engine::parse(&row.definition) {
        Ok(w) => w,
        Err(_) => return Err(StatusCode::UNPROCESSABLE_ENTITY),
    };
    workflow.id = id;

    let execution_id = match engine::enqueue(state.pool.clone(), state.registry.clone(), state.deps.clone(), workflow).await {
        Ok(id) => id,
        Err(_) => return Err(StatusCode::INTERNAL_SERVER_ERROR),
    };

    Ok((StatusCode::ACCEPTED, Json(EnqueuedDto { execution_id, status: "pending" })))
}

/// Poll an execution's current status and write-through results —
/// `current_node` and `results` are observable mid-run, not just at the end.
pub async fn status(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<db::models::WorkflowExecutionRow>, StatusCode> {
    match exec_repo::get_execution(&state.pool, id).await {
        Ok(row) => Ok(Json(row)),
        Err(db::DbError::NotFound) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
