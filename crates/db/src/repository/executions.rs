//! Execution repository — the Persistence Port.
//!
//! Supports exactly the four operations the controller needs: create-pending,
//! update-status (with optional current-node), patch-results (merge-in one
//! key), mark-terminal. All updates are idempotent with respect to readers:
//! any prefix of writes is a valid observation.

use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{models::WorkflowExecutionRow, DbError};

/// Create a `pending` execution record.
pub async fn create_pending(pool: &PgPool, workflow_id: Uuid) -> Result<WorkflowExecutionRow, DbError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as!(
        WorkflowExecutionRow,
        r#"
        INSERT INTO workflow_executions
            (id, workflow_id, status, current_node, results, error, started_at, completed_at)
        VALUES ($1, $2, 'pending', NULL, '{}'::jsonb, NULL, $3, NULL)
        RETURNING id, workflow_id, status, current_node, results, error, started_at, completed_at
        "#,
        id,
        workflow_id,
        now,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Update `status`, and optionally `current_node`.
pub async fn update_status(
    pool: &PgPool,
    execution_id: Uuid,
    status: &str,
    current_node: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query!(
        r#"UPDATE workflow_executions SET status = $1, current_node = $2 WHERE id = $3"#,
        status,
        current_node,
        execution_id,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Merge one `node_id -> result` key into the `results` JSONB map —
/// the controller's per-node write-through.
pub async fn patch_result(
    pool: &PgPool,
    execution_id: Uuid,
    node_id: &str,
    result: &Value,
) -> Result<(), DbError> {
    sqlx::query!(
        r#"
        UPDATE workflow_executions
        SET results = jsonb_set(results, ARRAY[$1], $2, true)
        WHERE id = $3
        "#,
        node_id,
        result,
        execution_id,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Transition the execution to its terminal state, whether that's a clean
/// completion or an early exit on handler failure.
pub async fn mark_terminal(
    pool: &PgPool,
    execution_id: Uuid,
    status: &str,
    error: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query!(
        r#"
        UPDATE workflow_executions
        SET status = $1, error = $2, completed_at = $3, current_node = NULL
        WHERE id = $4
        "#,
        status,
        error,
        Utc::now(),
        execution_id,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a single execution record by id, for the status-polling control
/// surface.
pub async fn get_execution(pool: &PgPool, execution_id: Uuid) -> Result<WorkflowExecutionRow, DbError> {
    let row = sqlx::query_as!(
        WorkflowExecutionRow,
        r#"
        SELECT id, workflow_id, status, current_node, results, error, started_at, completed_at
        FROM workflow_executions
        WHERE id = $1
        "#,
        execution_id,
    )
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}
