// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route handlers.
//!
//! Both trigger routes answer `200` with an [`OperationResult`] whether
//! the operation succeeded or not, and `409` when another operation holds
//! the lock.

use std::future::Future;

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dbsnap_core::{OperationResult, SnapshotError};
use dbsnap_security::redact;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::server::GatewayState;

/// Message returned with `409 Conflict`.
pub const BUSY_MESSAGE: &str = "another snapshot operation is in progress";

#[derive(Debug, Deserialize)]
pub struct RestoreForm {
    #[serde(rename = "fileName", default)]
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

fn failure(state: &GatewayState, err: &SnapshotError) -> OperationResult {
    OperationResult::failure(err, |msg| redact(msg, state.secrets.as_slice()))
}

fn busy() -> Response {
    (
        StatusCode::CONFLICT,
        Json(OperationResult {
            succeeded: false,
            message: BUSY_MESSAGE.to_string(),
        }),
    )
        .into_response()
}

/// Run `op` on its own task that owns the operation lock.
///
/// The lock is released when the pipeline finishes, even if the request
/// future is dropped first.
async fn run_exclusive<F>(state: &GatewayState, op: F) -> Response
where
    F: Future<Output = Result<String, SnapshotError>> + Send + 'static,
{
    let Ok(guard) = state.operation_lock.clone().try_lock_owned() else {
        return busy();
    };

    let task = tokio::spawn(async move {
        let _guard = guard;
        op.await
    });

    let result = match task.await {
        Ok(Ok(message)) => OperationResult::success(message),
        Ok(Err(e)) => failure(state, &e),
        Err(e) => {
            warn!(error = %e, "snapshot operation task failed");
            failure(
                state,
                &SnapshotError::Internal(format!("operation task failed: {e}")),
            )
        }
    };
    (StatusCode::OK, Json(result)).into_response()
}

/// POST /v1/backup
pub async fn post_backup(State(state): State<GatewayState>) -> Response {
    let backup = state.backup.clone();
    run_exclusive(&state, async move {
        let receipt = backup.run().await?;
        Ok(format!(
            "backup stored as {} ({} bytes)",
            receipt.name, receipt.bytes
        ))
    })
    .await
}

/// POST /v1/restore
///
/// A body that is not a urlencoded form is answered like any other
/// validation failure.
pub async fn post_restore(
    State(state): State<GatewayState>,
    form: Result<Form<RestoreForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            let err = SnapshotError::Validation(format!(
                "invalid restore request: {}",
                rejection.body_text()
            ));
            return (StatusCode::OK, Json(failure(&state, &err))).into_response();
        }
    };

    let restore = state.restore.clone();
    run_exclusive(&state, async move {
        let receipt = restore.run(&form.file_name).await?;
        Ok(format!(
            "restored {} ({} bytes)",
            receipt.name, receipt.bytes
        ))
    })
    .await
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
