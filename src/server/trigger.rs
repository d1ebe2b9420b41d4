//! The trigger endpoint handler.
//!
//! Drives a request through the full pipeline: token extraction, the
//! workflow-kind routing guard, target resolution, authorization, planning,
//! and backend dispatch. Authentication is by token possession only; there is
//! no ambient user, and the executor for everything downstream is the token's
//! owner.
//!
//! # Request
//!
//! - Method: POST
//! - Query parameters: `project`, `package`, `repository`, `arch`,
//!   `targetproject`, `targetrepository`, `filter_source_repository`, `id`
//! - Recognized signature headers: see [`crate::auth::SIGNATURE_HEADERS`]
//! - Body: raw bytes, used verbatim for signature computation; parsed only
//!   leniently for service triggers
//!
//! # Response
//!
//! - 200 with the backend's verbatim status document on success
//! - otherwise a JSON status document `{"code", "summary"}` with a stable
//!   code and the status mapping of [`TriggerError`]

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::AppState;
use crate::auth::extract;
use crate::backend::BackendGateway;
use crate::trigger::{TriggerError, TriggerParams, authorize, plan, resolve};
use crate::types::TokenKind;

/// The wire-level status document for rejected requests.
#[derive(Debug, Serialize)]
pub struct StatusDocument {
    pub code: &'static str,
    pub summary: String,
}

impl IntoResponse for TriggerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let document = StatusDocument {
            code: self.code(),
            summary: self.to_string(),
        };
        (status, Json(document)).into_response()
    }
}

/// Trigger handler.
///
/// Exactly-once, end-to-end or rejected: no state is retried, and a request
/// that fails before authorization never reaches the backend.
pub async fn trigger_handler<G>(
    State(state): State<AppState<G>>,
    Query(params): Query<TriggerParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, TriggerError>
where
    G: BackendGateway + Send + Sync + 'static,
{
    let directory = state.directory();

    let auth = match extract(directory, params.id.as_deref(), &headers, &body) {
        Some(auth) => auth,
        None => {
            // One generic message for every extraction failure; the reason
            // must not be observable from outside.
            warn!("trigger request with no valid token");
            return Err(TriggerError::InvalidToken);
        }
    };

    // Workflow tokens belong to the SCM-event pipeline; this entry point
    // answers as if the token did not exist.
    if auth.token.kind == TokenKind::Workflow {
        warn!(token_id = %auth.token.id, "workflow token on trigger route");
        return Err(TriggerError::TokenNotFound);
    }

    debug!(
        token_id = %auth.token.id,
        kind = %auth.token.kind,
        executor = %auth.token.executor,
        "token resolved"
    );

    let ctx = resolve(directory, auth, &params)?;
    authorize(directory, auth.token, &ctx)?;

    let commands = plan(auth.token, &ctx, &body)?;
    info!(
        token_id = %auth.token.id,
        kind = %auth.token.kind,
        executor = %ctx.executor,
        project = %ctx.project.name,
        commands = commands.len(),
        "trigger authorized"
    );

    let mut last_reply = None;
    for command in commands {
        last_reply = Some(state.gateway().dispatch(command).await?);
    }

    match last_reply {
        Some(reply) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            reply.0,
        )
            .into_response()),
        // plan() never returns an empty list; keep the rejection total
        // rather than panicking on a future regression.
        None => Err(TriggerError::NotFound(
            "No release targets found".to_string(),
        )),
    }
}
