//! The trigger pipeline error taxonomy.
//!
//! Every rejection a request can hit maps to one variant here, and every
//! variant maps to a stable wire code plus an HTTP status class. The codes
//! (`bad_request`, `forbidden`, `not_found`, `trigger_project_not_authorized`)
//! are a wire contract; clients match on them.
//!
//! Two messages are deliberately uninformative:
//! - authentication failures always read "No valid token found", never which
//!   extraction step failed, to avoid an oracle for forgery attempts;
//! - a workflow-kind token on this path reads "Token not found", identical to
//!   a missing record, to avoid leaking the token's kind.

use thiserror::Error;

use crate::backend::BackendError;
use crate::types::ProjectName;

/// A rejected trigger request.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// No token could be extracted, or the extracted candidate was invalid.
    #[error("No valid token found")]
    InvalidToken,

    /// A workflow-kind token was routed here; it belongs to the SCM-event
    /// pipeline. Indistinguishable from a missing record by design.
    #[error("Token not found")]
    TokenNotFound,

    /// The token's kind operates on a package and none was supplied.
    #[error("A package must be provided for the operations rebuild, release and runservice")]
    MissingPackage,

    /// Unknown project, package, or no matching release targets.
    #[error("{0}")]
    NotFound(String),

    /// The executor lacks source-modify rights on the trigger target.
    #[error("{0}")]
    NotAuthorized(String),

    /// The executor lacks rights on a release target's project.
    #[error("You don't have permission to release into project {target_project}.")]
    ReleaseTargetNotAuthorized { target_project: ProjectName },

    /// Action-specific input validation failure; the message is surfaced
    /// verbatim.
    #[error("{0}")]
    InvalidArgument(String),

    /// The backend call failed; surfaced, never retried here.
    #[error("{0}")]
    Backend(#[from] BackendError),
}

impl TriggerError {
    /// The stable machine-readable code for the response status document.
    pub fn code(&self) -> &'static str {
        match self {
            TriggerError::InvalidToken => "forbidden",
            TriggerError::TokenNotFound => "not_found",
            TriggerError::MissingPackage => "bad_request",
            TriggerError::NotFound(_) => "not_found",
            TriggerError::NotAuthorized(_) => "forbidden",
            TriggerError::ReleaseTargetNotAuthorized { .. } => "trigger_project_not_authorized",
            TriggerError::InvalidArgument(_) => "bad_request",
            TriggerError::Backend(_) => "backend_error",
        }
    }

    /// The HTTP status for this rejection.
    pub fn http_status(&self) -> u16 {
        match self {
            TriggerError::InvalidToken => 403,
            TriggerError::TokenNotFound => 404,
            TriggerError::MissingPackage => 400,
            TriggerError::NotFound(_) => 404,
            TriggerError::NotAuthorized(_) => 403,
            TriggerError::ReleaseTargetNotAuthorized { .. } => 403,
            TriggerError::InvalidArgument(_) => 400,
            TriggerError::Backend(_) => 500,
        }
    }
}
