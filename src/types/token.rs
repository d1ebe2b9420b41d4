//! Trigger tokens and the proof of how a request authenticated.
//!
//! A token is a durable credential created out of band. It binds an action
//! kind to an owning identity (the executor) and optionally to a package.
//! Requests authenticate by presenting the token id, the full secret, or an
//! HMAC signature computed with the secret; all authorization downstream runs
//! impersonating the executor, never the transport-level caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{Login, PackageName, ProjectName, TokenId};

/// The action class a token may trigger.
///
/// The kind determines which backend action the token maps to and which
/// preconditions apply. `Workflow` tokens belong to the separate SCM-event
/// pipeline and must never resolve through the trigger path; `Rss` tokens
/// authenticate feed access and trigger nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Rebuild a package's binaries.
    Rebuild,
    /// Copy finished builds to configured release targets.
    Release,
    /// Re-run a package's source service chain.
    Service,
    /// SCM workflow token; handled by a different entry point.
    Workflow,
    /// Notification feed token; not a trigger credential.
    Rss,
}

impl TokenKind {
    /// Whether this kind operates on a package and therefore requires one,
    /// either from request parameters or from the token binding.
    pub fn requires_package(self) -> bool {
        matches!(
            self,
            TokenKind::Rebuild | TokenKind::Release | TokenKind::Service
        )
    }

    /// Whether this kind maps to a backend trigger action at all.
    pub fn triggerable(self) -> bool {
        matches!(
            self,
            TokenKind::Rebuild | TokenKind::Release | TokenKind::Service
        )
    }

    /// The operation name used in messages and backend commands.
    pub fn operation(self) -> &'static str {
        match self {
            TokenKind::Rebuild => "rebuild",
            TokenKind::Release => "release",
            TokenKind::Service => "runservice",
            TokenKind::Workflow => "workflow",
            TokenKind::Rss => "rss",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation())
    }
}

/// A package a token is bound to, stored as a weak reference.
///
/// Only the coordinates are held; the package is resolved against the
/// directory per request, so a deleted package surfaces as not-found rather
/// than a stale object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageBinding {
    pub project: ProjectName,
    pub package: PackageName,
}

/// A durable trigger credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,

    /// Shared secret; bearer credential and HMAC key.
    pub secret: String,

    pub kind: TokenKind,

    /// The identity impersonated when the token triggers an action.
    pub executor: Login,

    /// Optional bound package, used when the request names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageBinding>,

    pub created_at: DateTime<Utc>,
}

/// How a request proved possession of a token.
///
/// Service-kind actions are reachable through generic webhook routes and
/// accept only the stronger proofs; see `trigger::action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthProof {
    /// A recognized signature header carried a valid HMAC over the raw body.
    SignedPayload,
    /// The full secret was presented (`Authorization: Token <secret>`).
    SecretBearer,
    /// Only the token id parameter was presented.
    IdOnly,
}

/// A token together with the proof that authenticated it, borrowed from the
/// read-only directory for the duration of one request.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedToken<'a> {
    pub token: &'a Token,
    pub proof: AuthProof,
}
