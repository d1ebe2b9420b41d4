//! Token extraction from incoming trigger requests.
//!
//! A request can authenticate in three ways, tried in order:
//!
//! 1. An explicit `id` parameter naming a token. Possession of the id is
//!    proof enough for most kinds; service-kind tokens are reachable through
//!    generic webhook routes and must additionally carry a valid payload
//!    signature.
//! 2. A signed body: each recognized signature header is tested against
//!    every service token's secret, first match wins.
//! 3. The legacy bearer form `Authorization: Token <secret>`.
//!
//! Once a strategy produces a candidate, failure is final; an invalid
//! candidate never falls through to the next strategy. No match at all is
//! `None`, which the caller renders as an authentication failure.

use axum::http::HeaderMap;

use crate::registry::Directory;
use crate::types::{AuthProof, AuthenticatedToken, TokenId, TokenKind};

use super::signature::{signature_candidates, verify_signature};

/// Prefix of the legacy bearer form of the `Authorization` header.
const AUTHORIZATION_TOKEN_PREFIX: &str = "Token ";

/// Extracts and authenticates a token from the request, or returns `None`.
///
/// `explicit_id` is the raw `id` query parameter when present; `body` is the
/// raw request body used verbatim for signature computation.
pub fn extract<'a>(
    directory: &'a Directory,
    explicit_id: Option<&str>,
    headers: &HeaderMap,
    body: &[u8],
) -> Option<AuthenticatedToken<'a>> {
    if let Some(id) = explicit_id.filter(|id| !id.trim().is_empty()) {
        return extract_by_id(directory, id, headers, body);
    }

    if let Some(authenticated) = extract_from_signature(directory, headers, body) {
        return Some(authenticated);
    }

    extract_from_authorization(directory, headers)
}

/// Resolves an explicitly named token. The id is a committed candidate:
/// an unknown id or a failed signature check ends extraction.
fn extract_by_id<'a>(
    directory: &'a Directory,
    id: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> Option<AuthenticatedToken<'a>> {
    let id = TokenId::parse(id)?;
    let token = directory.token_by_id(id)?;

    if token.kind == TokenKind::Service {
        // Service tokens arrive over generic webhook routes where the id is
        // visible in the URL; the signature is what proves possession.
        let verified = signature_candidates(headers)
            .iter()
            .any(|candidate| verify_signature(body, &candidate.value, token.secret.as_bytes()));
        if !verified {
            return None;
        }
        return Some(AuthenticatedToken {
            token,
            proof: AuthProof::SignedPayload,
        });
    }

    Some(AuthenticatedToken {
        token,
        proof: AuthProof::IdOnly,
    })
}

/// Tries every signature candidate against every service token's secret.
fn extract_from_signature<'a>(
    directory: &'a Directory,
    headers: &HeaderMap,
    body: &[u8],
) -> Option<AuthenticatedToken<'a>> {
    let candidates = signature_candidates(headers);
    if candidates.is_empty() {
        return None;
    }

    for candidate in &candidates {
        for token in directory.service_tokens() {
            if verify_signature(body, &candidate.value, token.secret.as_bytes()) {
                return Some(AuthenticatedToken {
                    token,
                    proof: AuthProof::SignedPayload,
                });
            }
        }
    }
    None
}

/// Legacy form: the full secret in an `Authorization: Token <secret>` header.
fn extract_from_authorization<'a>(
    directory: &'a Directory,
    headers: &HeaderMap,
) -> Option<AuthenticatedToken<'a>> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let secret = value.strip_prefix(AUTHORIZATION_TOKEN_PREFIX)?.trim();
    if secret.is_empty() {
        return None;
    }

    let token = directory.token_by_secret(secret)?;
    Some(AuthenticatedToken {
        token,
        proof: AuthProof::SecretBearer,
    })
}
