//! Per-kind action planning.
//!
//! Each triggerable token kind turns an authorized context into backend
//! commands; preconditions specific to a kind live next to its planning code.
//! Planning is pure: nothing is executed here.

use serde_json::Value;
use tracing::debug;

use crate::backend::BackendCommand;
use crate::types::{AuthProof, Token, TokenKind};

use super::context::TriggerContext;
use super::error::TriggerError;

/// Characters allowed in request-supplied identifier values interpolated
/// into backend paths. Mirrors the name rules of the durable store.
fn valid_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '_' | '.' | ':'))
}

fn validate_identifier(what: &str, value: &str) -> Result<(), TriggerError> {
    if valid_identifier(value) {
        Ok(())
    } else {
        Err(TriggerError::InvalidArgument(format!(
            "Invalid {what}: {value}"
        )))
    }
}

/// Plans the backend commands for an authorized trigger request.
///
/// The returned list is non-empty; a release whose filters match nothing is
/// a not-found condition. `body` is the raw request body, only peeked at for
/// service triggers and never shape-validated.
pub fn plan(
    token: &Token,
    ctx: &TriggerContext<'_>,
    body: &[u8],
) -> Result<Vec<BackendCommand>, TriggerError> {
    validate_filters(ctx)?;

    match token.kind {
        TokenKind::Rebuild => plan_rebuild(ctx),
        TokenKind::Release => plan_release(ctx),
        TokenKind::Service => plan_service(ctx, body),
        // Guarded earlier in the pipeline; kept total so a future caller
        // cannot dispatch these by accident.
        TokenKind::Workflow => Err(TriggerError::TokenNotFound),
        TokenKind::Rss => Err(TriggerError::NotAuthorized(
            "A rss token may not trigger actions".to_string(),
        )),
    }
}

/// Request-supplied filter values end up in backend paths; reject values the
/// backend could misparse. The error message is surfaced verbatim.
fn validate_filters(ctx: &TriggerContext<'_>) -> Result<(), TriggerError> {
    if let Some(repository) = &ctx.repository {
        validate_identifier("repository", repository.as_str())?;
    }
    if let Some(arch) = &ctx.arch {
        validate_identifier("arch", arch.as_str())?;
    }
    if let Some(target_project) = &ctx.target_project {
        validate_identifier("targetproject", target_project.as_str())?;
    }
    if let Some(target_repository) = &ctx.target_repository {
        validate_identifier("targetrepository", target_repository.as_str())?;
    }
    if let Some(filter) = &ctx.filter_source_repository {
        validate_identifier("filter_source_repository", filter.as_str())?;
    }
    if let Some(flavor) = &ctx.multibuild_flavor {
        validate_identifier("multibuild flavor", flavor)?;
    }
    Ok(())
}

fn plan_rebuild(ctx: &TriggerContext<'_>) -> Result<Vec<BackendCommand>, TriggerError> {
    let package = ctx.package.ok_or(TriggerError::MissingPackage)?;

    Ok(vec![BackendCommand::RebuildPackage {
        project: ctx.project.name.clone(),
        package: package.name.clone(),
        repository: ctx.repository.clone(),
        arch: ctx.arch.clone(),
        filter_source_repository: ctx.filter_source_repository.clone(),
    }])
}

/// One copy command per matching manual release target and architecture.
///
/// With a multibuild flavor set, the copy addresses the single container and
/// drops the aggregation flag; otherwise the whole package (all containers)
/// is copied with `multibuild` set.
fn plan_release(ctx: &TriggerContext<'_>) -> Result<Vec<BackendCommand>, TriggerError> {
    let package = ctx.package.ok_or(TriggerError::MissingPackage)?;

    let mut commands = Vec::new();
    for matched in ctx.matching_release_targets() {
        let architectures = matched
            .repository
            .architectures
            .iter()
            .filter(|arch| match &ctx.arch {
                Some(want) => *arch == want,
                None => true,
            });

        for arch in architectures {
            commands.push(BackendCommand::CopyBuild {
                source_project: ctx.project.name.clone(),
                source_package: package.name.clone(),
                source_repository: matched.repository.name.clone(),
                target_project: matched.target.target_project.clone(),
                target_repository: matched.target.target_repository.clone(),
                arch: arch.clone(),
                resign: true,
                multibuild: ctx.multibuild_flavor.is_none(),
                flavor: ctx.multibuild_flavor.clone(),
            });
        }
    }

    if commands.is_empty() {
        return Err(TriggerError::NotFound(
            "No release targets found".to_string(),
        ));
    }
    Ok(commands)
}

fn plan_service(ctx: &TriggerContext<'_>, body: &[u8]) -> Result<Vec<BackendCommand>, TriggerError> {
    // Service tokens travel through generic webhook routes; the payload
    // signature (or the full secret) is what proves possession. An id alone
    // is not enough for this kind.
    if ctx.proof == AuthProof::IdOnly {
        return Err(TriggerError::InvalidToken);
    }

    let package = ctx.package.ok_or(TriggerError::MissingPackage)?;

    // SCM payloads are structured however the vendor likes (nested objects,
    // integers); peek for logging only, never validate the shape.
    if !body.is_empty() {
        match serde_json::from_slice::<Value>(body) {
            Ok(payload) => debug!(
                keys = payload.as_object().map(|o| o.len()).unwrap_or(0),
                "service trigger payload parsed"
            ),
            Err(_) => debug!("service trigger payload is not JSON; ignored"),
        }
    }

    Ok(vec![BackendCommand::TriggerServices {
        project: ctx.project.name.clone(),
        package: package.name.clone(),
        user: ctx.executor.clone(),
    }])
}
