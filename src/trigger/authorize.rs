//! Capability checks for trigger requests.
//!
//! The executor (the token's owner, not the HTTP caller) needs source-modify
//! rights on the resolved target; a release additionally needs rights on
//! every target project it would release into, evaluated per target so the
//! denial can name the exact project.

use crate::registry::Directory;
use crate::types::{Token, TokenKind};

use super::context::TriggerContext;
use super::error::TriggerError;

/// Checks that the executor may invoke this token's action on the context.
///
/// For release tokens the matching target set is enumerated here; an empty
/// set is a not-found condition, checked before per-target rights so the two
/// cannot be confused.
pub fn authorize(
    directory: &Directory,
    token: &Token,
    ctx: &TriggerContext<'_>,
) -> Result<(), TriggerError> {
    if !token.kind.triggerable() {
        return Err(TriggerError::NotAuthorized(format!(
            "A {} token may not trigger actions",
            token.kind
        )));
    }

    if !has_source_rights(ctx) {
        let target = match ctx.package {
            Some(package) => format!("package {}/{}", ctx.project.name, package.name),
            None => format!("project {}", ctx.project.name),
        };
        return Err(TriggerError::NotAuthorized(format!(
            "You don't have permission to trigger {} for {target}",
            token.kind.operation()
        )));
    }

    if token.kind == TokenKind::Release {
        authorize_release_targets(directory, ctx)?;
    }

    Ok(())
}

/// Source-modify rights: maintainer of the package, or of its project; the
/// project alone when no package is in play.
fn has_source_rights(ctx: &TriggerContext<'_>) -> bool {
    match ctx.package {
        Some(package) => {
            package.is_maintainer(&ctx.executor) || ctx.project.is_maintainer(&ctx.executor)
        }
        None => ctx.project.is_maintainer(&ctx.executor),
    }
}

/// Every matching release target needs independent rights on its target
/// project; the first unauthorized target rejects the whole request.
fn authorize_release_targets(
    directory: &Directory,
    ctx: &TriggerContext<'_>,
) -> Result<(), TriggerError> {
    let targets = ctx.matching_release_targets();
    if targets.is_empty() {
        return Err(TriggerError::NotFound(
            "No release targets found".to_string(),
        ));
    }

    for matched in targets {
        let name = &matched.target.target_project;
        let target_project = directory.project(name.as_str()).ok_or_else(|| {
            TriggerError::NotFound(format!("Project not found: {name}"))
        })?;

        if !target_project.is_maintainer(&ctx.executor) {
            return Err(TriggerError::ReleaseTargetNotAuthorized {
                target_project: name.clone(),
            });
        }
    }

    Ok(())
}
