//! Target resolution: request parameters to a concrete trigger context.
//!
//! The context fixes what the request operates on: the project, the package
//! (falling back to the token binding), the object to authorize, and the
//! optional multibuild flavor. Resolution order matters and is covered by
//! tests:
//!
//! 1. the missing-package precondition, *before* any existence lookup;
//! 2. project resolution (params, else the token binding's project);
//! 3. package resolution (params, else binding; must exist in the project);
//! 4. the multibuild flavor, only after the package is fixed, because it is
//!    validated against the package's configured flavors.

use serde::Deserialize;

use crate::registry::{Directory, Package, Project, ReleaseTarget, Repository, TriggerMode};
use crate::types::{
    Arch, AuthProof, AuthenticatedToken, Login, ProjectName, RepositoryName, split_multibuild,
};

use super::error::TriggerError;

/// The raw request parameters of a trigger request.
///
/// Everything is optional at this layer; SCM providers send what they send,
/// and missing values are resolved or rejected with precise errors further
/// down. Unknown parameters are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TriggerParams {
    pub id: Option<String>,
    pub project: Option<String>,
    pub package: Option<String>,
    pub repository: Option<String>,
    pub arch: Option<String>,
    pub targetproject: Option<String>,
    pub targetrepository: Option<String>,
    pub filter_source_repository: Option<String>,
}

/// Returns the value only if it is non-empty after trimming; SCM payloads
/// routinely carry present-but-blank parameters.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// The resolved, request-scoped trigger target. Never persisted.
#[derive(Debug)]
pub struct TriggerContext<'a> {
    /// The identity every check and backend call runs as: the token's owner,
    /// never the transport-level caller.
    pub executor: Login,

    pub project: &'a Project,

    /// Resolved package; `None` only for kinds that do not require one.
    pub package: Option<&'a Package>,

    /// Requested multibuild flavor, validated against the package.
    pub multibuild_flavor: Option<String>,

    pub repository: Option<RepositoryName>,
    pub arch: Option<Arch>,
    pub target_project: Option<ProjectName>,
    pub target_repository: Option<RepositoryName>,
    pub filter_source_repository: Option<RepositoryName>,

    /// How the request authenticated; service actions check this.
    pub proof: AuthProof,
}

/// A release target together with the source repository that configures it.
#[derive(Debug, Clone, Copy)]
pub struct MatchedReleaseTarget<'a> {
    pub repository: &'a Repository,
    pub target: &'a ReleaseTarget,
}

impl<'a> TriggerContext<'a> {
    /// The manual release targets of the project's repositories that survive
    /// the request's repository/target filters, in configuration order.
    ///
    /// Both authorization and dispatch iterate this same set, so a target
    /// that is authorized is exactly a target that is released.
    pub fn matching_release_targets(&self) -> Vec<MatchedReleaseTarget<'a>> {
        self.project
            .repositories
            .iter()
            .filter(|repo| match &self.repository {
                Some(want) => &repo.name == want,
                None => true,
            })
            .flat_map(|repo| {
                repo.release_targets
                    .iter()
                    .filter(|rt| rt.trigger == TriggerMode::Manual)
                    .filter(|rt| match &self.target_project {
                        Some(want) => &rt.target_project == want,
                        None => true,
                    })
                    .filter(|rt| match &self.target_repository {
                        Some(want) => &rt.target_repository == want,
                        None => true,
                    })
                    .map(move |rt| MatchedReleaseTarget {
                        repository: repo,
                        target: rt,
                    })
            })
            .collect()
    }
}

/// Resolves the trigger context for an authenticated token.
pub fn resolve<'a>(
    directory: &'a Directory,
    auth: AuthenticatedToken<'a>,
    params: &TriggerParams,
) -> Result<TriggerContext<'a>, TriggerError> {
    let token = auth.token;
    let requested_package = present(&params.package);

    // The package precondition comes first: its error is about the
    // requirement, not about existence, so no lookup may run before it.
    if token.kind.requires_package() && requested_package.is_none() && token.package.is_none() {
        return Err(TriggerError::MissingPackage);
    }

    let project_name = present(&params.project)
        .or_else(|| token.package.as_ref().map(|b| b.project.as_str()))
        .ok_or_else(|| TriggerError::NotFound("Project not found".to_string()))?;

    let project = directory
        .project(project_name)
        .ok_or_else(|| TriggerError::NotFound(format!("Project not found: {project_name}")))?;

    // Package from params, else the token binding. A requested name may carry
    // a multibuild suffix; the binding never does.
    let (package, requested_flavor) = match requested_package {
        Some(requested) => {
            let (base, flavor) = split_multibuild(requested);
            let package = project.package(base).ok_or_else(|| {
                TriggerError::NotFound(format!("Package not found: {project_name}/{base}"))
            })?;
            (Some(package), flavor)
        }
        None => match &token.package {
            Some(binding) => {
                let package = project.package(binding.package.as_str()).ok_or_else(|| {
                    TriggerError::NotFound(format!(
                        "Package not found: {project_name}/{}",
                        binding.package
                    ))
                })?;
                (Some(package), None)
            }
            None => (None, None),
        },
    };

    // The flavor is derived last: it is only meaningful against the resolved
    // package's build matrix.
    let multibuild_flavor = match (package, requested_flavor) {
        (Some(package), Some(flavor)) => {
            if !package.has_flavor(flavor) {
                return Err(TriggerError::NotFound(format!(
                    "Package {project_name}/{} has no multibuild flavor {flavor}",
                    package.name
                )));
            }
            Some(flavor.to_string())
        }
        _ => None,
    };

    Ok(TriggerContext {
        executor: token.executor.clone(),
        project,
        package,
        multibuild_flavor,
        repository: present(&params.repository).map(RepositoryName::from),
        arch: present(&params.arch).map(Arch::from),
        target_project: present(&params.targetproject).map(ProjectName::from),
        target_repository: present(&params.targetrepository).map(RepositoryName::from),
        filter_source_repository: present(&params.filter_source_repository)
            .map(RepositoryName::from),
        proof: auth.proof,
    })
}
