//! Backend commands as data.
//!
//! A trigger request is planned into one or more backend commands before
//! anything is executed. Commands describe the exact build-system call
//! without performing it, which keeps the planning logic pure and lets tests
//! assert on intended operations via a recording gateway.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Arch, Login, PackageName, ProjectName, RepositoryName};

/// A single build-backend call.
///
/// `path_and_query` renders the wire form. Identifier values are validated
/// during planning (see `trigger::action`), so plain interpolation is safe
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BackendCommand {
    /// Rebuild a package, optionally narrowed to one repository and
    /// architecture.
    RebuildPackage {
        project: ProjectName,
        package: PackageName,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        repository: Option<RepositoryName>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arch: Option<Arch>,
        /// Rebuild only packages whose sources differ relative to this
        /// repository.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter_source_repository: Option<RepositoryName>,
    },

    /// Copy a finished build from a source repository into a release target.
    CopyBuild {
        source_project: ProjectName,
        source_package: PackageName,
        source_repository: RepositoryName,
        target_project: ProjectName,
        target_repository: RepositoryName,
        arch: Arch,
        /// Re-sign binaries with the target project's key.
        resign: bool,
        /// Aggregate all multibuild containers of the package.
        multibuild: bool,
        /// Restrict the copy to a single multibuild flavor.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flavor: Option<String>,
    },

    /// Re-run a package's source service chain.
    TriggerServices {
        project: ProjectName,
        package: PackageName,
        /// The executor the services run as.
        user: Login,
    },
}

impl BackendCommand {
    /// Renders the HTTP path and query string for this command.
    pub fn path_and_query(&self) -> String {
        match self {
            BackendCommand::RebuildPackage {
                project,
                package,
                repository,
                arch,
                filter_source_repository,
            } => {
                let mut out = format!("/build/{project}?cmd=rebuild&package={package}");
                if let Some(repository) = repository {
                    out.push_str(&format!("&repository={repository}"));
                }
                if let Some(arch) = arch {
                    out.push_str(&format!("&arch={arch}"));
                }
                if let Some(filter) = filter_source_repository {
                    out.push_str(&format!("&filter_source_repository={filter}"));
                }
                out
            }

            BackendCommand::CopyBuild {
                source_project,
                source_package,
                source_repository,
                target_project,
                target_repository,
                arch,
                resign,
                multibuild,
                flavor,
            } => {
                let container = match flavor {
                    Some(flavor) => format!("{source_package}:{flavor}"),
                    None => source_package.to_string(),
                };
                let mut out = format!(
                    "/build/{target_project}/{target_repository}/{arch}/{container}\
                     ?cmd=copy&oproject={source_project}&opackage={container}\
                     &orepository={source_repository}"
                );
                if *resign {
                    out.push_str("&resign=1");
                }
                if *multibuild {
                    out.push_str("&multibuild=1");
                }
                out
            }

            BackendCommand::TriggerServices {
                project,
                package,
                user,
            } => {
                format!("/source/{project}/{package}?cmd=runservice&user={user}")
            }
        }
    }
}

impl fmt::Display for BackendCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendCommand::RebuildPackage {
                project, package, ..
            } => write!(f, "rebuild {project}/{package}"),
            BackendCommand::CopyBuild {
                source_project,
                source_package,
                target_project,
                target_repository,
                arch,
                ..
            } => write!(
                f,
                "copy {source_project}/{source_package} -> {target_project}/{target_repository}/{arch}"
            ),
            BackendCommand::TriggerServices {
                project, package, ..
            } => write!(f, "runservice {project}/{package}"),
        }
    }
}
