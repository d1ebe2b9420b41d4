//! Shared test fixtures.

use chrono::Utc;
use std::collections::HashSet;

use crate::registry::{Directory, Package, Project, ReleaseTarget, Repository, TriggerMode};
use crate::types::{Login, PackageBinding, Token, TokenId, TokenKind};

/// A directory mirroring the canonical trigger scenarios:
///
/// - `project` (maintainer `foo`) with package `package_trigger` and
///   repository `package_test_repository` (x86_64) releasing manually into
///   `target_project`/`target_repository`;
/// - `target_project` (maintainer `foo`);
/// - `home:tom` (maintainer `tom`) with package `apache2` carrying a `tls`
///   multibuild flavor.
///
/// No tokens; tests add the ones they need.
pub fn base_directory() -> Directory {
    Directory {
        projects: vec![
            Project {
                name: "project".into(),
                maintainers: logins(&["foo"]),
                packages: vec![Package {
                    name: "package_trigger".into(),
                    maintainers: HashSet::new(),
                    multibuild_flavors: Vec::new(),
                }],
                repositories: vec![Repository {
                    name: "package_test_repository".into(),
                    architectures: vec!["x86_64".into()],
                    release_targets: vec![ReleaseTarget {
                        target_project: "target_project".into(),
                        target_repository: "target_repository".into(),
                        trigger: TriggerMode::Manual,
                    }],
                }],
            },
            Project {
                name: "target_project".into(),
                maintainers: logins(&["foo"]),
                packages: Vec::new(),
                repositories: vec![Repository {
                    name: "target_repository".into(),
                    architectures: vec!["x86_64".into()],
                    release_targets: Vec::new(),
                }],
            },
            Project {
                name: "home:tom".into(),
                maintainers: logins(&["tom"]),
                packages: vec![Package {
                    name: "apache2".into(),
                    maintainers: HashSet::new(),
                    multibuild_flavors: vec!["tls".to_string()],
                }],
                repositories: Vec::new(),
            },
        ],
        tokens: Vec::new(),
    }
}

fn logins(names: &[&str]) -> HashSet<Login> {
    names.iter().map(|n| Login::from(*n)).collect()
}

/// An unbound or explicitly bound token.
pub fn token(
    id: u64,
    secret: &str,
    kind: TokenKind,
    executor: &str,
    binding: Option<(&str, &str)>,
) -> Token {
    Token {
        id: TokenId(id),
        secret: secret.to_string(),
        kind,
        executor: executor.into(),
        package: binding.map(|(project, package)| PackageBinding {
            project: project.into(),
            package: package.into(),
        }),
        created_at: Utc::now(),
    }
}

/// A token bound to `project/package`.
pub fn bound_token(
    id: u64,
    secret: &str,
    kind: TokenKind,
    executor: &str,
    project: &str,
    package: &str,
) -> Token {
    token(id, secret, kind, executor, Some((project, package)))
}
