//! The in-memory directory of projects, packages, and tokens.
//!
//! The durable store for these records lives outside this core; the directory
//! is a read-only, request-serving view of it, loaded once at startup from a
//! JSON snapshot file and shared across requests. Nothing here mutates after
//! load.
//!
//! # File Format
//!
//! A single JSON document with `projects` and `tokens` arrays; see the
//! serde derives on the types below. Example fixtures live in the tests.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::types::{Arch, Login, PackageName, ProjectName, RepositoryName, Token, TokenId, TokenKind};

/// Errors that can occur while loading a directory snapshot.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// IO error reading the snapshot file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What causes a release target to fire.
///
/// Token-triggered release only ever considers `Manual` targets; targets
/// driven by the build scheduler are excluded from the trigger path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    Manual,
    Scheduled,
}

/// A configured mapping from a source repository to a target
/// project/repository, used by the release action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseTarget {
    pub target_project: ProjectName,
    pub target_repository: RepositoryName,
    pub trigger: TriggerMode,
}

/// A build repository within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: RepositoryName,
    pub architectures: Vec<Arch>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub release_targets: Vec<ReleaseTarget>,
}

/// A package within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: PackageName,

    /// Logins with source-modify rights granted directly on the package.
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub maintainers: HashSet<Login>,

    /// Configured multibuild flavors, empty for plain packages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub multibuild_flavors: Vec<String>,
}

impl Package {
    pub fn is_maintainer(&self, login: &Login) -> bool {
        self.maintainers.contains(login)
    }

    pub fn has_flavor(&self, flavor: &str) -> bool {
        self.multibuild_flavors.iter().any(|f| f == flavor)
    }
}

/// A project with its packages and repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: ProjectName,

    /// Logins with source-modify rights on the whole project.
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub maintainers: HashSet<Login>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<Repository>,
}

impl Project {
    pub fn is_maintainer(&self, login: &Login) -> bool {
        self.maintainers.contains(login)
    }

    /// Looks up a package by its base name (multibuild suffix already
    /// stripped by the caller).
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name.as_str() == name)
    }

    pub fn repository(&self, name: &RepositoryName) -> Option<&Repository> {
        self.repositories.iter().find(|r| &r.name == name)
    }
}

/// The read-only directory served to request handlers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl Directory {
    /// Loads a directory snapshot from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name.as_str() == name)
    }

    pub fn token_by_id(&self, id: TokenId) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    pub fn token_by_secret(&self, secret: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.secret == secret)
    }

    /// All service-kind tokens, in insertion order.
    ///
    /// The signed-body extraction strategy tests each of these secrets
    /// against the request signature.
    pub fn service_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PackageBinding;
    use chrono::Utc;

    fn sample_directory() -> Directory {
        Directory {
            projects: vec![Project {
                name: ProjectName::from("home:tom"),
                maintainers: [Login::from("tom")].into_iter().collect(),
                packages: vec![Package {
                    name: PackageName::from("apache2"),
                    maintainers: HashSet::new(),
                    multibuild_flavors: vec!["tls".to_string()],
                }],
                repositories: vec![Repository {
                    name: RepositoryName::from("standard"),
                    architectures: vec![Arch::from("x86_64")],
                    release_targets: vec![ReleaseTarget {
                        target_project: ProjectName::from("home:tom:released"),
                        target_repository: RepositoryName::from("released"),
                        trigger: TriggerMode::Manual,
                    }],
                }],
            }],
            tokens: vec![Token {
                id: TokenId(1),
                secret: "s3cr3t".to_string(),
                kind: TokenKind::Service,
                executor: Login::from("tom"),
                package: Some(PackageBinding {
                    project: ProjectName::from("home:tom"),
                    package: PackageName::from("apache2"),
                }),
                created_at: Utc::now(),
            }],
        }
    }

    #[test]
    fn lookups_by_name_and_id() {
        let dir = sample_directory();

        let project = dir.project("home:tom").unwrap();
        assert!(project.package("apache2").is_some());
        assert!(project.package("nginx").is_none());
        assert!(dir.project("nope").is_none());

        assert!(dir.token_by_id(TokenId(1)).is_some());
        assert!(dir.token_by_id(TokenId(9)).is_none());
        assert!(dir.token_by_secret("s3cr3t").is_some());
        assert!(dir.token_by_secret("other").is_none());
    }

    #[test]
    fn service_tokens_filters_by_kind() {
        let mut dir = sample_directory();
        dir.tokens.push(Token {
            id: TokenId(2),
            secret: "rebuild-secret".to_string(),
            kind: TokenKind::Rebuild,
            executor: Login::from("tom"),
            package: None,
            created_at: Utc::now(),
        });

        let ids: Vec<_> = dir.service_tokens().map(|t| t.id).collect();
        assert_eq!(ids, vec![TokenId(1)]);
    }

    #[test]
    fn package_flavor_membership() {
        let dir = sample_directory();
        let package = dir.project("home:tom").unwrap().package("apache2").unwrap();
        assert!(package.has_flavor("tls"));
        assert!(!package.has_flavor("minimal"));
    }

    #[test]
    fn snapshot_roundtrips_through_json() {
        let dir = sample_directory();
        let json = serde_json::to_string_pretty(&dir).unwrap();
        let back: Directory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dir);
    }

    #[test]
    fn snapshot_accepts_minimal_document() {
        let dir: Directory = serde_json::from_str("{}").unwrap();
        assert!(dir.projects.is_empty());
        assert!(dir.tokens.is_empty());
    }
}
