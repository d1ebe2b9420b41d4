//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different name spaces (e.g., using
//! a package name where a repository name is expected) and make command
//! construction self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A project name, e.g. `devel:languages:rust`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(pub String);

impl ProjectName {
    pub fn new(s: impl Into<String>) -> Self {
        ProjectName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        ProjectName(s.to_string())
    }
}

/// A package name within a project.
///
/// Multibuild containers are addressed as `package:flavor`; this type holds
/// the base name only. See [`split_multibuild`] for parsing request input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageName(pub String);

impl PackageName {
    pub fn new(s: impl Into<String>) -> Self {
        PackageName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        PackageName(s.to_string())
    }
}

/// A repository name within a project, e.g. `standard`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryName(pub String);

impl RepositoryName {
    pub fn new(s: impl Into<String>) -> Self {
        RepositoryName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RepositoryName {
    fn from(s: &str) -> Self {
        RepositoryName(s.to_string())
    }
}

/// A build architecture, e.g. `x86_64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arch(pub String);

impl Arch {
    pub fn new(s: impl Into<String>) -> Self {
        Arch(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Arch {
    fn from(s: &str) -> Self {
        Arch(s.to_string())
    }
}

/// A durable trigger token identifier.
///
/// Token ids travel as the `id` query parameter of webhook routes. A value
/// that does not parse as an id simply matches no token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u64);

impl TokenId {
    /// Parses a token id from request input.
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse().ok().map(TokenId)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TokenId {
    fn from(n: u64) -> Self {
        TokenId(n)
    }
}

/// A user login name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Login(pub String);

impl Login {
    pub fn new(s: impl Into<String>) -> Self {
        Login(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Login {
    fn from(s: &str) -> Self {
        Login(s.to_string())
    }
}

/// Splits a requested package name into its base name and multibuild flavor.
///
/// Multibuild containers are addressed as `package:flavor`. The base name is
/// what exists in the project; the flavor selects one variant of the package's
/// build matrix and is only meaningful once the package is resolved.
pub fn split_multibuild(requested: &str) -> (&str, Option<&str>) {
    match requested.split_once(':') {
        Some((base, flavor)) => (base, Some(flavor)),
        None => (requested, None),
    }
}
