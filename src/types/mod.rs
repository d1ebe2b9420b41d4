//! Core domain types shared across the crate.

pub mod ids;
pub mod token;

pub use ids::{
    Arch, Login, PackageName, ProjectName, RepositoryName, TokenId, split_multibuild,
};
pub use token::{AuthProof, AuthenticatedToken, PackageBinding, Token, TokenKind};
