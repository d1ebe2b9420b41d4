//! Read-only registry of projects, packages, repositories, and tokens.

pub mod directory;

pub use directory::{
    Directory, DirectoryError, Package, Project, ReleaseTarget, Repository, TriggerMode,
};
