//! The trigger pipeline: context resolution, authorization, action planning.
//!
//! A request moves through fixed states, rejecting at the first failure and
//! never retrying: token extraction (`auth`), context resolution, capability
//! checks, planning, then backend dispatch (`server::trigger` drives the
//! whole sequence).

pub mod action;
pub mod authorize;
pub mod context;
pub mod error;

pub use action::plan;
pub use authorize::authorize;
pub use context::{MatchedReleaseTarget, TriggerContext, TriggerParams, resolve};
pub use error::TriggerError;
