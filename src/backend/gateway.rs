//! The backend gateway trait.
//!
//! The gateway executes [`BackendCommand`]s against the build system. The
//! trait-based design keeps the trigger pipeline independent of transport and
//! enables a recording implementation for tests.
//!
//! Backend calls are synchronous from the pipeline's perspective: a slow or
//! failed call surfaces as an error for the whole request. Retries, if any,
//! belong behind the gateway, never in this core.

use std::future::Future;
use std::sync::Mutex;

use thiserror::Error;

use super::command::BackendCommand;

/// The backend's verbatim status document, returned opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendReply(pub String);

impl BackendReply {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors raised by a backend gateway.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend was unreachable or the connection failed mid-call.
    #[error("backend transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Executes backend commands.
///
/// # Example (recording gateway for tests)
///
/// ```ignore
/// let backend = RecordingBackend::replying("<status code=\"ok\" />\n");
/// let reply = backend.dispatch(command).await?;
/// assert_eq!(backend.commands().len(), 1);
/// ```
pub trait BackendGateway {
    /// Execute one command and return the backend's status document.
    fn dispatch(
        &self,
        command: BackendCommand,
    ) -> impl Future<Output = Result<BackendReply, BackendError>> + Send;
}

impl<G: BackendGateway + Send + Sync> BackendGateway for std::sync::Arc<G> {
    fn dispatch(
        &self,
        command: BackendCommand,
    ) -> impl Future<Output = Result<BackendReply, BackendError>> + Send {
        (**self).dispatch(command)
    }
}

/// A gateway that records commands and returns a canned reply.
///
/// Used by the crate's own tests and useful for integration tests downstream;
/// this is the mock-interpreter side of the effects-as-data design.
#[derive(Debug)]
pub struct RecordingBackend {
    commands: Mutex<Vec<BackendCommand>>,
    reply: String,
    fail: Option<BackendErrorSpec>,
}

/// How a [`RecordingBackend`] should fail, when configured to.
#[derive(Debug, Clone)]
enum BackendErrorSpec {
    Transport(String),
    Rejected { status: u16, body: String },
}

impl RecordingBackend {
    /// A gateway answering every command with the given status document.
    pub fn replying(reply: impl Into<String>) -> Self {
        RecordingBackend {
            commands: Mutex::new(Vec::new()),
            reply: reply.into(),
            fail: None,
        }
    }

    /// A gateway failing every command with a transport error.
    pub fn failing_transport(message: impl Into<String>) -> Self {
        RecordingBackend {
            commands: Mutex::new(Vec::new()),
            reply: String::new(),
            fail: Some(BackendErrorSpec::Transport(message.into())),
        }
    }

    /// A gateway rejecting every command with the given status.
    pub fn rejecting(status: u16, body: impl Into<String>) -> Self {
        RecordingBackend {
            commands: Mutex::new(Vec::new()),
            reply: String::new(),
            fail: Some(BackendErrorSpec::Rejected {
                status,
                body: body.into(),
            }),
        }
    }

    /// The commands dispatched so far, in order.
    pub fn commands(&self) -> Vec<BackendCommand> {
        self.commands.lock().expect("recording backend lock").clone()
    }
}

impl BackendGateway for RecordingBackend {
    async fn dispatch(&self, command: BackendCommand) -> Result<BackendReply, BackendError> {
        self.commands
            .lock()
            .expect("recording backend lock")
            .push(command);

        match &self.fail {
            None => Ok(BackendReply(self.reply.clone())),
            Some(BackendErrorSpec::Transport(message)) => {
                Err(BackendError::Transport(message.clone()))
            }
            Some(BackendErrorSpec::Rejected { status, body }) => Err(BackendError::Rejected {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}
