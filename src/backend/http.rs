//! HTTP gateway implementation against a live build backend.

use tracing::debug;

use super::command::BackendCommand;
use super::gateway::{BackendError, BackendGateway, BackendReply};

/// A gateway that POSTs commands to the backend over HTTP.
///
/// Commands become `POST {base_url}{path_and_query}` with an empty body; the
/// backend answers with a status document, returned verbatim. Non-success
/// statuses and transport failures surface as [`BackendError`] and are never
/// retried here.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a gateway against the given base URL, e.g.
    /// `http://localhost:5352`.
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpBackend {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl BackendGateway for HttpBackend {
    async fn dispatch(&self, command: BackendCommand) -> Result<BackendReply, BackendError> {
        let url = format!("{}{}", self.base_url, command.path_and_query());
        debug!(%command, %url, "dispatching backend command");

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(BackendReply(body))
    }
}
