//! Ticket submission to the help-desk API

use std::fmt;
use std::future::Future;
use std::io::Write;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::SubmissionError;
use crate::types::TicketRecord;

/// Error bodies longer than this are cut before they reach the logs
const MAX_ERROR_BODY: usize = 512;

/// Delivers a ticket somewhere. One attempt per call, no retries.
pub trait TicketSubmitter {
    fn submit(
        &self,
        ticket: &TicketRecord,
    ) -> impl Future<Output = Result<(), SubmissionError>> + Send;
}

/// POSTs tickets as JSON with `Authorization: Basic <credential>`
#[derive(Clone)]
pub struct HttpSubmitter {
    client: Client,
    endpoint: Url,
    credential: String,
}

impl HttpSubmitter {
    #[must_use]
    pub fn new(endpoint: Url, credential: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint, credential)
    }

    #[must_use]
    pub fn with_client(client: Client, endpoint: Url, credential: impl Into<String>) -> Self {
        Self {
            client,
            endpoint,
            credential: credential.into(),
        }
    }

    /// Build a client honoring the configured request timeout, if any
    pub fn from_config(config: &Config) -> Result<Self, SubmissionError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(
            builder.build()?,
            config.endpoint.clone(),
            config.api_key.clone(),
        ))
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl fmt::Debug for HttpSubmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSubmitter")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl TicketSubmitter for HttpSubmitter {
    async fn submit(&self, ticket: &TicketRecord) -> Result<(), SubmissionError> {
        let body = serde_json::to_vec(ticket)?;
        debug!("POST {} ({} bytes)", self.endpoint, body.len());

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Basic {}", self.credential))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
            return Err(SubmissionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            "Ticket \"{}\" from {} accepted with HTTP {}",
            ticket.subject,
            ticket.sender_email,
            status.as_u16()
        );
        Ok(())
    }
}

/// Writes the JSON payload to stdout instead of calling the API
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSubmitter;

impl TicketSubmitter for StdoutSubmitter {
    async fn submit(&self, ticket: &TicketRecord) -> Result<(), SubmissionError> {
        let json = serde_json::to_string_pretty(ticket)?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{json}")?;
        out.flush()?;
        Ok(())
    }
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundary() {
        let mut s = "ééé".to_string();
        truncate_at_char_boundary(&mut s, 3);
        assert_eq!(s, "é");
    }

    #[test]
    fn debug_hides_credential() {
        let submitter = HttpSubmitter::new(
            Url::parse("https://example.com/api/tickets").unwrap(),
            "secret-key",
        );
        let debug = format!("{submitter:?}");
        assert!(debug.contains("example.com"));
        assert!(!debug.contains("secret-key"));
    }
}
