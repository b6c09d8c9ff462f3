//! Per-message orchestration: read, parse, extract, submit, or reject

use std::fmt;

use tokio::io::AsyncRead;
use tracing::{debug, info, warn};

use crate::error::ProcessError;
use crate::extract::extract;
use crate::parser::parse;
use crate::reader::read_raw;
use crate::submit::TicketSubmitter;
use crate::types::TicketRecord;

/// The only reason ever reported back to the sender
pub const REJECT_REASON: &str = "Failed to process email.";

/// A message as handed over by the mail transport
pub trait InboundMail {
    /// Envelope sender
    fn envelope_from(&self) -> &str;

    /// Envelope recipient
    fn envelope_to(&self) -> &str;

    /// Size announced by the transport
    fn raw_size(&self) -> usize;

    /// The raw RFC 5322 byte stream, read once
    fn raw(&mut self) -> &mut (dyn AsyncRead + Unpin + Send);

    /// Tell the transport to reject the message
    fn set_reject(&mut self, reason: &str);
}

/// Processing stage of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Parsing,
    Extracting,
    Submitting,
    Accepted,
    Rejected,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Parsing => "parsing",
            Self::Extracting => "extracting",
            Self::Submitting => "submitting",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Terminal result of [`Worker::process`]
#[derive(Debug)]
pub enum Outcome {
    /// The ticket was submitted
    Accepted(TicketRecord),

    /// The transport was told to reject; the error is for local logs only
    Rejected(ProcessError),
}

impl Outcome {
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Accepted(_) => Stage::Accepted,
            Self::Rejected(_) => Stage::Rejected,
        }
    }

    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Turns inbound messages into tickets with a given submitter
#[derive(Debug, Clone)]
pub struct Worker<S> {
    submitter: S,
}

impl<S: TicketSubmitter> Worker<S> {
    pub const fn new(submitter: S) -> Self {
        Self { submitter }
    }

    pub const fn submitter(&self) -> &S {
        &self.submitter
    }

    /// Process one message end to end.
    ///
    /// Any failure calls `set_reject` exactly once with [`REJECT_REASON`];
    /// success leaves the transport untouched.
    pub async fn process<M>(&self, mail: &mut M) -> Outcome
    where
        M: InboundMail + Send + ?Sized,
    {
        debug!(
            "Message {} from {} to {} ({} bytes declared)",
            Stage::Received,
            mail.envelope_from(),
            mail.envelope_to(),
            mail.raw_size()
        );

        match self.run(mail).await {
            Ok(ticket) => {
                info!("Message from {} {}", mail.envelope_from(), Stage::Accepted);
                Outcome::Accepted(ticket)
            }
            Err(e) => {
                warn!("Message from {} {}: {e}", mail.envelope_from(), Stage::Rejected);
                mail.set_reject(REJECT_REASON);
                Outcome::Rejected(e)
            }
        }
    }

    async fn run<M>(&self, mail: &mut M) -> Result<TicketRecord, ProcessError>
    where
        M: InboundMail + Send + ?Sized,
    {
        let declared = mail.raw_size();
        let raw = read_raw(mail.raw(), declared)
            .await
            .map_err(ProcessError::Read)?;

        debug!("Stage {}: {} bytes", Stage::Parsing, raw.len());
        let parsed = parse(raw.as_bytes())?;

        debug!("Stage {}", Stage::Extracting);
        let ticket = extract(&parsed);

        debug!("Stage {}: \"{}\"", Stage::Submitting, ticket.subject);
        self.submitter.submit(&ticket).await?;
        Ok(ticket)
    }
}
