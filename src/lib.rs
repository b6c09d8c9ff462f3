// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Email to help-desk ticket bridge
//!
//! Parses a raw RFC 5322 / MIME message into a typed tree, extracts the
//! ticket fields (sender, subject, plain-text body, attachments) and posts
//! them as JSON to a ticketing API. Any failure is reported back to the
//! mail transport as a rejection with one fixed reason.
//!
//! # Example
//!
//! ```rust
//! use email_ticket::{extract, parse};
//!
//! let raw = b"From: John Doe <john@example.com>\r\nSubject: Test Email\r\n\r\nHello\r\n";
//! let ticket = extract(&parse(raw).unwrap());
//!
//! assert_eq!(ticket.sender_name, "John Doe");
//! assert_eq!(ticket.sender_email, "john@example.com");
//! assert_eq!(ticket.message, "Hello");
//! ```

mod config;
mod content_type;
mod encoding;
mod error;
mod extract;
mod headers;
mod parser;
mod reader;
mod submit;
mod types;
mod worker;

pub use config::{Config, Settings};
pub use content_type::{ContentDisposition, ContentType, Disposition};
pub use encoding::{TransferEncoding, decode_base64, decode_text, encode_base64};
pub use error::{ConfigError, MalformedMessageError, ProcessError, Result, SubmissionError};
pub use extract::extract;
pub use headers::{HeaderField, HeaderSet, split_header_body};
pub use parser::{MAX_DEPTH, parse};
pub use reader::read_raw;
pub use submit::{HttpSubmitter, StdoutSubmitter, TicketSubmitter};
pub use types::*;
pub use worker::{InboundMail, Outcome, REJECT_REASON, Stage, Worker};
