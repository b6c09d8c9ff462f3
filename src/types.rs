//! Core types: the raw message, the MIME tree and the ticket record

use std::fmt;

use mailparse::{MailAddr, MailHeader, addrparse_header};
use serde::{Deserialize, Serialize};

use crate::content_type::{ContentType, Disposition};
use crate::encoding::TransferEncoding;
use crate::headers::HeaderSet;

/// Undecoded message bytes as handed over by the mail transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    bytes: Vec<u8>,
    declared_size: usize,
}

impl RawMessage {
    #[must_use]
    pub const fn new(bytes: Vec<u8>, declared_size: usize) -> Self {
        Self {
            bytes,
            declared_size,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size announced by the transport, which may differ from `len()`
    #[must_use]
    pub const fn declared_size(&self) -> usize {
        self.declared_size
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// A parsed message: top-level headers and the root of the MIME tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMessage {
    pub headers: HeaderSet,
    pub root: BodyPart,
}

/// Content of a MIME part: either leaf bytes or child parts, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartBody {
    /// Transfer-decoded content; charset decoding is left to the reader
    Leaf(Vec<u8>),

    /// Children of a multipart container, in document order
    Multipart(Vec<BodyPart>),
}

/// A node of the MIME tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyPart {
    pub content_type: ContentType,
    pub transfer_encoding: TransferEncoding,
    pub disposition: Disposition,

    /// From `Content-Disposition: filename=`, else `Content-Type: name=`
    pub filename: Option<String>,

    pub body: PartBody,
}

impl BodyPart {
    /// Lowercase `type/subtype`
    #[must_use]
    pub fn mime_type(&self) -> &str {
        self.content_type.mime_type()
    }

    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.content_type.charset()
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self.body, PartBody::Leaf(_))
    }

    /// Leaf content, `None` for multipart containers
    #[must_use]
    pub fn content(&self) -> Option<&[u8]> {
        match &self.body {
            PartBody::Leaf(bytes) => Some(bytes),
            PartBody::Multipart(_) => None,
        }
    }

    /// Child parts, empty for leaves
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match &self.body {
            PartBody::Leaf(_) => &[],
            PartBody::Multipart(children) => children,
        }
    }

    /// Inline `text/plain` leaf that belongs to the message body
    #[must_use]
    pub fn is_body_text(&self) -> bool {
        self.is_leaf()
            && self.mime_type() == "text/plain"
            && self.disposition != Disposition::Attachment
    }

    /// Any other leaf is handed to the ticket as an attachment
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.is_leaf() && !self.is_body_text()
    }

    /// Leaves in depth-first document order
    #[must_use]
    pub fn leaves(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Self>) {
        match &self.body {
            PartBody::Leaf(_) => out.push(self),
            PartBody::Multipart(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Nesting depth of the tree below and including this part
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(Self::depth).max().unwrap_or(0)
    }
}

/// Sender of a message, taken from the `From` header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Display name, or the address when the header has none
    pub name: String,

    /// Email address (e.g., "john@example.com")
    pub address: String,
}

impl Sender {
    /// Parse a raw (undecoded, possibly folded) `From` value.
    ///
    /// The first mailbox wins; in a group the first member is used.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let line = format!("From: {}", raw.trim());
        let (header, _) = mailparse::parse_header(line.as_bytes()).ok()?;
        Self::from_header(&header)
    }

    /// Sender from a parsed `From` header. Encoded-words in the display
    /// name are decoded during address parsing, so an encoded comma or
    /// bracket cannot split the address.
    #[must_use]
    pub fn from_header(header: &MailHeader<'_>) -> Option<Self> {
        let decoded = header.get_value();
        let decoded = decoded.trim();
        if decoded.is_empty() {
            return None;
        }

        if let Ok(list) = addrparse_header(header) {
            let first = list.iter().find_map(|addr| match addr {
                MailAddr::Single(info) => Some(info.clone()),
                MailAddr::Group(group) => group.addrs.first().cloned(),
            });
            if let Some(info) = first {
                return Some(Self::from_parts(info.display_name.as_deref(), &info.addr));
            }
        }

        // Try to match "Name <email@domain.com>" format
        if let Some(start) = decoded.find('<')
            && let Some(end) = decoded[start..].find('>')
        {
            let address = decoded[start + 1..start + end].trim();
            if !address.is_empty() {
                return Some(Self::from_parts(Some(&decoded[..start]), address));
            }
        }

        // Whatever is left is taken as the address itself
        Some(Self::from_parts(None, decoded))
    }

    fn from_parts(name: Option<&str>, address: &str) -> Self {
        let address = address.trim().to_string();
        let name = name
            .map(|n| n.trim().trim_matches('"').trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| address.clone());
        Self { name, address }
    }

    /// Whether the header carried a display name distinct from the address
    #[must_use]
    pub fn has_display_name(&self) -> bool {
        self.name != self.address
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_display_name() {
            write!(f, "{} <{}>", self.name, self.address)
        } else {
            write!(f, "{}", self.address)
        }
    }
}

/// Ticket data derived from one message, serialized as the API payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub subject: String,

    #[serde(rename = "name")]
    pub sender_name: String,

    #[serde(rename = "email")]
    pub sender_email: String,

    /// Plain-text body parts joined by a blank line
    pub message: String,

    pub attachments: Vec<AttachmentRecord>,
}

/// One attachment of a ticket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRecord {
    /// Empty when the part declared no name
    pub filename: String,

    /// Lowercase `type/subtype`
    pub mime_type: String,

    /// Standard padded base64 of the decoded part content
    pub content: String,
}
