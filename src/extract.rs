//! Ticket extraction from a parsed MIME tree

use tracing::debug;

use crate::encoding::{decode_text, encode_base64};
use crate::types::{AttachmentRecord, BodyPart, ParsedMessage, Sender, TicketRecord};

/// Derive the ticket fields from a parsed message.
///
/// Never fails: a missing `From` or `Subject` gives empty strings, and a
/// message without any inline `text/plain` part gives an empty body (HTML
/// parts are not converted). Every body part takes its place in the join,
/// empty ones included.
#[must_use]
pub fn extract(msg: &ParsedMessage) -> TicketRecord {
    let subject = msg
        .headers
        .get("Subject")
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let sender = msg
        .headers
        .get_raw("From")
        .and_then(Sender::parse)
        .unwrap_or_default();

    let leaves = msg.root.leaves();
    let message = leaves
        .iter()
        .filter(|part| part.is_body_text())
        .map(|part| body_text(part))
        .collect::<Vec<_>>()
        .join("\n\n");

    let attachments: Vec<AttachmentRecord> = leaves
        .iter()
        .filter(|part| part.is_attachment())
        .map(|part| attachment(part))
        .collect();

    debug!(
        "Extracted ticket from {sender}: {} chars of text, {} attachments",
        message.len(),
        attachments.len()
    );

    TicketRecord {
        subject,
        sender_name: sender.name,
        sender_email: sender.address,
        message,
        attachments,
    }
}

/// Charset-decoded text of a leaf with LF line endings and without the
/// final line break
fn body_text(part: &BodyPart) -> String {
    let text = decode_text(part.content().unwrap_or_default(), part.charset());
    normalize_text(&text)
}

fn normalize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    text.trim_end_matches('\n').to_string()
}

fn attachment(part: &BodyPart) -> AttachmentRecord {
    AttachmentRecord {
        filename: part.filename.clone().unwrap_or_default(),
        mime_type: part.mime_type().to_string(),
        content: encode_base64(part.content().unwrap_or_default()),
    }
}
