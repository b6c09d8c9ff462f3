//! Recursive MIME parser: raw RFC 5322 bytes to a [`ParsedMessage`] tree

use std::sync::LazyLock;

use regex::bytes::Regex;
use tracing::{debug, warn};

use crate::content_type::{ContentDisposition, ContentType, Disposition};
use crate::encoding::TransferEncoding;
use crate::error::{MalformedMessageError, Result};
use crate::headers::{HeaderSet, split_header_body};
use crate::types::{BodyPart, ParsedMessage, PartBody};

static FROM_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^From[ \t]*:").unwrap());

/// Maximum multipart nesting; deeper containers are kept as opaque leaves
pub const MAX_DEPTH: usize = 10;

/// Parse raw message bytes into headers and a MIME tree.
///
/// Fails when there is no blank line after the header block, when a
/// header line is not `name: value`, or when a multipart part has no
/// boundary. Everything else degrades to defaults.
pub fn parse(raw: &[u8]) -> Result<ParsedMessage> {
    let raw = skip_envelope_line(raw);
    let (block, body) =
        split_header_body(raw).ok_or(MalformedMessageError::MissingHeaderSeparator)?;
    let headers = HeaderSet::parse(block)?;
    let root = build_part(&headers, body, &ContentType::text_plain(), 0)?;

    debug!(
        "Parsed message: {} headers, root {}, {} leaves",
        headers.len(),
        root.mime_type(),
        root.leaves().len()
    );

    Ok(ParsedMessage { headers, root })
}

/// Strip a UTF-8 BOM and the mbox `From ` line that pipe transports
/// prepend. An obsolete-syntax `From :` header is left alone.
fn skip_envelope_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    if data.starts_with(b"From ")
        && !FROM_HEADER.is_match(data)
        && let Some(pos) = data.iter().position(|&b| b == b'\n')
    {
        return &data[pos + 1..];
    }
    data
}

fn build_part(
    headers: &HeaderSet,
    body: &[u8],
    default_type: &ContentType,
    depth: usize,
) -> Result<BodyPart> {
    let content_type = headers
        .get("Content-Type")
        .and_then(ContentType::parse)
        .unwrap_or_else(|| default_type.clone());
    let transfer_encoding = TransferEncoding::parse(headers.get("Content-Transfer-Encoding"));
    let disposition_header = headers
        .get("Content-Disposition")
        .map(ContentDisposition::parse);
    let disposition = disposition_header
        .as_ref()
        .map_or(Disposition::Inline, |cd| cd.disposition);
    let filename = disposition_header
        .as_ref()
        .and_then(ContentDisposition::filename)
        .or_else(|| content_type.parameter("name").filter(|n| !n.is_empty()))
        .map(str::to_string);

    let body = if content_type.is_multipart() {
        let boundary = content_type
            .boundary()
            .ok_or_else(|| MalformedMessageError::MissingBoundary(content_type.to_string()))?;
        if depth >= MAX_DEPTH {
            warn!("Multipart nesting deeper than {MAX_DEPTH}, keeping part opaque");
            PartBody::Leaf(body.to_vec())
        } else {
            let child_default = if content_type.mime_type() == "multipart/digest" {
                ContentType::message_rfc822()
            } else {
                ContentType::text_plain()
            };
            let children = split_multipart(body, boundary)
                .into_iter()
                .map(|segment| parse_segment(segment, &child_default, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            PartBody::Multipart(children)
        }
    } else {
        PartBody::Leaf(transfer_encoding.decode(body))
    };

    Ok(BodyPart {
        content_type,
        transfer_encoding,
        disposition,
        filename,
        body,
    })
}

/// Parse one multipart segment. Segments are lenient: a segment whose
/// header block does not parse is read as a body with default headers.
fn parse_segment(segment: &[u8], default_type: &ContentType, depth: usize) -> Result<BodyPart> {
    let (headers, body) = match split_header_body(segment) {
        Some((block, body)) => match HeaderSet::parse(block) {
            Ok(headers) => (headers, body),
            Err(e) => {
                debug!("Part headers unreadable ({e}), treating segment as body");
                (HeaderSet::default(), segment)
            }
        },
        None => match HeaderSet::parse(segment) {
            Ok(headers) if !headers.is_empty() => (headers, &segment[segment.len()..]),
            _ => (HeaderSet::default(), segment),
        },
    };
    build_part(&headers, body, default_type, depth)
}

/// Split a multipart body into part segments.
///
/// The preamble before the first delimiter and the epilogue after the
/// close delimiter are dropped. The line break before a delimiter
/// belongs to the delimiter. A missing close delimiter ends the last part
/// at the end of the body.
fn split_multipart<'a>(body: &'a [u8], boundary: &str) -> Vec<&'a [u8]> {
    let delimiter = format!("--{boundary}");
    let mut parts = Vec::new();
    let mut current: Option<usize> = None;
    let mut pos = 0;

    while pos < body.len() {
        let line_end = body[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(body.len(), |i| pos + i + 1);
        let line = trim_line(&body[pos..line_end]);

        if let Some(rest) = line.strip_prefix(delimiter.as_bytes()) {
            let closing = rest == b"--";
            if rest.is_empty() || closing {
                if let Some(start) = current.take() {
                    parts.push(strip_line_break(&body[start..pos]));
                }
                if closing {
                    return parts;
                }
                current = Some(line_end);
            }
        }
        pos = line_end;
    }

    if let Some(start) = current {
        debug!("Multipart body ended without close delimiter for {boundary}");
        parts.push(&body[start.min(body.len())..]);
    }
    parts
}

/// Line without its terminator and trailing transport padding
fn trim_line(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| !matches!(b, b'\r' | b'\n' | b' ' | b'\t'))
        .map_or(0, |i| i + 1);
    &line[..end]
}

fn strip_line_break(segment: &[u8]) -> &[u8] {
    segment
        .strip_suffix(b"\r\n")
        .or_else(|| segment.strip_suffix(b"\n"))
        .unwrap_or(segment)
}
