//! RFC 5322 header block parsing

use mailparse::parse_headers;
use serde::{Deserialize, Serialize};

use crate::encoding::header_text;
use crate::error::{MalformedMessageError, Result};

/// One unfolded header field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderField {
    /// Name as it appeared in the message
    pub name: String,

    /// Value as it appeared in the message, folding included
    pub raw: String,

    /// Unfolded value with RFC 2047 encoded-words decoded
    pub value: String,
}

/// Ordered header fields with case-insensitive lookup.
///
/// Repeated fields (`Received`, `Comments`) keep every occurrence in
/// message order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSet {
    fields: Vec<HeaderField>,
}

impl HeaderSet {
    /// Parse a header block (everything before the blank line).
    ///
    /// A line that is neither a continuation nor `name: value` is an
    /// error, as is a continuation line before the first field.
    pub fn parse(block: &[u8]) -> Result<Self> {
        validate_lines(block)?;
        if block.is_empty() {
            return Ok(Self::default());
        }

        let (headers, _) = parse_headers(block)
            .map_err(|e| MalformedMessageError::InvalidHeader(e.to_string()))?;
        let fields = headers
            .iter()
            .map(|header| HeaderField {
                name: header.get_key().trim_end().to_string(),
                raw: header_text(header.get_value_raw()),
                value: header.get_value().trim().to_string(),
            })
            .collect();
        Ok(Self { fields })
    }

    /// First decoded value of the named field
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.value.as_str())
    }

    /// First raw (undecoded) value of the named field
    #[must_use]
    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.raw.as_str())
    }

    /// Every decoded value of the named field, in message order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.value.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Distinct field names, each in the casing first seen
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for field in &self.fields {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&field.name)) {
                names.push(&field.name);
            }
        }
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderField> {
        self.fields.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn field(&self, name: &str) -> Option<&HeaderField> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

/// `parse_headers` accepts lines without a colon as empty-valued fields;
/// those are rejected here.
fn validate_lines(block: &[u8]) -> Result<()> {
    let mut seen_field = false;
    for line in block.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        let invalid = || MalformedMessageError::InvalidHeader(header_text(line));

        if line.starts_with(b" ") || line.starts_with(b"\t") {
            if !seen_field {
                return Err(invalid());
            }
            continue;
        }

        let Some(colon) = line.iter().position(|&b| b == b':') else {
            return Err(invalid());
        };
        let name = line[..colon].trim_ascii_end();
        if name.is_empty() || !name.iter().all(u8::is_ascii_graphic) {
            return Err(invalid());
        }
        seen_field = true;
    }
    Ok(())
}

/// Split at the first blank line into (header block, body).
///
/// A message that starts with a blank line has an empty header block.
#[must_use]
pub fn split_header_body(raw: &[u8]) -> Option<(&[u8], &[u8])> {
    let blank_at = |at: usize| -> Option<usize> {
        let rest = &raw[at..];
        if rest.starts_with(b"\r\n") {
            Some(2)
        } else if rest.starts_with(b"\n") {
            Some(1)
        } else {
            None
        }
    };

    if let Some(len) = blank_at(0) {
        return Some((&raw[..0], &raw[len..]));
    }

    let mut from = 0;
    while let Some(offset) = raw[from..].iter().position(|&b| b == b'\n') {
        let next = from + offset + 1;
        if let Some(len) = blank_at(next) {
            return Some((&raw[..next], &raw[next + len..]));
        }
        from = next;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_crlf_and_lf() {
        let (h, b) = split_header_body(b"A: 1\r\nB: 2\r\n\r\nbody\r\n").unwrap();
        assert_eq!(h, b"A: 1\r\nB: 2\r\n");
        assert_eq!(b, b"body\r\n");

        let (h, b) = split_header_body(b"A: 1\n\nbody").unwrap();
        assert_eq!(h, b"A: 1\n");
        assert_eq!(b, b"body");
    }

    #[test]
    fn split_leading_blank_line() {
        let (h, b) = split_header_body(b"\r\nonly body").unwrap();
        assert!(h.is_empty());
        assert_eq!(b, b"only body");
    }

    #[test]
    fn split_requires_blank_line() {
        assert!(split_header_body(b"Invalid email content").is_none());
        assert!(split_header_body(b"Subject: hi\r\n").is_none());
    }

    #[test]
    fn whitespace_only_line_is_not_a_separator() {
        assert!(split_header_body(b"A: 1\r\n \r\nB: 2\r\n").is_none());
    }

    #[test]
    fn obsolete_space_before_colon() {
        let headers = HeaderSet::parse(b"From : John Doe <john@example.com>\r\n").unwrap();
        assert_eq!(headers.names(), vec!["From"]);
        assert_eq!(headers.get("from"), Some("John Doe <john@example.com>"));
    }

    #[test]
    fn line_without_colon_is_invalid() {
        assert_eq!(
            HeaderSet::parse(b"Subject: ok\r\nbogus line\r\n"),
            Err(MalformedMessageError::InvalidHeader("bogus line".into()))
        );
    }

    #[test]
    fn raw_keeps_folding() {
        let headers = HeaderSet::parse(b"Subject: one\r\n two\r\n").unwrap();
        assert_eq!(headers.get_raw("Subject"), Some("one\r\n two"));
        assert_eq!(headers.get("Subject"), Some("one two"));
    }
}
