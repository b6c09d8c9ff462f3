//! Content-Type and Content-Disposition values (RFC 2045, RFC 2183)

use std::collections::BTreeMap;
use std::fmt;

use mailparse::{DispositionType, parse_content_disposition, parse_content_type};
use serde::{Deserialize, Serialize};

/// A parsed `type/subtype; name=value` header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentType {
    mime_type: String,
    parameters: BTreeMap<String, String>,
}

impl ContentType {
    /// Parse a decoded Content-Type value; `None` when there is no valid
    /// type/subtype. RFC 2231 extended and continued parameters are joined.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let parsed = parse_content_type(value);
        let (primary, sub) = parsed.mimetype.split_once('/')?;
        if !is_token(primary.trim()) || !is_token(sub.trim()) {
            return None;
        }
        Some(Self {
            mime_type: format!("{}/{}", primary.trim(), sub.trim()),
            parameters: parsed.params,
        })
    }

    /// `text/plain; charset=us-ascii`, the RFC 2045 default
    #[must_use]
    pub fn text_plain() -> Self {
        Self {
            mime_type: "text/plain".into(),
            parameters: BTreeMap::from([("charset".into(), "us-ascii".into())]),
        }
    }

    /// Default type of the parts of a `multipart/digest`
    #[must_use]
    pub fn message_rfc822() -> Self {
        Self {
            mime_type: "message/rfc822".into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Lowercase `type/subtype`
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn primary_type(&self) -> &str {
        self.mime_type
            .split_once('/')
            .map_or(self.mime_type.as_str(), |(primary, _)| primary)
    }

    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.primary_type() == "multipart"
    }

    /// Case-insensitive parameter lookup
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameter("charset")
    }

    /// Boundary of a multipart type; an empty boundary counts as absent
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameter("boundary").filter(|b| !b.is_empty())
    }

    /// Parameters keyed by lowercase name
    #[must_use]
    pub const fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mime_type)?;
        for (name, value) in &self.parameters {
            write!(f, "; {name}=\"{value}\"")?;
        }
        Ok(())
    }
}

/// Disposition type of a MIME part
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    #[default]
    Inline,
    Attachment,
}

impl From<&DispositionType> for Disposition {
    /// Unrecognized disposition types are treated as `attachment` (RFC 2183)
    fn from(value: &DispositionType) -> Self {
        match value {
            DispositionType::Inline => Self::Inline,
            DispositionType::Extension(kind) if kind.is_empty() => Self::Inline,
            DispositionType::Attachment
            | DispositionType::FormData
            | DispositionType::Extension(_) => Self::Attachment,
        }
    }
}

/// A parsed Content-Disposition header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDisposition {
    pub disposition: Disposition,
    pub parameters: BTreeMap<String, String>,
}

impl ContentDisposition {
    /// Parse a decoded Content-Disposition value
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let parsed = parse_content_disposition(value);
        Self {
            disposition: Disposition::from(&parsed.disposition),
            parameters: parsed.params,
        }
    }

    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.parameters
            .get("filename")
            .map(String::as_str)
            .filter(|f| !f.is_empty())
    }
}

/// RFC 2045 token: printable ASCII without specials
#[must_use]
pub fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?=".contains(&b)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_and_token_parameters() {
        let ct = ContentType::parse("Multipart/Mixed; boundary=\"b1=_x\"; Charset=UTF-8").unwrap();
        assert_eq!(ct.mime_type(), "multipart/mixed");
        assert!(ct.is_multipart());
        assert_eq!(ct.boundary(), Some("b1=_x"));
        assert_eq!(ct.charset(), Some("UTF-8"));
    }

    #[test]
    fn rejects_missing_subtype() {
        assert!(ContentType::parse("text").is_none());
        assert!(ContentType::parse("text/").is_none());
        assert!(ContentType::parse("").is_none());
    }

    #[test]
    fn rfc2231_extended_value() {
        let cd = ContentDisposition::parse("attachment; filename*=UTF-8''na%C3%AFve%20plan.txt");
        assert_eq!(cd.disposition, Disposition::Attachment);
        assert_eq!(cd.filename(), Some("naïve plan.txt"));
    }

    #[test]
    fn rfc2231_continuations() {
        let cd = ContentDisposition::parse(
            "attachment; filename*0=\"very-long-\"; filename*1=\"name.pdf\"",
        );
        assert_eq!(cd.filename(), Some("very-long-name.pdf"));
    }

    #[test]
    fn extended_value_is_not_decoded_twice() {
        let cd = ContentDisposition::parse("attachment; filename*=UTF-8''%3D%3FUTF-8%3FB%3FeA%3D%3D%3F%3D");
        assert_eq!(cd.filename(), Some("=?UTF-8?B?eA==?="));
    }

    #[test]
    fn unknown_disposition_is_attachment() {
        assert_eq!(ContentDisposition::parse("x-custom").disposition, Disposition::Attachment);
        assert_eq!(ContentDisposition::parse("INLINE").disposition, Disposition::Inline);
        assert_eq!(ContentDisposition::parse("").disposition, Disposition::Inline);
    }
}
