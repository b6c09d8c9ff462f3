//! Content-Transfer-Encoding and charset decoding

use std::fmt;

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use encoding_rs::{Encoding, UTF_8};
use quoted_printable::ParseMode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Mail software routinely drops padding or leaves stray bits in the last quantum
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Declared Content-Transfer-Encoding of a MIME part
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferEncoding {
    #[default]
    SevenBit,
    EightBit,
    Binary,
    Base64,
    QuotedPrintable,
    /// Unrecognized encoding, content is passed through unchanged
    Other(String),
}

impl TransferEncoding {
    /// Parse a header value; absent means 7bit
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::SevenBit;
        };
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "" | "7bit" => Self::SevenBit,
            "8bit" => Self::EightBit,
            "binary" => Self::Binary,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            _ => Self::Other(value),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SevenBit => "7bit",
            Self::EightBit => "8bit",
            Self::Binary => "binary",
            Self::Base64 => "base64",
            Self::QuotedPrintable => "quoted-printable",
            Self::Other(name) => name,
        }
    }

    /// Decode `body` to raw bytes. Never fails: content that does not
    /// decode is passed through as-is.
    #[must_use]
    pub fn decode(&self, body: &[u8]) -> Vec<u8> {
        match self {
            Self::SevenBit | Self::EightBit | Self::Binary => body.to_vec(),
            Self::Base64 => decode_base64(body).unwrap_or_else(|| {
                warn!("Invalid base64 body, passing {} bytes through", body.len());
                body.to_vec()
            }),
            Self::QuotedPrintable => {
                quoted_printable::decode(body, ParseMode::Robust).unwrap_or_else(|e| {
                    warn!("Invalid quoted-printable body ({e}), passing through");
                    body.to_vec()
                })
            }
            Self::Other(name) => {
                debug!("Unknown transfer encoding {name}, passing through");
                body.to_vec()
            }
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode base64 text, ignoring line breaks and other whitespace
#[must_use]
pub fn decode_base64(input: &[u8]) -> Option<Vec<u8>> {
    let compact: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    LENIENT_BASE64.decode(compact).ok()
}

/// Standard padded base64, single line
#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Convert bytes in the given charset to a string. Unknown or absent
/// charsets are read as UTF-8, which covers US-ASCII.
#[must_use]
pub fn decode_text(bytes: &[u8], charset: Option<&str>) -> String {
    let encoding = charset
        .map(|label| label.trim().trim_matches('"'))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!("Malformed {} sequences replaced", encoding.name());
    }
    text.into_owned()
}

/// Header bytes are UTF-8 when SMTPUTF8 was used, otherwise anything
/// 8-bit is most likely Latin-1 from a broken mailer.
#[must_use]
pub fn header_text(bytes: &[u8]) -> String {
    std::str::from_utf8(bytes).map_or_else(
        |_| {
            encoding_rs::WINDOWS_1252
                .decode_without_bom_handling(bytes)
                .0
                .into_owned()
        },
        str::to_string,
    )
}
