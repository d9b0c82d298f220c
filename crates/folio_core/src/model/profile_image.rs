//! Profile image reference helpers.
//!
//! A profile image is stored as a plain string: either an external
//! reference (URL/path) or a self-contained `data:` URI. This module
//! classifies the value and builds embedded URIs from raw bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DATA_URI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:(?P<mime>[^;,]*)(?P<params>(?:;[^;,]*)*),")
        .expect("valid data uri regex")
});

/// Classified view over a stored profile image string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileImage<'a> {
    /// No image set.
    Empty,
    /// Reference to an image hosted elsewhere.
    External(&'a str),
    /// Embedded image data.
    Embedded {
        mime: &'a str,
        base64: bool,
        payload: &'a str,
    },
}

impl<'a> ProfileImage<'a> {
    pub fn parse(value: &'a str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match DATA_URI_RE.captures(trimmed) {
            Some(captures) => {
                let header_len = captures.get(0).map_or(0, |m| m.end());
                let mime = captures.name("mime").map_or("", |m| m.as_str());
                let base64 = captures
                    .name("params")
                    .map(|m| m.as_str().split(';').any(|param| param == "base64"))
                    .unwrap_or(false);
                Self::Embedded {
                    mime,
                    base64,
                    payload: &trimmed[header_len..],
                }
            }
            None => Self::External(trimmed),
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded { .. })
    }

    /// Approximate decoded size of an embedded payload in bytes.
    ///
    /// Returns `None` for external references and empty values.
    pub fn embedded_size(&self) -> Option<usize> {
        match self {
            Self::Embedded {
                base64: true,
                payload,
                ..
            } => {
                let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
                let raw = (payload.len() / 4) * 3 + partial_group_bytes(payload.len() % 4);
                Some(raw.saturating_sub(padding.min(2)))
            }
            Self::Embedded { payload, .. } => Some(payload.len()),
            _ => None,
        }
    }
}

fn partial_group_bytes(remainder: usize) -> usize {
    match remainder {
        2 => 1,
        3 => 2,
        _ => 0,
    }
}

/// Profile image encoding errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileImageError {
    EmptyImage,
    UnsupportedMime(String),
    TooLarge { size: usize, limit: usize },
}

impl Display for ProfileImageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyImage => write!(f, "profile image is empty"),
            Self::UnsupportedMime(mime) => write!(f, "unsupported profile image type: {mime}"),
            Self::TooLarge { size, limit } => {
                write!(f, "profile image is {size} bytes, limit is {limit} bytes")
            }
        }
    }
}

impl Error for ProfileImageError {}

/// Encodes raw image bytes as a base64 `data:` URI.
///
/// # Errors
/// - `EmptyImage` when `bytes` is empty.
/// - `UnsupportedMime` when `mime` is not an `image/*` type.
/// - `TooLarge` when `limit` is set and `bytes` exceeds it.
pub fn encode_data_uri(
    bytes: &[u8],
    mime: &str,
    limit: Option<usize>,
) -> Result<String, ProfileImageError> {
    if bytes.is_empty() {
        return Err(ProfileImageError::EmptyImage);
    }
    let mime = mime.trim().to_ascii_lowercase();
    let subtype = mime.strip_prefix("image/").unwrap_or_default();
    if subtype.is_empty() || subtype.contains([';', ',', ' ']) {
        return Err(ProfileImageError::UnsupportedMime(mime));
    }
    if let Some(limit) = limit {
        if bytes.len() > limit {
            return Err(ProfileImageError::TooLarge {
                size: bytes.len(),
                limit,
            });
        }
    }

    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::{encode_data_uri, ProfileImage, ProfileImageError};

    #[test]
    fn classifies_external_and_empty_values() {
        assert_eq!(ProfileImage::parse("   "), ProfileImage::Empty);
        assert_eq!(
            ProfileImage::parse("https://example.com/me.png"),
            ProfileImage::External("https://example.com/me.png")
        );
    }

    #[test]
    fn parses_embedded_base64_uri() {
        let parsed = ProfileImage::parse("data:image/png;base64,aGVsbG8=");
        assert_eq!(
            parsed,
            ProfileImage::Embedded {
                mime: "image/png",
                base64: true,
                payload: "aGVsbG8=",
            }
        );
        assert_eq!(parsed.embedded_size(), Some(5));
    }

    #[test]
    fn encodes_image_bytes_and_reports_size() {
        let uri = encode_data_uri(b"hello world", "IMAGE/JPEG", None).expect("encode");
        assert!(uri.starts_with("data:image/jpeg;base64,"));

        let parsed = ProfileImage::parse(&uri);
        assert!(parsed.is_embedded());
        assert_eq!(parsed.embedded_size(), Some(11));
    }

    #[test]
    fn rejects_non_image_and_oversize_input() {
        assert_eq!(
            encode_data_uri(b"x", "text/plain", None),
            Err(ProfileImageError::UnsupportedMime("text/plain".to_string()))
        );
        assert_eq!(
            encode_data_uri(&[], "image/png", None),
            Err(ProfileImageError::EmptyImage)
        );
        assert_eq!(
            encode_data_uri(&[0_u8; 16], "image/png", Some(8)),
            Err(ProfileImageError::TooLarge {
                size: 16,
                limit: 8
            })
        );
    }
}
