//! Encoding and delimiter auto-detection for CSV input.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1251, WINDOWS_1252};
use serde::{Deserialize, Serialize};

/// Delimiters considered during auto-detection, in tie-break priority order.
pub const CANDIDATE_DELIMITERS: &[u8] = &[b',', b';', b'\t'];

/// Text encoding of a CSV source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// Detect automatically (default): UTF-8 first, then windows-1251, then windows-1252.
    Auto,
    /// UTF-8 (with or without BOM).
    Utf8,
    /// Cyrillic single-byte encoding.
    Windows1251,
    /// Western European single-byte encoding.
    Windows1252,
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::Auto
    }
}

impl TextEncoding {
    fn as_encoding(self) -> Option<&'static Encoding> {
        match self {
            TextEncoding::Auto => None,
            TextEncoding::Utf8 => Some(UTF_8),
            TextEncoding::Windows1251 => Some(WINDOWS_1251),
            TextEncoding::Windows1252 => Some(WINDOWS_1252),
        }
    }
}

/// Decode raw CSV bytes into text.
///
/// With [`TextEncoding::Auto`] the bytes are tried as strict UTF-8 (BOM honored), then
/// windows-1251, then windows-1252; if everything reports errors, UTF-8 with replacement
/// characters is used as a last resort. Returns the decoded text and the encoding name used.
pub fn decode_bytes(bytes: &[u8], encoding: TextEncoding) -> (String, &'static str) {
    if let Some(enc) = encoding.as_encoding() {
        let (text, _, _) = enc.decode(bytes);
        return (text.into_owned(), enc.name());
    }

    // BOM-aware strict UTF-8 first.
    let (text, used, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return (text.into_owned(), used.name());
    }

    for enc in [WINDOWS_1251, WINDOWS_1252] {
        let (text, had_errors) = enc.decode_without_bom_handling(bytes);
        if !had_errors {
            return (text.into_owned(), enc.name());
        }
    }

    let (text, _, _) = UTF_8.decode(bytes);
    (text.into_owned(), "utf-8 (lossy)")
}

/// Infer the field delimiter from the header line.
///
/// Counts occurrences of `,` `;` and tab in the first non-empty line; the most frequent wins,
/// ties resolved in that order. Falls back to `,` when no candidate appears.
pub fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

    let mut best = b',';
    let mut best_count = 0usize;
    for &cand in CANDIDATE_DELIMITERS {
        let count = header.bytes().filter(|&b| b == cand).count();
        if count > best_count {
            best = cand;
            best_count = count;
        }
    }
    best
}
