//! Extraction of AppliesTo expressions from LogicModule export files.
//!
//! JSON exports carry the expression as the `"appliesTo"` string value; XML
//! exports carry it as the text of an `<appliesTo>` element, either in a CDATA
//! section or entity-escaped. Extraction is regex-driven and tolerant of
//! otherwise malformed files so that half-edited documents still get editor
//! support.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::{ExpressionRegion, HostEncoding, OffsetMapper, RegionState};

/// The JSON key, colon, and opening quote of an AppliesTo value.
static JSON_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""appliesTo"\s*:\s*""#).unwrap());

/// The opening tag of an AppliesTo element.
static XML_TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<appliesTo\s*>").unwrap());

static XML_COMMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";
const XML_CLOSE_TAG: &str = "</appliesTo>";

/// An expression found in a host document.
#[derive(Debug, Clone)]
pub struct ExtractedRegion {
    /// Decoded expression text.
    pub source: String,

    /// Byte offset in the host where the expression content starts.
    pub host_offset: usize,

    /// `(local_offset, cumulative_extra_host_bytes)` for position mapping.
    pub escape_adjustments: Vec<(usize, usize)>,

    /// Encoding to apply to text inserted into this region.
    pub encoding: HostEncoding,
}

impl ExtractedRegion {
    pub fn into_region_state(self) -> RegionState {
        RegionState::new(
            ExpressionRegion {
                source: self.source,
            },
            OffsetMapper::new(self.host_offset, self.escape_adjustments),
            self.encoding,
        )
    }
}

/// Extract all AppliesTo values from a JSON LogicModule export.
pub fn extract_json_regions(source: &str) -> Vec<ExtractedRegion> {
    JSON_KEY_PATTERN
        .find_iter(source)
        .filter_map(|m| decode_json_string(source, m.end()))
        .collect()
}

/// Extract all AppliesTo elements from an XML LogicModule export.
pub fn extract_xml_regions(source: &str) -> Vec<ExtractedRegion> {
    let comments: Vec<Range<usize>> = XML_COMMENT_PATTERN
        .find_iter(source)
        .map(|m| m.range())
        .collect();

    XML_TAG_PATTERN
        .find_iter(source)
        .filter(|m| !comments.iter().any(|c| c.contains(&m.start())))
        .filter_map(|m| {
            let content_start = m.end();
            let rest = &source[content_start..];
            let leading_ws = rest.len() - rest.trim_start().len();
            if rest[leading_ws..].starts_with(CDATA_OPEN) {
                extract_cdata(source, content_start + leading_ws + CDATA_OPEN.len())
            } else {
                decode_xml_text(source, content_start)
            }
        })
        .collect()
}

/// Decode a JSON string body starting right after its opening quote.
///
/// Returns None for an unterminated string.
fn decode_json_string(source: &str, content_start: usize) -> Option<ExtractedRegion> {
    let bytes = source.as_bytes();
    let mut content = String::new();
    let mut adjustments = Vec::new();
    let mut extra = 0;
    let mut pos = content_start;

    while pos < bytes.len() {
        match bytes[pos] {
            b'"' => {
                return Some(ExtractedRegion {
                    source: content,
                    host_offset: content_start,
                    escape_adjustments: adjustments,
                    encoding: HostEncoding::JsonString,
                });
            }
            b'\\' if pos + 1 < bytes.len() => {
                let (decoded, consumed) = decode_json_escape(&source[pos..]);
                content.push(decoded);
                extra += consumed - decoded.len_utf8();
                adjustments.push((content.len(), extra));
                pos += consumed;
            }
            b'\n' => return None,
            _ => {
                let c = source[pos..].chars().next()?;
                content.push(c);
                pos += c.len_utf8();
            }
        }
    }

    None
}

/// Decode one JSON escape at the start of `s`, returning the character and the
/// number of host bytes consumed.
fn decode_json_escape(s: &str) -> (char, usize) {
    let bytes = s.as_bytes();
    match bytes[1] {
        b'n' => ('\n', 2),
        b't' => ('\t', 2),
        b'r' => ('\r', 2),
        b'b' => ('\u{8}', 2),
        b'f' => ('\u{c}', 2),
        b'u' => decode_unicode_escape(s),
        // \" \\ \/ and anything unknown decode to the escaped character
        _ => match s[1..].chars().next() {
            Some(c) => (c, 1 + c.len_utf8()),
            None => ('\\', 1),
        },
    }
}

/// Decode `\uXXXX`, combining a following low surrogate when present.
fn decode_unicode_escape(s: &str) -> (char, usize) {
    let Some(high) = s.get(2..6).and_then(|h| u32::from_str_radix(h, 16).ok()) else {
        return ('u', 2);
    };

    if (0xD800..0xDC00).contains(&high) {
        let low = s
            .get(6..8)
            .filter(|p| *p == "\\u")
            .and_then(|_| s.get(8..12))
            .and_then(|h| u32::from_str_radix(h, 16).ok())
            .filter(|low| (0xDC00..0xE000).contains(low));
        if let Some(low) = low {
            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return (char::from_u32(code).unwrap_or('\u{FFFD}'), 12);
        }
    }

    (char::from_u32(high).unwrap_or('\u{FFFD}'), 6)
}

/// CDATA content is verbatim up to `]]>`.
fn extract_cdata(source: &str, content_start: usize) -> Option<ExtractedRegion> {
    let len = source[content_start..].find(CDATA_CLOSE)?;
    Some(ExtractedRegion {
        source: source[content_start..content_start + len].to_string(),
        host_offset: content_start,
        escape_adjustments: Vec::new(),
        encoding: HostEncoding::Raw,
    })
}

/// Decode XML character data up to the closing tag.
fn decode_xml_text(source: &str, content_start: usize) -> Option<ExtractedRegion> {
    let len = source[content_start..].find(XML_CLOSE_TAG)?;
    let body = &source[content_start..content_start + len];

    let mut content = String::with_capacity(body.len());
    let mut adjustments = Vec::new();
    let mut extra = 0;
    let mut rest = body;

    while let Some(c) = rest.chars().next() {
        if c == '&' {
            if let Some((decoded, consumed)) = decode_xml_entity(rest) {
                content.push(decoded);
                extra += consumed - decoded.len_utf8();
                adjustments.push((content.len(), extra));
                rest = &rest[consumed..];
                continue;
            }
        }
        content.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Some(ExtractedRegion {
        source: content,
        host_offset: content_start,
        escape_adjustments: adjustments,
        encoding: HostEncoding::XmlText,
    })
}

/// Longest entity reference, `&#x10FFFF;` or `&#1114111;`.
const MAX_ENTITY_LEN: usize = 10;

/// Decode an entity reference at the start of `s`.
fn decode_xml_entity(s: &str) -> Option<(char, usize)> {
    let end = s
        .bytes()
        .take(MAX_ENTITY_LEN)
        .position(|b| b == b';')?;
    let name = &s[1..end];
    let decoded = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some((decoded, end + 1))
}
