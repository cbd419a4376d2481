//! Expression regions embedded in host documents.
//!
//! LogicModule exports store the AppliesTo expression inside a JSON string or an
//! XML element. The editing engine runs on the decoded expression; this module
//! maps its offsets back to the host document and re-encodes inserted text.

use std::ops::Range;

/// How expression text is encoded in the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEncoding {
    /// Stored verbatim (plain expression files, XML CDATA sections).
    Raw,
    /// Inside a JSON string literal.
    JsonString,
    /// XML character data with entity references.
    XmlText,
}

impl HostEncoding {
    /// Encode expression text for insertion into the host document.
    pub fn encode(&self, text: &str) -> String {
        match self {
            HostEncoding::Raw => text.to_string(),
            HostEncoding::JsonString => {
                let mut out = String::with_capacity(text.len());
                for c in text.chars() {
                    match c {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\t' => out.push_str("\\t"),
                        '\r' => out.push_str("\\r"),
                        c => out.push(c),
                    }
                }
                out
            }
            HostEncoding::XmlText => {
                let mut out = String::with_capacity(text.len());
                for c in text.chars() {
                    match c {
                        '&' => out.push_str("&amp;"),
                        '<' => out.push_str("&lt;"),
                        '>' => out.push_str("&gt;"),
                        c => out.push(c),
                    }
                }
                out
            }
        }
    }
}

/// A single decoded expression within a host document.
#[derive(Debug, Clone)]
pub struct ExpressionRegion {
    /// The decoded expression source.
    pub source: String,
}

/// Maps between expression-local offsets and host document offsets.
///
/// Escape sequences in the host are longer than the characters they decode to;
/// the mapper records the cumulative difference at each point it grows.
#[derive(Debug, Clone)]
pub struct OffsetMapper {
    /// Byte offset where the expression content starts in the host.
    host_offset: usize,

    /// `(local_offset, cumulative_extra_host_bytes)`, ascending. From each
    /// local offset onward, the host has consumed that many extra bytes.
    escape_adjustments: Vec<(usize, usize)>,
}

impl OffsetMapper {
    pub fn new(host_offset: usize, escape_adjustments: Vec<(usize, usize)>) -> Self {
        Self {
            host_offset,
            escape_adjustments,
        }
    }

    /// Mapper for a document that is the expression itself.
    pub fn identity() -> Self {
        Self::new(0, Vec::new())
    }

    /// Convert a local byte offset to a host byte offset.
    pub fn to_host(&self, local: usize) -> usize {
        self.host_offset + local + self.adjustment_at(local)
    }

    /// Convert a local span to a host span.
    pub fn span_to_host(&self, span: &Range<usize>) -> Range<usize> {
        self.to_host(span.start)..self.to_host(span.end)
    }

    /// Convert a host offset to the nearest local offset at or before it.
    ///
    /// Offsets that fall inside an escape sequence resolve to the character the
    /// sequence decodes to. Returns None before the region starts.
    pub fn to_local(&self, host: usize, local_len: usize) -> Option<usize> {
        let relative = host.checked_sub(self.host_offset)?;
        let mut local = relative.min(local_len);
        while local > 0 && local + self.adjustment_at(local) > relative {
            local -= 1;
        }
        Some(local)
    }

    fn adjustment_at(&self, local: usize) -> usize {
        self.escape_adjustments
            .iter()
            .take_while(|(threshold, _)| local >= *threshold)
            .last()
            .map(|(_, adj)| *adj)
            .unwrap_or(0)
    }

    pub fn host_offset(&self) -> usize {
        self.host_offset
    }

    /// Length in host bytes of an expression `local_len` bytes long.
    pub fn host_length(&self, local_len: usize) -> usize {
        local_len + self.adjustment_at(local_len)
    }
}

/// An embedded expression with its mapping into the host.
#[derive(Debug, Clone)]
pub struct RegionState {
    pub region: ExpressionRegion,
    pub mapper: OffsetMapper,
    pub encoding: HostEncoding,
}

impl RegionState {
    pub fn new(region: ExpressionRegion, mapper: OffsetMapper, encoding: HostEncoding) -> Self {
        Self {
            region,
            mapper,
            encoding,
        }
    }

    /// Whether the host offset lies within this region. The end bound is
    /// inclusive so a cursor right before the closing delimiter counts.
    pub fn contains_host_offset(&self, host_offset: usize) -> bool {
        let start = self.mapper.host_offset();
        let end = start + self.mapper.host_length(self.region.source.len());
        (start..=end).contains(&host_offset)
    }

    /// Convert a host offset to a local offset, if within this region.
    pub fn host_to_local(&self, host_offset: usize) -> Option<usize> {
        if !self.contains_host_offset(host_offset) {
            return None;
        }
        let local = self
            .mapper
            .to_local(host_offset, self.region.source.len())?;
        Some(floor_char_boundary(&self.region.source, local))
    }
}

fn floor_char_boundary(s: &str, mut offset: usize) -> usize {
    while offset > 0 && !s.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(source: &str, mapper: OffsetMapper, encoding: HostEncoding) -> RegionState {
        RegionState::new(
            ExpressionRegion {
                source: source.to_string(),
            },
            mapper,
            encoding,
        )
    }

    #[test]
    fn identity_mapping() {
        let mapper = OffsetMapper::identity();
        assert_eq!(mapper.to_host(7), 7);
        assert_eq!(mapper.to_local(7, 10), Some(7));
    }

    #[test]
    fn mapping_with_escapes() {
        // host:  hasCategory(\"x\")   at offset 100
        // local: hasCategory("x")
        let mapper = OffsetMapper::new(100, vec![(13, 1), (15, 2)]);
        assert_eq!(mapper.to_host(0), 100);
        assert_eq!(mapper.to_host(12), 112); // the backslash of the first escape
        assert_eq!(mapper.to_host(13), 114); // 'x'
        assert_eq!(mapper.to_host(16), 118); // after ')'
        assert_eq!(mapper.span_to_host(&(13..14)), 114..115);

        assert_eq!(mapper.to_local(114, 16), Some(13));
        assert_eq!(mapper.to_local(113, 16), Some(12)); // between '\' and '"'
        assert_eq!(mapper.to_local(118, 16), Some(16));
        assert_eq!(mapper.to_local(99, 16), None);
    }

    #[test]
    fn contains_host_offset() {
        let state = region("isLinux()", OffsetMapper::new(10, vec![]), HostEncoding::Raw);
        assert!(state.contains_host_offset(10));
        assert!(state.contains_host_offset(19)); // cursor at end
        assert!(!state.contains_host_offset(20));
        assert!(!state.contains_host_offset(9));
        assert_eq!(state.host_to_local(15), Some(5));
    }

    #[test]
    fn json_encoding() {
        assert_eq!(
            HostEncoding::JsonString.encode(r#"hasCategory("a\b")"#),
            r#"hasCategory(\"a\\b\")"#
        );
    }

    #[test]
    fn xml_encoding() {
        assert_eq!(
            HostEncoding::XmlText.encode("a && b < 3"),
            "a &amp;&amp; b &lt; 3"
        );
        assert_eq!(HostEncoding::Raw.encode("a && b"), "a && b");
    }
}
