//! `xsl:output` settings and the character encodings results are serialized in.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMethod {
    Xml,
    Html,
    Text,
}

impl OutputMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "xml" => Some(OutputMethod::Xml),
            "html" => Some(OutputMethod::Html),
            "text" => Some(OutputMethod::Text),
            _ => None,
        }
    }

    pub fn default_media_type(self) -> &'static str {
        match self {
            OutputMethod::Xml => "text/xml",
            OutputMethod::Html => "text/html",
            OutputMethod::Text => "text/plain",
        }
    }
}

/// Merged top-level `xsl:output` declarations of a stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSettings {
    pub method: Option<OutputMethod>,
    pub encoding: Option<String>,
    pub indent: Option<bool>,
    pub omit_xml_declaration: bool,
    pub media_type: Option<String>,
}

impl OutputSettings {
    pub fn output_encoding(&self) -> OutputEncoding {
        self.encoding
            .as_deref()
            .and_then(OutputEncoding::from_label)
            .unwrap_or(OutputEncoding::Utf8)
    }

    /// `method` is the one the engine actually used for the result.
    pub fn media_type(&self, method: OutputMethod) -> String {
        self.media_type
            .clone()
            .unwrap_or_else(|| method.default_media_type().to_string())
    }
}

/// Character encoding of the serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Legacy(&'static Encoding),
}

impl OutputEncoding {
    /// `utf-16` without an explicit byte order means little-endian, as the engine writes it.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("utf-16") || label.eq_ignore_ascii_case("unicode") {
            return Some(OutputEncoding::Utf16Le);
        }
        let encoding = Encoding::for_label(label.as_bytes())?;
        Some(if encoding == UTF_8 {
            OutputEncoding::Utf8
        } else if encoding == UTF_16LE {
            OutputEncoding::Utf16Le
        } else if encoding == UTF_16BE {
            OutputEncoding::Utf16Be
        } else if encoding.output_encoding() != encoding {
            // Decode-only labels such as `replacement`.
            return None;
        } else {
            OutputEncoding::Legacy(encoding)
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputEncoding::Utf8 => "utf-8",
            OutputEncoding::Utf16Le => "utf-16",
            OutputEncoding::Utf16Be => "utf-16be",
            OutputEncoding::Legacy(encoding) => encoding.name(),
        }
    }

    /// Byte-order mark the engine may write ahead of the content.
    pub fn preamble(&self) -> &'static [u8] {
        match self {
            OutputEncoding::Utf8 => &[0xEF, 0xBB, 0xBF],
            OutputEncoding::Utf16Le => &[0xFF, 0xFE],
            OutputEncoding::Utf16Be => &[0xFE, 0xFF],
            OutputEncoding::Legacy(_) => &[],
        }
    }

    /// Decode bytes that carry no preamble.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let encoding = match self {
            OutputEncoding::Utf8 => UTF_8,
            OutputEncoding::Utf16Le => UTF_16LE,
            OutputEncoding::Utf16Be => UTF_16BE,
            OutputEncoding::Legacy(encoding) => encoding,
        };
        encoding
            .decode_without_bom_handling(bytes)
            .0
            .into_owned()
    }
}
