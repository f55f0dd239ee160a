//! Input document access: decoding, BOM removal, parsing and extraction of the `TED` node.

use crate::core::error::ClassifiedError;
use crate::core::types::SourceInput;
use encoding_rs::Encoding;
use roxmltree::{Document, ParsingOptions};

/// Local name of the element that seeds the barcode.
pub const REQUIRED_NODE_TAG: &str = "TED";

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Decoded input document text, BOM removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    text: String,
}

impl SourceDocument {
    pub fn from_input(input: SourceInput) -> Result<Self, ClassifiedError> {
        match input {
            SourceInput::Text(text) => Self::from_text(text),
            SourceInput::Bytes(bytes) => Self::from_bytes(&bytes),
        }
    }

    pub fn from_text(text: impl Into<String>) -> Result<Self, ClassifiedError> {
        let mut text = text.into();
        if text.starts_with(BYTE_ORDER_MARK) {
            text.replace_range(..BYTE_ORDER_MARK.len_utf8(), "");
        }
        if text.trim().is_empty() {
            return Err(ClassifiedError::malformed_document("input document is empty"));
        }
        Ok(SourceDocument { text })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ClassifiedError> {
        let text = decode_xml_bytes(bytes)
            .map_err(|reason| ClassifiedError::malformed_document(format!("input document {}", reason)))?;
        Self::from_text(text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parse(&self) -> Result<Document<'_>, ClassifiedError> {
        parse_xml(&self.text).map_err(|err| {
            ClassifiedError::with_source(
                crate::core::types::ErrorKind::MalformedDocument,
                "input document is not well-formed XML",
                Box::new(err),
            )
        })
    }
}

/// Decode XML bytes: BOM first, then UTF-8, then the encoding named by the XML declaration.
/// The returned text never starts with a BOM.
pub(crate) fn decode_xml_bytes(bytes: &[u8]) -> Result<String, String> {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        if had_errors {
            return Err(format!("is not valid {}", encoding.name()));
        }
        return Ok(text.into_owned());
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    let encoding = declared_encoding(bytes)
        .ok_or_else(|| "is not UTF-8 and declares no supported encoding".to_string())?;
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(format!("is not valid {}", encoding.name()));
    }
    Ok(text.into_owned())
}

/// Parse options shared by input documents and templates.
pub(crate) fn parse_xml(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    Document::parse_with_options(
        text,
        ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        },
    )
}

/// Serialized `TED` element, exactly as it appears in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredNode {
    markup: String,
}

impl RequiredNode {
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn into_markup(self) -> String {
        self.markup
    }
}

/// Locate the single `TED` element and return its outer markup.
pub fn extract_required_node(document: &SourceDocument) -> Result<RequiredNode, ClassifiedError> {
    let parsed = document.parse()?;
    let matches: Vec<_> = parsed
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == REQUIRED_NODE_TAG)
        .collect();

    if matches.len() != 1 {
        return Err(ClassifiedError::required_node_missing(
            REQUIRED_NODE_TAG,
            matches.len(),
        ));
    }

    let markup = document.text()[matches[0].range()].to_string();
    Ok(RequiredNode { markup })
}

fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    let declaration = head.strip_prefix("<?xml")?;
    let declaration = &declaration[..declaration.find("?>")?];
    let start = declaration.find("encoding")?;
    let rest = declaration[start + "encoding".len()..]
        .trim_start()
        .strip_prefix('=')?
        .trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let label = &value[..value.find(quote)?];
    Encoding::for_label(label.trim().as_bytes())
}
