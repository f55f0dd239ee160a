//! PDF417 stamp generation for the `TED` node.
//!
//! The node's outer markup is the barcode payload, encoded as-is in byte compaction. The rendered
//! symbol becomes a PNG, then a `data:` URI injected as the `TedTimbre` transform parameter.

use crate::core::document::RequiredNode;
use crate::core::error::ClassifiedError;
use crate::core::registry::ParameterEntry;
use crate::core::types::ErrorKind;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rxing::{BarcodeFormat, EncodeHintType, EncodeHintValue, EncodingHintDictionary, Writer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the injected stylesheet parameter.
pub const BARCODE_PARAMETER: &str = "TedTimbre";

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// PDF417 compaction modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Compaction {
    Auto,
    Text,
    #[default]
    Byte,
    Numeric,
}

impl Compaction {
    fn hint(self) -> &'static str {
        match self {
            Compaction::Auto => "AUTO",
            Compaction::Text => "TEXT",
            Compaction::Byte => "BYTE",
            Compaction::Numeric => "NUMERIC",
        }
    }
}

/// Symbol geometry and encoding options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeSettings {
    /// PDF417 error-correction level, 0..=8.
    #[serde(default = "default_error_correction")]
    pub error_correction: u8,

    /// Target width in symbol density units.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Target height in symbol density units.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Quiet zone around the symbol.
    #[serde(default = "default_margin")]
    pub margin: u32,

    #[serde(default)]
    pub compaction: Compaction,
}

fn default_error_correction() -> u8 {
    5
}

fn default_width() -> u32 {
    9
}

fn default_height() -> u32 {
    3
}

fn default_margin() -> u32 {
    6
}

impl Default for BarcodeSettings {
    fn default() -> Self {
        BarcodeSettings {
            error_correction: default_error_correction(),
            width: default_width(),
            height: default_height(),
            margin: default_margin(),
            compaction: Compaction::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BarcodeError {
    #[error("symbol encoding failed: {0}")]
    Encode(String),
    #[error("png encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("symbol matrix is empty")]
    EmptySymbol,
}

/// Module grid of a rendered symbol, row-major, `true` = dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMatrix {
    width: u32,
    height: u32,
    modules: Vec<bool>,
}

impl SymbolMatrix {
    pub fn new(width: u32, height: u32, modules: Vec<bool>) -> Result<Self, BarcodeError> {
        if width == 0 || height == 0 || modules.len() != (width as usize) * (height as usize) {
            return Err(BarcodeError::EmptySymbol);
        }
        Ok(SymbolMatrix {
            width,
            height,
            modules,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_dark(&self, x: u32, y: u32) -> bool {
        self.modules[(y as usize) * (self.width as usize) + x as usize]
    }
}

/// Black-box 2-D symbol encoder.
pub trait SymbolEncoder: Send + Sync {
    fn encode(&self, payload: &str, settings: &BarcodeSettings)
        -> Result<SymbolMatrix, BarcodeError>;
}

/// PDF417 encoder backed by `rxing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pdf417Encoder;

impl SymbolEncoder for Pdf417Encoder {
    fn encode(
        &self,
        payload: &str,
        settings: &BarcodeSettings,
    ) -> Result<SymbolMatrix, BarcodeError> {
        // Without an ECI the symbol carries ISO-8859-1.
        if let Some(c) = payload.chars().find(|c| u32::from(*c) > 0xFF) {
            return Err(BarcodeError::Encode(format!(
                "character {:?} cannot be encoded as ISO-8859-1",
                c
            )));
        }
        let mut hints: EncodingHintDictionary = HashMap::new();
        hints.insert(
            EncodeHintType::ERROR_CORRECTION,
            EncodeHintValue::ErrorCorrection(settings.error_correction.to_string()),
        );
        hints.insert(
            EncodeHintType::MARGIN,
            EncodeHintValue::Margin(settings.margin.to_string()),
        );
        hints.insert(
            EncodeHintType::PDF417_COMPACTION,
            EncodeHintValue::Pdf417Compaction(settings.compaction.hint().to_string()),
        );

        let matrix = rxing::pdf417::PDF417Writer::default()
            .encode_with_hints(
                payload,
                &BarcodeFormat::PDF_417,
                settings.width as i32,
                settings.height as i32,
                &hints,
            )
            .map_err(|err| BarcodeError::Encode(err.to_string()))?;

        let width = matrix.getWidth();
        let height = matrix.getHeight();
        let mut modules = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                modules.push(matrix.get(x, y));
            }
        }
        SymbolMatrix::new(width, height, modules)
    }
}

/// Render the matrix as an 8-bit grayscale PNG, one pixel per module.
pub fn render_png(matrix: &SymbolMatrix) -> Result<Vec<u8>, BarcodeError> {
    let mut pixels = Vec::with_capacity((matrix.width() as usize) * (matrix.height() as usize));
    for y in 0..matrix.height() {
        for x in 0..matrix.width() {
            pixels.push(if matrix.is_dark(x, y) { 0x00 } else { 0xFF });
        }
    }

    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, matrix.width(), matrix.height());
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&pixels)?;
        writer.finish()?;
    }
    Ok(buffer)
}

pub fn png_data_uri(png: &[u8]) -> String {
    format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(png))
}

/// Turns the required node into the `TedTimbre` parameter. Pure and deterministic.
#[derive(Clone)]
pub struct BarcodeGenerator {
    settings: BarcodeSettings,
    encoder: Arc<dyn SymbolEncoder>,
}

impl BarcodeGenerator {
    pub fn new(settings: BarcodeSettings) -> Self {
        Self::with_encoder(settings, Arc::new(Pdf417Encoder))
    }

    pub fn with_encoder(settings: BarcodeSettings, encoder: Arc<dyn SymbolEncoder>) -> Self {
        BarcodeGenerator { settings, encoder }
    }

    pub fn settings(&self) -> &BarcodeSettings {
        &self.settings
    }

    pub fn generate(&self, node: &RequiredNode) -> Result<ParameterEntry, ClassifiedError> {
        let matrix = self
            .encoder
            .encode(node.markup(), &self.settings)
            .map_err(barcode_failure)?;
        let png = render_png(&matrix).map_err(barcode_failure)?;
        Ok(ParameterEntry {
            name: BARCODE_PARAMETER.to_string(),
            namespace: String::new(),
            value: png_data_uri(&png),
        })
    }
}

impl Default for BarcodeGenerator {
    fn default() -> Self {
        Self::new(BarcodeSettings::default())
    }
}

fn barcode_failure(err: BarcodeError) -> ClassifiedError {
    ClassifiedError::with_source(
        ErrorKind::BarcodeGenerationFailed,
        "failed to generate the TED barcode",
        Box::new(err),
    )
}
