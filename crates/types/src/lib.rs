//! Wire types exchanged with the `xslmapper` HTTP boundary.

use serde::{Deserialize, Serialize};

/// Location of the XSL template inside the mappers container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapperReference {
    #[serde(default)]
    pub directory: String,
    pub name: String,
}

/// Dynamically loaded helper exposed to the template under `namespace`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionObjectDescriptor {
    #[serde(default)]
    pub directory: String,
    pub name: String,
    pub namespace: String,
    pub class_name: String,
}

/// Body of `POST /api/xml-to-xml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XmlToXmlMapperRequest {
    pub mapper: MapperReference,
    pub input_xml: String,
    #[serde(default)]
    pub extension_objects: Vec<ExtensionObjectDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encode_base64_output: Option<bool>,
}

/// Success envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XmlToXmlMapperResponse {
    pub content: String,
}

/// Failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(status_code: u16, message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            detail,
        }
    }
}
