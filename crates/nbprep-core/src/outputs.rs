//! Rich cell outputs and image payload extraction.
//!
//! Models the nbformat output union and recovers binary image artifacts
//! (for embedding extracted solution figures in the student notebook).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::notebook::SourceText;

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Cell output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "output_type")]
pub enum CellOutput {
    /// Standard output/error
    #[serde(rename = "stream")]
    Stream { name: String, text: SourceText },

    /// Result of evaluating the cell
    #[serde(rename = "execute_result")]
    ExecuteResult {
        // nbformat requires the key on execute_result, null included
        execution_count: Option<u32>,
        data: OutputData,
        #[serde(default = "empty_object")]
        metadata: Value,
    },

    /// Explicit display call
    #[serde(rename = "display_data")]
    DisplayData {
        data: OutputData,
        #[serde(default = "empty_object")]
        metadata: Value,
    },

    /// Error output
    #[serde(rename = "error")]
    Error {
        ename: String,
        evalue: String,
        traceback: Vec<String>,
    },
}

/// Output data with multiple MIME representations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputData {
    /// Plain text
    #[serde(rename = "text/plain", skip_serializing_if = "Option::is_none")]
    pub text_plain: Option<SourceText>,

    /// HTML
    #[serde(rename = "text/html", skip_serializing_if = "Option::is_none")]
    pub text_html: Option<SourceText>,

    /// PNG image (base64)
    #[serde(rename = "image/png", skip_serializing_if = "Option::is_none")]
    pub image_png: Option<SourceText>,

    /// JPEG image (base64)
    #[serde(rename = "image/jpeg", skip_serializing_if = "Option::is_none")]
    pub image_jpeg: Option<SourceText>,

    /// SVG image
    #[serde(rename = "image/svg+xml", skip_serializing_if = "Option::is_none")]
    pub image_svg: Option<SourceText>,

    /// JSON data
    #[serde(rename = "application/json", skip_serializing_if = "Option::is_none")]
    pub application_json: Option<Value>,

    /// Other MIME representations, preserved on write
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A binary image recovered from a cell output.
#[derive(Debug, Clone)]
pub struct ImageArtifact {
    /// File extension, dot included
    pub extension: &'static str,

    /// Raw image bytes
    pub bytes: Vec<u8>,
}

impl CellOutput {
    /// Recover the image payload of this output, if it has one.
    ///
    /// At most one image is extracted per output, preferring PNG over JPEG
    /// over SVG when several representations are present.
    pub fn image_artifact(&self) -> Result<Option<ImageArtifact>> {
        let data = match self {
            Self::ExecuteResult { data, .. } | Self::DisplayData { data, .. } => data,
            Self::Stream { .. } | Self::Error { .. } => return Ok(None),
        };

        if let Some(png) = &data.image_png {
            return Ok(Some(ImageArtifact {
                extension: ".png",
                bytes: decode_base64(&png.text())?,
            }));
        }
        if let Some(jpeg) = &data.image_jpeg {
            return Ok(Some(ImageArtifact {
                extension: ".jpeg",
                bytes: decode_base64(&jpeg.text())?,
            }));
        }
        if let Some(svg) = &data.image_svg {
            return Ok(Some(ImageArtifact {
                extension: ".svg",
                bytes: svg.text().into_bytes(),
            }));
        }

        Ok(None)
    }
}

/// Decode base64 image data as stored in .ipynb files.
///
/// Jupyter wraps the payload across lines, so whitespace is removed before
/// decoding.
fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    use base64::Engine;

    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
    Ok(bytes)
}
