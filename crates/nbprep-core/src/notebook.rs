//! Jupyter notebook (.ipynb) document model.
//!
//! Parses nbformat-4 notebooks into an ordered cell list and writes them
//! back out. Unlike a generator that only emits its own documents, this
//! model round-trips third-party notebooks, so unknown keys on the notebook
//! and cell records are preserved through flattened maps.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::outputs::CellOutput;

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// A Jupyter notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    /// Notebook metadata (kernelspec, language_info, ...), kept opaque.
    #[serde(default = "empty_object")]
    pub metadata: Value,

    /// Format version (4 for everything this tool handles)
    pub nbformat: u32,

    /// Minor format version
    pub nbformat_minor: u32,

    /// Notebook cells, in document order
    pub cells: Vec<Cell>,

    /// Unrecognized top-level keys, preserved on write
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A notebook cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Cell type ("code" or "markdown")
    pub cell_type: String,

    /// Cell metadata, kept opaque
    #[serde(default = "empty_object")]
    pub metadata: Value,

    /// Cell source
    pub source: SourceText,

    /// Cell outputs (code cells only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<CellOutput>>,

    /// Execution count (code cells only; null until executed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_count: Option<u32>,

    /// Unrecognized cell keys (nbformat 4.5 `id`, attachments, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Cell {
    /// Whether this is a code cell.
    pub fn is_code(&self) -> bool {
        self.cell_type == "code"
    }

    /// Whether this cell has at least one output.
    pub fn has_outputs(&self) -> bool {
        self.outputs.as_ref().is_some_and(|o| !o.is_empty())
    }
}

/// Cell source, which nbformat spells either as a single string or a list
/// of lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SourceText {
    /// List-of-lines spelling
    Lines(Vec<String>),

    /// Single-string spelling
    Text(String),
}

impl SourceText {
    /// The full source as one string.
    pub fn text(&self) -> String {
        match self {
            Self::Lines(lines) => lines.concat(),
            Self::Text(text) => text.clone(),
        }
    }

}

impl From<String> for SourceText {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl Notebook {
    /// Read a notebook from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::ReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// Write the notebook to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        fs::write(path, json).map_err(|e| Error::WriteError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Serialize the notebook to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a notebook from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let notebook: Self = serde_json::from_str(json)?;
        if notebook.nbformat != 4 {
            return Err(Error::InvalidNotebook(format!(
                "unsupported nbformat {}, expected 4",
                notebook.nbformat
            )));
        }
        Ok(notebook)
    }
}
