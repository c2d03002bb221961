//! Document loading for summaries and question context

use crate::error::{Result, StudyError};
use std::path::Path;

/// Name used when a document path has no file name
const FALLBACK_NAME: &str = "uploaded.pdf";

/// Text extracted from a user-supplied document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContext {
    pub name: String,
    pub text: String,
}

impl DocumentContext {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Load a PDF, text or markdown file
///
/// # Errors
///
/// Returns `StudyError::Document` when the file type is unsupported, the
/// file cannot be parsed, or no text is found
pub fn load_document(path: &Path) -> Result<DocumentContext> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_NAME.to_string());

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => {
            let bytes = std::fs::read(path)?;
            extract_pdf_text(&bytes)?
        }
        "txt" | "md" | "markdown" => std::fs::read_to_string(path)?,
        _ => {
            return Err(StudyError::Document(
                "Please select a valid PDF file".to_string(),
            )
            .into())
        }
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(StudyError::Document("No text found in PDF".to_string()).into());
    }

    tracing::debug!(name = %name, chars = text.chars().count(), "Loaded document");
    Ok(DocumentContext { name, text })
}

/// Extract the text of every page of a PDF
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        tracing::error!("PDF parsing error: {:?}", e);
        StudyError::Document("Failed to parse PDF. Please try another file.".to_string()).into()
    })
}
