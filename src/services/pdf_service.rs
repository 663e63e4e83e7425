use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{Error, Result};

pub const PDF_FAILURE_MESSAGE: &str = "Error generating quiz from PDF";
pub const PDF_FAILURE_SUGGESTION: &str =
    "Please try again with a different PDF or contact support.";
pub const MIN_TEXT_CHARS: usize = 100;

fn pdf_failure(detail: impl std::fmt::Display) -> Error {
    Error::request_failed(PDF_FAILURE_MESSAGE, detail, Some(PDF_FAILURE_SUGGESTION))
}

/// An upload saved to disk together with its extracted text.
#[derive(Debug)]
pub struct PreparedPdf {
    pub path: PathBuf,
    pub file_name: String,
    pub text: String,
}

#[derive(Clone)]
pub struct PdfService {
    upload_dir: PathBuf,
}

impl PdfService {
    pub fn new(uploads_dir: impl AsRef<Path>) -> Self {
        Self {
            upload_dir: uploads_dir.as_ref().join("pdf"),
        }
    }

    /// Saves the upload and extracts its text. On failure nothing is left on
    /// disk.
    pub async fn prepare(&self, data: &[u8]) -> Result<PreparedPdf> {
        let path = self.save(data).await?;
        match extract_text(&path).await.and_then(check_text) {
            Ok(text) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                tracing::info!(file = %file_name, chars = text.chars().count(), "PDF text extracted");
                Ok(PreparedPdf {
                    path,
                    file_name,
                    text,
                })
            }
            Err(e) => {
                self.remove(&path).await;
                Err(e)
            }
        }
    }

    async fn save(&self, data: &[u8]) -> Result<PathBuf> {
        if !data.starts_with(b"%PDF") {
            return Err(pdf_failure("Only PDF files are allowed"));
        }

        fs::create_dir_all(&self.upload_dir).await?;
        let path = self
            .upload_dir
            .join(format!("{}.pdf", uuid::Uuid::new_v4()));
        fs::write(&path, data).await.map_err(|e| {
            tracing::error!(error = %e, path = %path.display(), "failed to write PDF upload");
            pdf_failure(format!("Failed to save file: {}", e))
        })?;
        Ok(path)
    }

    pub async fn remove(&self, path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => tracing::info!(path = %path.display(), "removed uploaded file"),
            Err(e) => tracing::warn!(error = %e, path = %path.display(), "could not remove uploaded file"),
        }
    }
}

async fn extract_text(path: &Path) -> Result<String> {
    let output = tokio::process::Command::new("pdftotext")
        .arg("-layout")
        .arg(path)
        .arg("-")
        .output()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, path = %path.display(), "failed to run pdftotext");
            pdf_failure("Failed to extract text from PDF")
        })?;

    if !output.status.success() {
        tracing::warn!(
            status = %output.status,
            stderr = %String::from_utf8_lossy(&output.stderr),
            "pdftotext exited with an error"
        );
        return Err(pdf_failure("Failed to extract text from PDF"));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn check_text(text: String) -> Result<String> {
    if text.trim().chars().count() < MIN_TEXT_CHARS {
        return Err(pdf_failure(
            "PDF content is too short or could not be properly extracted",
        ));
    }
    Ok(text)
}
