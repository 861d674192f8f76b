//! Tiered text extraction from uploaded documents.
//!
//! PDFs get a fast structural pass first (pdftotext); only documents
//! yielding too little text fall back to rasterized OCR, bounded to the
//! first few pages. Images go straight to a single OCR pass. External
//! tools do the heavy lifting: poppler's pdftotext/pdftoppm/pdfinfo and
//! tesseract.

mod lab_values;

pub use lab_values::{extract_parameters, LabValues};

use std::path::Path;
use std::process::Command;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use thiserror::Error;

/// Minimum trimmed character count for the structural text pass to be
/// trusted. Shorter results are assumed to mean a scanned document.
pub const MIN_TEXT_CHARS: usize = 500;

/// Maximum number of pages rasterized for the OCR fallback.
pub const MAX_OCR_PAGES: u32 = 6;

/// File extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

/// Check whether a declared extension is one we can extract from.
pub fn is_allowed_extension(extension: &str) -> bool {
    let lower = extension.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&lower.as_str())
}

/// Handle command output, extracting stdout on success or returning appropriate error.
fn handle_cmd_output(
    result: std::io::Result<std::process::Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, ExtractionError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractionError::ExtractionFailed(format!(
                    "{}: {}",
                    error_prefix, stderr
                )))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Check command status, returning appropriate error on failure.
fn check_cmd_status(
    result: std::io::Result<std::process::ExitStatus>,
    tool_name: &str,
    error_msg: &str,
) -> Result<(), ExtractionError> {
    match result {
        Ok(s) if s.success() => Ok(()),
        Ok(_) => Err(ExtractionError::ExtractionFailed(error_msg.to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Check if an external binary is on PATH.
pub fn check_binary(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Method used to extract text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Direct structural text extraction, no rasterization.
    PdfText,
    /// Rasterized OCR using Tesseract.
    Ocr,
}

/// Result of text extraction.
#[derive(Debug)]
pub struct ExtractionResult {
    /// Extracted text content.
    pub text: String,
    /// Method used for extraction.
    pub method: ExtractionMethod,
    /// Number of pages in the document (for PDFs).
    pub page_count: Option<u32>,
}

/// Text extraction seam.
///
/// The production implementation shells out to poppler and tesseract;
/// tests substitute fakes to control timing and output.
pub trait Extract: Send + Sync {
    /// Extract text from a stored upload, dispatching on its declared extension.
    fn extract(&self, path: &Path, extension: &str) -> Result<ExtractionResult, ExtractionError>;
}

/// Text extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Tesseract language setting.
    #[serde(default = "default_language")]
    pub language: String,
    /// Rasterization resolution for the OCR fallback, in DPI.
    #[serde(default = "default_raster_dpi")]
    pub raster_dpi: u32,
    /// Wall-clock bound for one document's extraction, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_raster_dpi() -> u32 {
    200
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            raster_dpi: default_raster_dpi(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ExtractConfig {
    /// Check if this is the default config.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Text extractor that uses external tools.
pub struct TextExtractor {
    /// Minimum trimmed characters for the structural pass to be accepted.
    min_text_chars: usize,
    /// Maximum pages rasterized in the OCR fallback.
    max_ocr_pages: u32,
    /// Tesseract language setting.
    language: String,
    /// Rasterization resolution in DPI.
    raster_dpi: u32,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self {
            min_text_chars: MIN_TEXT_CHARS,
            max_ocr_pages: MAX_OCR_PAGES,
            language: default_language(),
            raster_dpi: default_raster_dpi(),
        }
    }
}

impl TextExtractor {
    /// Create a new text extractor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractConfig) -> Self {
        Self {
            language: config.language.clone(),
            raster_dpi: config.raster_dpi,
            ..Self::default()
        }
    }

    /// Extract text from a PDF, trying the structural pass first.
    fn extract_pdf(&self, file_path: &Path) -> Result<ExtractionResult, ExtractionError> {
        // Fast path: structural text, no rasterization
        match self.run_pdftotext(file_path) {
            Ok(text) if text.trim().chars().count() > self.min_text_chars => {
                return Ok(ExtractionResult {
                    text: clean_text(&text),
                    method: ExtractionMethod::PdfText,
                    page_count: self.get_pdf_page_count(file_path),
                });
            }
            Ok(text) => {
                tracing::debug!(
                    "structural text too short ({} chars), falling back to OCR",
                    text.trim().chars().count()
                );
            }
            Err(e) => {
                tracing::debug!("structural text extraction failed: {}, falling back to OCR", e);
            }
        }

        self.ocr_pdf(file_path)
    }

    /// OCR fallback: rasterize the leading pages and run Tesseract on each.
    fn ocr_pdf(&self, file_path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let page_count = self.get_pdf_page_count(file_path);
        let last_page = page_limit(page_count, self.max_ocr_pages);

        let temp_dir = TempDir::new()?;
        let temp_path = temp_dir.path();

        let dpi = self.raster_dpi.to_string();
        let last = last_page.to_string();
        let status = Command::new("pdftoppm")
            .args(["-png", "-r", &dpi, "-f", "1", "-l", &last])
            .arg(file_path)
            .arg(temp_path.join("page"))
            .status();

        check_cmd_status(
            status,
            "pdftoppm (install poppler-utils)",
            "pdftoppm failed to convert PDF",
        )?;

        // Find all generated images
        let mut images: Vec<_> = std::fs::read_dir(temp_path)?
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "png")
                    .unwrap_or(false)
            })
            .map(|e| e.path())
            .collect();

        images.sort();

        if images.is_empty() {
            return Err(ExtractionError::ExtractionFailed(
                "No images generated from PDF".to_string(),
            ));
        }

        // OCR each page on a grayscale, half-resolution copy
        let mut page_texts: Vec<String> = Vec::with_capacity(images.len());
        for (i, image_path) in images.iter().enumerate() {
            let processed = temp_path.join(format!("ocr-{:02}.png", i + 1));
            preprocess_for_ocr(image_path, &processed)?;

            match self.run_tesseract(&processed) {
                Ok(text) => page_texts.push(text),
                Err(e) => {
                    tracing::warn!("OCR failed for page {}: {}", i + 1, e);
                    page_texts.push(String::new());
                }
            }
        }

        Ok(ExtractionResult {
            text: clean_text(&page_texts.join("\n")),
            method: ExtractionMethod::Ocr,
            page_count,
        })
    }

    /// Extract text from an image file with a single OCR pass.
    fn extract_image(&self, file_path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let temp_dir = TempDir::new()?;
        let processed = temp_dir.path().join("image.png");
        preprocess_for_ocr(file_path, &processed)?;

        let text = self.run_tesseract(&processed)?;
        Ok(ExtractionResult {
            text,
            method: ExtractionMethod::Ocr,
            page_count: Some(1),
        })
    }

    /// Run pdftotext on a PDF file.
    fn run_pdftotext(&self, file_path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new("pdftotext")
            .args(["-layout", "-enc", "UTF-8"])
            .arg(file_path)
            .arg("-") // Output to stdout
            .output();

        handle_cmd_output(output, "pdftotext (install poppler-utils)", "pdftotext failed")
    }

    /// Get the page count of a PDF.
    pub fn get_pdf_page_count(&self, file_path: &Path) -> Option<u32> {
        let output = Command::new("pdfinfo").arg(file_path).output().ok()?;

        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            if line.starts_with("Pages:") {
                return line.split_whitespace().nth(1).and_then(|s| s.parse().ok());
            }
        }
        None
    }

    /// Run Tesseract OCR on an image.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language, "--oem", "1", "--psm", "6"])
            .output();

        handle_cmd_output(output, "tesseract (install tesseract-ocr)", "tesseract failed")
    }

    /// Check if required tools are available.
    pub fn check_tools() -> Vec<(String, bool)> {
        ["pdftotext", "pdftoppm", "pdfinfo", "tesseract"]
            .iter()
            .map(|tool| (tool.to_string(), check_binary(tool)))
            .collect()
    }
}

impl Extract for TextExtractor {
    fn extract(&self, path: &Path, extension: &str) -> Result<ExtractionResult, ExtractionError> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => self.extract_pdf(path),
            "png" | "jpg" | "jpeg" => self.extract_image(path),
            other => Err(ExtractionError::UnsupportedFileType(other.to_string())),
        }
    }
}

/// Last page to rasterize: the document length capped at `max_pages`.
/// Unknown page counts rasterize up to the cap and let pdftoppm stop early.
fn page_limit(page_count: Option<u32>, max_pages: u32) -> u32 {
    page_count.unwrap_or(max_pages).clamp(1, max_pages)
}

/// Write a grayscale, half-resolution copy of an image for OCR.
fn preprocess_for_ocr(input: &Path, output: &Path) -> Result<(), ExtractionError> {
    let img = image::open(input)?;
    let gray = img.to_luma8();
    let (width, height) = gray.dimensions();
    let half = image::imageops::resize(
        &gray,
        (width / 2).max(1),
        (height / 2).max(1),
        FilterType::Triangle,
    );
    half.save(output)?;
    Ok(())
}

/// Drop noise lines before handing text to the summarizer.
///
/// Lines whose trimmed length is 2 characters or less are removed, the
/// rest are trimmed and rejoined with newlines.
pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > 2)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_drops_short_lines() {
        let text = "Hemoglobin 13.5\n-\nab\n  WBC 7200  \n\nx";
        let cleaned = clean_text(text);
        assert_eq!(cleaned, "Hemoglobin 13.5\nWBC 7200");
    }

    #[test]
    fn test_clean_text_idempotent() {
        let text = "Total Cholesterol 194\nok\nHDL Cholesterol 48\n..\nLDL 131";
        let once = clean_text(text);
        let twice = clean_text(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_text_empty_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("\n\n\n"), "");
    }

    #[test]
    fn test_page_limit_caps_at_max() {
        assert_eq!(page_limit(Some(3), MAX_OCR_PAGES), 3);
        assert_eq!(page_limit(Some(6), MAX_OCR_PAGES), 6);
        assert_eq!(page_limit(Some(40), MAX_OCR_PAGES), 6);
        assert_eq!(page_limit(None, MAX_OCR_PAGES), 6);
        assert_eq!(page_limit(Some(0), MAX_OCR_PAGES), 1);
    }

    #[test]
    fn test_allowed_extensions() {
        assert!(is_allowed_extension("pdf"));
        assert!(is_allowed_extension("PDF"));
        assert!(is_allowed_extension("jpeg"));
        assert!(!is_allowed_extension("exe"));
        assert!(!is_allowed_extension("docx"));
    }

    #[test]
    fn test_extract_rejects_unknown_extension() {
        let extractor = TextExtractor::new();
        let result = extractor.extract(Path::new("/tmp/nope.docx"), "docx");
        assert!(matches!(
            result,
            Err(ExtractionError::UnsupportedFileType(ext)) if ext == "docx"
        ));
    }

    #[test]
    fn test_check_tools() {
        let tools = TextExtractor::check_tools();
        assert_eq!(tools.len(), 4);
    }
}
