//! Standalone extraction command.
//!
//! Runs the tiered extraction pipeline on one file and prints the result.
//! Useful for checking OCR quality without going through the server.

use std::path::Path;

use console::style;

use crate::config::Config;
use crate::extract::{extract_parameters, Extract, ExtractionMethod, TextExtractor};

/// Extract text from a single report file.
pub async fn cmd_extract(config: &Config, file: &Path, json: bool) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }

    let extension = file
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let extractor = TextExtractor::from_config(&config.extract);

    // Subprocess work is blocking, same as in the job runner.
    let path = file.to_path_buf();
    let result = tokio::task::spawn_blocking(move || extractor.extract(&path, &extension)).await??;

    let method = match result.method {
        ExtractionMethod::PdfText => "pdf_text",
        ExtractionMethod::Ocr => "ocr",
    };

    if json {
        let payload = serde_json::json!({
            "method": method,
            "page_count": result.page_count,
            "characters": result.text.chars().count(),
            "lab_values": extract_parameters(&result.text),
            "text": result.text,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!(
        "{} Extracted {} characters ({})",
        style("✓").green(),
        result.text.chars().count(),
        method
    );
    println!("{}", result.text);

    Ok(())
}
