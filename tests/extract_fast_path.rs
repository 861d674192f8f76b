//! Structural-text fast path.
//!
//! Stub poppler/tesseract binaries are placed at the front of PATH so the
//! extractor's subprocess calls hit them instead of the real tools. This
//! file holds a single test and runs as its own process, so the PATH
//! change cannot leak anywhere else.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use medbrief::extract::{Extract, ExtractionMethod, TextExtractor};

fn write_shim(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

#[test]
fn rich_pdf_text_skips_ocr_entirely() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    fs::create_dir(&bin).unwrap();

    // The fixture's content doubles as the stub pdftotext output.
    let pdf = dir.path().join("report.pdf");
    let line = "Comprehensive metabolic panel: glucose 92 mg/dL, creatinine 0.9 mg/dL. ";
    fs::write(&pdf, line.repeat(10)).unwrap();
    fs::write(dir.path().join("report.pdf.info"), "Pages: 12\n").unwrap();

    let counter = dir.path().join("tesseract.count");

    write_shim(&bin, "pdftotext", "#!/bin/sh\ncat \"$4\"\n");
    write_shim(
        &bin,
        "pdfinfo",
        "#!/bin/sh\ncat \"$1.info\" 2>/dev/null || echo \"Pages: 1\"\n",
    );
    // Rasterization failing loudly means the fast path leaked into OCR.
    write_shim(&bin, "pdftoppm", "#!/bin/sh\nexit 1\n");
    write_shim(
        &bin,
        "tesseract",
        &format!("#!/bin/sh\necho run >> \"{}\"\necho text\n", counter.display()),
    );

    let original_path = std::env::var("PATH").unwrap_or_default();
    std::env::set_var("PATH", format!("{}:{}", bin.display(), original_path));

    let extractor = TextExtractor::new();
    let result = extractor.extract(&pdf, "pdf").unwrap();

    assert_eq!(result.method, ExtractionMethod::PdfText);
    assert_eq!(result.page_count, Some(12));
    assert!(result.text.contains("glucose 92 mg/dL"));
    assert!(
        !counter.exists(),
        "OCR ran even though the structural pass produced enough text"
    );
}
