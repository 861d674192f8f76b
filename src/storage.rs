//! Storage helpers for uploaded files on disk.

use std::path::{Path, PathBuf};

/// Sanitize a client-supplied filename for safe storage.
///
/// Path separators, shell-hostile characters, and control characters become
/// underscores; overlong names are truncated on a character boundary.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Trim and limit length
    let trimmed = sanitized.trim().trim_matches('_');
    if trimmed.is_empty() {
        return "document".to_string();
    }
    match trimmed.char_indices().nth(100) {
        Some((idx, _)) => trimmed[..idx].to_string(),
        None => trimmed.to_string(),
    }
}

/// Construct the storage path for an upload.
///
/// Files are namespaced by job id as `{job_id}_{filename}`, so two uploads
/// sharing a name never collide and the original name stays readable.
pub fn upload_path(uploads_dir: &Path, job_id: &str, filename: &str) -> PathBuf {
    uploads_dir.join(format!("{}_{}", job_id, sanitize_filename(filename)))
}

/// Save uploaded bytes to their job-namespaced location.
pub fn save_upload(
    uploads_dir: &Path,
    job_id: &str,
    filename: &str,
    content: &[u8],
) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(uploads_dir)?;
    let path = upload_path(uploads_dir, job_id, filename);
    std::fs::write(&path, content)?;
    Ok(path)
}
