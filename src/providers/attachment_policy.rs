use std::path::Path;

use crate::errors::internal::ValidationError;

pub const ALLOWED_EXTENSIONS: [&str; 10] = [
    "pdf", "doc", "docx", "txt", "jpg", "jpeg", "png", "gif", "zip", "rar",
];

/// Lower-cased extension of `filename`, if any
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Reject empty names, oversized files and extensions outside the allow-list
pub fn validate_upload(filename: &str, size: u64, max_bytes: u64) -> Result<(), ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::empty("filename"));
    }

    if size > max_bytes {
        return Err(ValidationError::FileTooLarge { size, max: max_bytes });
    }

    match extension_of(filename) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ValidationError::DisallowedExtension {
            filename: filename.to_string(),
        }),
    }
}

/// Human readable size, e.g. "1.5 MB"
pub fn file_size_display(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}
