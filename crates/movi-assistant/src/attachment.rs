//! Image attachments as `data:` URIs.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image file is empty")]
    Empty,
}

/// MIME type for a supported image extension.
pub fn mime_for_path(path: &Path) -> Result<&'static str, AttachmentError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        _ if ext.is_empty() => Err(AttachmentError::UnsupportedType(
            path.display().to_string(),
        )),
        _ => Err(AttachmentError::UnsupportedType(format!(".{ext}"))),
    }
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Read an image file into a data URI, refusing files over `max_bytes`.
pub fn load_image(path: &Path, max_bytes: u64) -> Result<String, AttachmentError> {
    let mime = mime_for_path(path)?;
    let io_err = |source| AttachmentError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > max_bytes {
        return Err(AttachmentError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let bytes = std::fs::read(path).map_err(io_err)?;
    if bytes.is_empty() {
        return Err(AttachmentError::Empty);
    }
    // the file may have grown since the metadata call
    if bytes.len() as u64 > max_bytes {
        return Err(AttachmentError::TooLarge {
            size: bytes.len() as u64,
            limit: max_bytes,
        });
    }
    Ok(encode_data_uri(mime, &bytes))
}
