//! Local photo selection: read an image fully into memory and encode it as
//! an inline `data:` URL for immediate preview. Nothing is uploaded here.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::error::EditError;

/// A single file picked from local storage.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        }
    }
}

/// Encode `file` as `data:<mime>;base64,<payload>`.
///
/// Only `image/*` types are accepted, and files over `max_bytes` are
/// rejected before encoding.
pub fn encode_preview(file: &SelectedFile, max_bytes: usize) -> Result<String, EditError> {
    let mime_type = file.mime_type.trim().to_ascii_lowercase();
    if !mime_type.starts_with("image/") || mime_type.len() == "image/".len() {
        return Err(EditError::NotAnImage {
            file_name: file.file_name.clone(),
            mime_type: file.mime_type.clone(),
        });
    }
    if file.bytes.len() > max_bytes {
        return Err(EditError::FileTooLarge {
            file_name: file.file_name.clone(),
            size: file.bytes.len(),
            max: max_bytes,
        });
    }

    Ok(format!(
        "data:{};base64,{}",
        mime_type,
        BASE64_STANDARD.encode(&file.bytes)
    ))
}
