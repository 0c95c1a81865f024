//! アップロード画像の検証

use std::path::Path;
use thiserror::Error;

/// アップロード上限（5MB）
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputRejection {
    #[error("Vui lòng chọn file hình ảnh!")]
    NotAnImage,

    #[error("File quá lớn! Vui lòng chọn file nhỏ hơn 5MB.")]
    TooLarge(u64),
}

/// MIMEタイプとサイズを検証
pub fn validate_upload(mime: &str, size: u64) -> Result<(), InputRejection> {
    if !mime.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(InputRejection::NotAnImage);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(InputRejection::TooLarge(size));
    }
    Ok(())
}

/// 拡張子からMIMEタイプを推定
pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_image() {
        assert!(validate_upload("image/jpeg", 1024).is_ok());
        assert!(validate_upload("IMAGE/PNG", MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn test_rejects_non_image() {
        assert_eq!(validate_upload("application/pdf", 10), Err(InputRejection::NotAnImage));
        assert_eq!(validate_upload("", 10), Err(InputRejection::NotAnImage));
    }

    #[test]
    fn test_rejects_too_large() {
        assert_eq!(
            validate_upload("image/jpeg", MAX_UPLOAD_BYTES + 1),
            Err(InputRejection::TooLarge(MAX_UPLOAD_BYTES + 1))
        );
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("dir/b.png")), "image/png");
        assert_eq!(mime_from_extension(Path::new("c.txt")), "application/octet-stream");
        assert_eq!(mime_from_extension(Path::new("noext")), "application/octet-stream");
    }
}
