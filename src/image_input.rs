//! 送信する画像ファイルの読み込みと検証

use crate::error::{DentalAiError, Result};
use dental_ai_common::input::{mime_from_extension, validate_upload};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ImageInput {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: &'static str,
    pub size: u64,
    /// 元画像のピクセルサイズ
    pub natural_size: (u32, u32),
}

impl ImageInput {
    /// 画像を検証して読み込む
    ///
    /// - 存在しない → FileNotFound
    /// - 画像以外/5MB超 → Rejected
    /// - デコード不可 → ImageLoad
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DentalAiError::FileNotFound(path.display().to_string()));
        }

        let size = std::fs::metadata(path)?.len();
        let mime = mime_from_extension(path);
        validate_upload(mime, size)?;

        let natural_size = image::image_dimensions(path)
            .map_err(|e| DentalAiError::ImageLoad(format!("{}: {}", path.display(), e)))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image.jpg".to_string());

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            mime,
            size,
            natural_size,
        })
    }

    /// 表示サイズを決める
    ///
    /// 片方だけ指定された場合は縦横比を保つ。両方省略なら元画像サイズ。
    pub fn display_size(&self, width: Option<f64>, height: Option<f64>) -> (f64, f64) {
        let (nw, nh) = (self.natural_size.0 as f64, self.natural_size.1 as f64);
        match (width, height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, w * nh / nw),
            (None, Some(h)) => (h * nw / nh, h),
            (None, None) => (nw, nh),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dental_ai_common::InputRejection;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, Rgba([200, 200, 200, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_load_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("teeth.png");
        write_png(&path, 40, 20);

        let input = ImageInput::load(&path).unwrap();
        assert_eq!(input.file_name, "teeth.png");
        assert_eq!(input.mime, "image/png");
        assert_eq!(input.natural_size, (40, 20));
    }

    #[test]
    fn test_load_missing() {
        let err = ImageInput::load(Path::new("/nonexistent/teeth.jpg")).unwrap_err();
        assert!(matches!(err, DentalAiError::FileNotFound(_)));
    }

    #[test]
    fn test_load_non_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let err = ImageInput::load(&path).unwrap_err();
        assert!(matches!(err, DentalAiError::Rejected(InputRejection::NotAnImage)));
    }

    #[test]
    fn test_load_corrupt_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let err = ImageInput::load(&path).unwrap_err();
        assert!(matches!(err, DentalAiError::ImageLoad(_)));
    }

    #[test]
    fn test_display_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("teeth.png");
        write_png(&path, 200, 100);
        let input = ImageInput::load(&path).unwrap();

        assert_eq!(input.display_size(None, None), (200.0, 100.0));
        assert_eq!(input.display_size(Some(400.0), None), (400.0, 200.0));
        assert_eq!(input.display_size(None, Some(50.0)), (100.0, 50.0));
        assert_eq!(input.display_size(Some(10.0), Some(90.0)), (10.0, 90.0));
    }
}
