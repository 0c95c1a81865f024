use crate::error::{DentalAiError, Result};
use crate::export::png::LabelFont;
use dental_ai_common::api::{DEFAULT_ENDPOINT, REQUEST_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// エンドポイントを上書きする環境変数
pub const ENDPOINT_ENV: &str = "DENTAL_AI_ENDPOINT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub timeout_seconds: u64,
    /// PNGラベル用フォント（未設定ならシステムフォントを探す）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_font: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout_seconds: REQUEST_TIMEOUT_SECS,
            label_font: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DentalAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("dental-ai").join("config.json"))
    }

    /// 実際に使うエンドポイント（環境変数を優先）
    pub fn endpoint(&self) -> String {
        match std::env::var(ENDPOINT_ENV) {
            Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
            _ => self.endpoint.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    pub fn set_endpoint(&mut self, endpoint: String) -> Result<()> {
        let endpoint = endpoint.trim().to_string();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(DentalAiError::Config(format!(
                "エンドポイントはhttp(s)のURLで指定してください: {}",
                endpoint
            )));
        }
        self.endpoint = endpoint;
        Ok(())
    }

    pub fn set_timeout(&mut self, seconds: u64) -> Result<()> {
        if seconds == 0 {
            return Err(DentalAiError::Config("タイムアウトは1秒以上にしてください".into()));
        }
        self.timeout_seconds = seconds;
        Ok(())
    }

    /// 読めるフォントファイルだけを受け付ける
    pub fn set_label_font(&mut self, path: PathBuf) -> Result<()> {
        LabelFont::load(&path)?;
        self.label_font = Some(path);
        Ok(())
    }

    /// PNGラベル用フォント
    ///
    /// 設定済みのフォントが読めなければエラー。未設定ならシステムフォントを探す。
    pub fn load_label_font(&self) -> Result<Option<LabelFont>> {
        match &self.label_font {
            Some(path) => LabelFont::load(path).map(Some),
            None => Ok(LabelFont::discover()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:5001/analyze");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.set_endpoint("https://example.com/analyze".to_string()).unwrap();
        config.set_timeout(45).unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.endpoint, "https://example.com/analyze");
        assert_eq!(loaded.timeout_seconds, 45);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"timeout_seconds": 10}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_seconds, 10);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.set_endpoint("ftp://x".to_string()),
            Err(DentalAiError::Config(_))
        ));
        assert!(matches!(config.set_timeout(0), Err(DentalAiError::Config(_))));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_label_font_must_be_readable() {
        let dir = tempdir().unwrap();
        let bogus = dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();

        let mut config = Config::default();
        assert!(matches!(
            config.set_label_font(dir.path().join("missing.ttf")),
            Err(DentalAiError::FileNotFound(_))
        ));
        assert!(matches!(config.set_label_font(bogus.clone()), Err(DentalAiError::Export(_))));
        assert_eq!(config.label_font, None);

        // 設定ファイルを手で書き換えた場合も読み込み時にエラーにする
        config.label_font = Some(bogus);
        assert!(config.load_label_font().is_err());
    }

    #[test]
    fn test_unset_label_font_not_serialized() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(!json.contains("label_font"));
    }
}
