use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dental-ai")]
#[command(about = "歯科画像AI解析クライアント・検出オーバーレイ生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を解析サーバーへ送信して結果を表示
    Analyze {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 解析エンドポイント（省略時は設定値）
        #[arg(short, long)]
        endpoint: Option<String>,

        /// 解析結果レポート(JSON)の出力先
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// 検出オーバーレイの出力先 (.png/.svg)
        #[arg(short, long)]
        overlay: Option<PathBuf>,

        /// 表示幅（省略時は元画像の幅）
        #[arg(long)]
        display_width: Option<f64>,

        /// 表示高さ（省略時は元画像の高さ）
        #[arg(long)]
        display_height: Option<f64>,
    },

    /// 保存済みのレスポンスJSON、またはGeminiテキストをパースして表示
    Parse {
        /// 入力ファイル（.jsonはレスポンス全体として扱う）
        #[arg(required = true)]
        input: PathBuf,

        /// パース結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 保存済みのレスポンスJSONから検出オーバーレイを出力
    Render {
        /// レスポンスJSONファイル
        #[arg(required = true)]
        response: PathBuf,

        /// 元画像
        #[arg(required = true)]
        image: PathBuf,

        /// 出力先 (.png/.svg)
        #[arg(short, long, required = true)]
        output: PathBuf,

        /// 表示幅（省略時は元画像の幅）
        #[arg(long)]
        display_width: Option<f64>,

        /// 表示高さ（省略時は元画像の高さ）
        #[arg(long)]
        display_height: Option<f64>,
    },

    /// 設定を表示/編集
    Config {
        /// 解析エンドポイントを設定
        #[arg(long)]
        set_endpoint: Option<String>,

        /// タイムアウト（秒）を設定
        #[arg(long)]
        set_timeout: Option<u64>,

        /// PNGラベル用フォント（.ttf/.otf）を設定
        #[arg(long)]
        set_font: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// オーバーレイ出力形式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OverlayFormat {
    /// 元画像に重ねたPNG
    #[default]
    Png,
    /// 透明背景のSVG（描画命令そのまま）
    Svg,
}

impl OverlayFormat {
    /// 拡張子から判定（不明な場合はPNG）
    pub fn from_path(path: &std::path::Path) -> Self {
        match path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref()
        {
            Some("svg") => OverlayFormat::Svg,
            _ => OverlayFormat::Png,
        }
    }
}

impl std::str::FromStr for OverlayFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OverlayFormat::Png),
            "svg" => Ok(OverlayFormat::Svg),
            _ => Err(format!("Unknown format: {}. Use png or svg", s)),
        }
    }
}

impl std::fmt::Display for OverlayFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayFormat::Png => write!(f, "png"),
            OverlayFormat::Svg => write!(f, "svg"),
        }
    }
}
