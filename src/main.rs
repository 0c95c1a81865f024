use clap::Parser;
use dental_ai::{cli, client, config, error, export, image_input, report};
use cli::{Cli, Commands, OverlayFormat};
use config::Config;
use dental_ai_common::AnalysisResponse;
use error::Result;
use image_input::ImageInput;
use indicatif::{ProgressBar, ProgressStyle};
use report::AnalysisReport;
use std::path::Path;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;

    match cli.command {
        Commands::Analyze { image, endpoint, report, overlay, display_width, display_height } => {
            println!("🦷 dental-ai - 画像解析\n");

            // 1. 画像検証
            println!("[1/3] 画像を確認中...");
            let input = ImageInput::load(&image)?;
            println!(
                "✔ {} ({}x{}, {} KB)\n",
                input.file_name,
                input.natural_size.0,
                input.natural_size.1,
                input.size / 1024
            );

            // 2. 解析サーバーへ送信
            let endpoint = endpoint.unwrap_or_else(|| config.endpoint());
            println!("[2/3] 解析中...");
            if cli.verbose {
                println!("  endpoint: {}", endpoint);
                println!("  timeout: {}s", config.timeout().as_secs());
            }
            let client = client::AnalyzeClient::new(endpoint, config.timeout())?;
            let spinner = spinner("Đang phân tích...");
            let response = client.analyze(&input).await;
            spinner.finish_and_clear();
            let response = response?;
            println!("✔ 解析完了\n");

            // 3. 結果表示・保存
            println!("[3/3] 結果");
            let analysis_report = AnalysisReport::build(&response, Some(&input.file_name));
            analysis_report.print();
            println!();

            if let Some(path) = report {
                analysis_report.save(&path)?;
                println!("✔ レポートを保存: {}", path.display());
            }

            if let Some(path) = overlay {
                let displayed = input.display_size(display_width, display_height);
                write_overlay(&config, &path, &input, &response, displayed, cli.verbose)?;
            }

            println!("\n✅ 完了");
        }

        Commands::Parse { input, json } => {
            let content = std::fs::read_to_string(&input)?;
            let response = if is_json(&input) {
                AnalysisResponse::from_json(&content)?.into_success()?
            } else {
                AnalysisResponse {
                    success: true,
                    gemini_analysis: content,
                    ..Default::default()
                }
            };

            let analysis_report = AnalysisReport::build(&response, None);
            if json {
                println!("{}", report::analysis_json(&analysis_report.analysis)?);
            } else {
                analysis_report.print();
            }
        }

        Commands::Render { response, image, output, display_width, display_height } => {
            println!("🖼  dental-ai - オーバーレイ出力\n");

            let content = std::fs::read_to_string(&response)?;
            let response = AnalysisResponse::from_json(&content)?;
            let input = ImageInput::load(&image)?;
            let displayed = input.display_size(display_width, display_height);

            write_overlay(&config, &output, &input, &response, displayed, cli.verbose)?;
            println!("\n✅ 完了");
        }

        Commands::Config { set_endpoint, set_timeout, set_font, show } => {
            let mut changed = false;

            if let Some(endpoint) = set_endpoint {
                config.set_endpoint(endpoint)?;
                changed = true;
                println!("✔ エンドポイントを設定しました");
            }

            if let Some(seconds) = set_timeout {
                config.set_timeout(seconds)?;
                changed = true;
                println!("✔ タイムアウトを設定しました");
            }

            if let Some(path) = set_font {
                config.set_label_font(path)?;
                changed = true;
                println!("✔ ラベル用フォントを設定しました");
            }

            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定ファイル: {}", Config::config_path()?.display());
                println!("endpoint: {}", config.endpoint);
                if config.endpoint() != config.endpoint {
                    println!("  ({} で上書き: {})", config::ENDPOINT_ENV, config.endpoint());
                }
                println!("timeout: {}s", config.timeout_seconds);
                match &config.label_font {
                    Some(path) => println!("label_font: {}", path.display()),
                    None => println!("label_font: (システムフォントを自動検出)"),
                }
            }
        }
    }

    Ok(())
}

fn write_overlay(
    config: &Config,
    path: &Path,
    input: &ImageInput,
    response: &AnalysisResponse,
    displayed: (f64, f64),
    verbose: bool,
) -> Result<()> {
    let Some(set) = response.detections() else {
        println!("- 検出結果がないためオーバーレイは出力しません");
        return Ok(());
    };

    let format = OverlayFormat::from_path(path);
    if verbose {
        println!(
            "  {}x{} → {:.0}x{:.0} ({})",
            input.natural_size.0, input.natural_size.1, displayed.0, displayed.1, format
        );
    }

    let font = match format {
        OverlayFormat::Png => config.load_label_font()?,
        OverlayFormat::Svg => None,
    };
    if format == OverlayFormat::Png && font.is_none() {
        println!("⚠️  ラベル用フォントが見つからないため文字なしで出力します (config --set-font で指定)");
    }

    let summary = export::write_overlay(format, path, input, &set.detections, displayed, font.as_ref())?;
    println!("✔ オーバーレイ出力: {} ({}件)", path.display(), summary.drawn);
    if summary.skipped > 0 {
        println!("⚠️  不正なボックス {}件をスキップ", summary.skipped);
    }
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
