use clap::Parser;
use dalat_market::{cli, config, error, gateway, interactive, translator, camera};
use camera::{CameraSession, FileCamera};
use cli::{Cli, Commands};
use config::Config;
use error::{MarketError, Result};
use gateway::{GeminiGateway, MarketGateway};
use dalat_market_common::{messages, Language};
use std::process::ExitCode;
use translator::TranslatorPanel;

fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("エラー: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load()?;
    let lang = cli.lang.unwrap_or(config.language);
    let m = messages(lang);

    match cli.command {
        Commands::Identify { image, price } => {
            println!("📸 dalat-market - 商品認識\n");
            let gateway = GeminiGateway::from_config(&config)?;

            let mut device = FileCamera::new(&image, config.max_image_size);
            let frame = CameraSession::acquire(&mut device)?.capture_frame()?;

            let pb = interactive::spinner("画像認識中...");
            let result = gateway.identify_item(&frame, lang).await;
            pb.finish_and_clear();
            let identification = match result {
                Ok(identification) => identification,
                Err(e) => return Ok(report(e, lang, m.identify_failed)),
            };
            println!("✔ {}", identification.item_name);

            if price {
                let pb = interactive::spinner("相場検索中...");
                let result = gateway.estimate_price(&identification.item_name, lang).await;
                pb.finish_and_clear();
                let price = match result {
                    Ok(price) => price,
                    Err(e) => return Ok(report(e, lang, m.price_failed)),
                };
                println!();
                interactive::print_price(&identification.item_name, &price);
            }
        }

        Commands::Price { item, json } => {
            let item_name = item.join(" ");
            if item_name.trim().is_empty() {
                return Err(MarketError::EmptyInput);
            }
            let gateway = GeminiGateway::from_config(&config)?;

            let pb = interactive::spinner("相場検索中...");
            let result = gateway.estimate_price(&item_name, lang).await;
            pb.finish_and_clear();
            let price = match result {
                Ok(price) => price,
                Err(e) => return Ok(report(e, lang, m.price_failed)),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&price)?);
            } else {
                interactive::print_price(&item_name, &price);
            }
        }

        Commands::Translate { text } => {
            let gateway = GeminiGateway::from_config(&config)?;
            let mut panel = TranslatorPanel::new(lang);
            panel.set_input(text.join(" "));

            let pb = interactive::spinner("翻訳中...");
            let result = panel.translate_with(&gateway).await;
            pb.finish_and_clear();
            result?;

            if let Some(message) = panel.error_message() {
                println!("⚠ {}", message);
                return Ok(ExitCode::FAILURE);
            }
            if let Some(translation) = panel.translation() {
                println!("{} → {}", lang, lang.counterpart());
                println!("  {}", translation.translated_text);
                if !translation.phonetic.is_empty() {
                    println!("  🔊 {}", translation.phonetic);
                }
            }
        }

        Commands::Spots => {
            let gateway = GeminiGateway::from_config(&config)?;

            let pb = interactive::spinner("地図を検索中...");
            let result = gateway.find_map_spots(lang).await;
            pb.finish_and_clear();
            let spots = match result {
                Ok(spots) => spots,
                Err(e) => return Ok(report(e, lang, m.map_failed)),
            };

            if spots.is_empty() {
                println!("地図ピンが見つかりませんでした");
            }
            for spot in spots {
                println!("📍 {} <{}>", spot.title, spot.uri);
            }
        }

        Commands::Scan { image } => {
            let gateway = GeminiGateway::from_config(&config)?;
            interactive::run_interactive_scan(&gateway, lang, image.as_deref(), config.max_image_size).await?;
        }

        Commands::Config { set_api_key, set_language, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(language) = set_language {
                config.set_language(language)?;
                println!("✔ 表示言語を {} に設定しました", language);
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  地図モデル: {}", config.maps_model);
                println!("  エンドポイント: {}", config.api_base_url);
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  表示言語: {}", config.language);
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// 利用者向けの短いメッセージだけを表示する（詳細はログへ）
fn report(err: MarketError, lang: Language, fallback: &str) -> ExitCode {
    log::debug!("{:?}", err);
    println!("⚠ {}", err.user_message(lang, fallback));
    ExitCode::FAILURE
}
