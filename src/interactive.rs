//! 対話式スキャン
//!
//! ScanSession をターミナルから操作する。写真ファイルをカメラ代わりに使う

use crate::camera::FileCamera;
use crate::error::{MarketError, Result};
use crate::gateway::MarketGateway;
use crate::session::{ScanSession, ScanState};
use dalat_market_common::{Language, PriceResult};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 対話アクション
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanAction {
    /// カメラで撮影を始める
    Camera,
    /// 手入力で検索
    Manual,
    /// シャッター
    Shutter,
    /// 相場検索
    Search,
    /// 商品名を書き換え
    Edit(String),
    /// 撮り直し
    Retake,
    /// 最初から
    Reset,
    /// 表示言語の切替（韓国語 ⇔ ベトナム語）
    ToggleLanguage,
    /// 終了
    Quit,
}

/// 状態ごとの入力をアクションに変換
///
/// 解釈できない入力は None
pub fn parse_action(state: ScanState, input: &str) -> Option<ScanAction> {
    let trimmed = input.trim();
    match (state, trimmed) {
        (_, "q" | "Q") => Some(ScanAction::Quit),
        (_, "l" | "L") => Some(ScanAction::ToggleLanguage),
        (ScanState::Idle, "c") => Some(ScanAction::Camera),
        (ScanState::Idle, "m") => Some(ScanAction::Manual),
        (ScanState::Capturing, "" | "s") => Some(ScanAction::Shutter),
        (ScanState::Confirming, "" | "s") => Some(ScanAction::Search),
        (ScanState::Confirming, "r") => Some(ScanAction::Retake),
        (ScanState::Result, "") => Some(ScanAction::Reset),
        (ScanState::Idle, _) => None,
        (_, "x") => Some(ScanAction::Reset),
        (ScanState::Confirming | ScanState::ManualInput, text) if !text.is_empty() => {
            Some(ScanAction::Edit(text.to_string()))
        }
        _ => None,
    }
}

fn prompt_for(state: ScanState) -> &'static str {
    match state {
        ScanState::Idle => "[c]カメラ [m]手入力 [l]言語 [q]終了",
        ScanState::Capturing => "[Enter]撮影 [x]中止 [l]言語 [q]終了",
        ScanState::Confirming => "[Enter]相場検索 [名前入力]修正 [r]撮り直し [x]最初から [l]言語 [q]終了",
        ScanState::ManualInput => "商品名を入力 [x]戻る [l]言語 [q]終了",
        ScanState::Result => "[Enter]最初から [l]言語 [q]終了",
        ScanState::Identifying | ScanState::Searching => "",
    }
}

/// 応答待ち中のスピナー
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// 相場結果を表示
pub fn print_price(item_name: &str, price: &PriceResult) {
    println!("🏷  {}", item_name);
    println!("  相場: {} ₫ ({})", price.price_range, price.unit);
    println!("  値切りのコツ: {}", price.negotiation_tip);
    println!("  説明: {}", price.description);
    if !price.sources.is_empty() {
        println!("  出典:");
        for source in &price.sources {
            println!("    - {} <{}>", source.title, source.uri);
        }
    }
}

fn read_line(prompt: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| MarketError::Prompt(e.to_string()))
}

fn camera_for(image: Option<&Path>, max_size: u32) -> Result<FileCamera> {
    let path = match image {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(read_line("写真ファイルのパス")?.trim()),
    };
    Ok(FileCamera::new(path, max_size))
}

fn report_error(session: &ScanSession) {
    if let Some(message) = session.error_message() {
        println!("  ⚠ {}", message);
    }
}

/// 対話式スキャンを実行
pub async fn run_interactive_scan(
    gateway: &dyn MarketGateway,
    lang: Language,
    image: Option<&Path>,
    max_image_size: u32,
) -> Result<()> {
    let mut session = ScanSession::new(lang);
    let mut camera: Option<FileCamera> = None;

    println!("🛒 ダラット夜市スキャン ({})\n", lang);

    loop {
        let state = session.state();
        let input = read_line(prompt_for(state))?;
        let Some(action) = parse_action(state, &input) else {
            continue;
        };

        let outcome = match action {
            ScanAction::Quit => break,
            ScanAction::Camera => {
                let device = camera.insert(camera_for(image, max_image_size)?);
                session.choose_camera(device)
            }
            ScanAction::Manual => session.choose_manual(),
            ScanAction::Shutter => {
                let pb = spinner("画像認識中...");
                let result = session.capture_and_identify(gateway).await;
                pb.finish_and_clear();
                result.map(|_| ())
            }
            ScanAction::Edit(name) => match session.edit_name(name) {
                Ok(()) if state == ScanState::ManualInput => search(&mut session, gateway).await,
                other => other,
            },
            ScanAction::Search => search(&mut session, gateway).await,
            ScanAction::Retake => {
                let device = match camera.take() {
                    Some(device) => device,
                    None => camera_for(image, max_image_size)?,
                };
                session.retake(camera.insert(device))
            }
            ScanAction::Reset => {
                session.reset();
                Ok(())
            }
            ScanAction::ToggleLanguage => {
                session.set_language(session.language().counterpart());
                println!("  🌐 {}", session.language().native_name());
                Ok(())
            }
        };

        if let Err(e) = outcome {
            log::debug!("操作失敗: {}", e);
        }
        report_error(&session);

        match session.state() {
            ScanState::Confirming => println!("  この商品ですか？ → {}", session.item_name()),
            ScanState::Result => {
                if let Some(price) = session.price_result() {
                    print_price(session.item_name(), price);
                }
            }
            _ => {}
        }
    }

    session.reset();
    Ok(())
}

async fn search(session: &mut ScanSession, gateway: &dyn MarketGateway) -> Result<()> {
    let pb = spinner("相場検索中...");
    let result = session.search(gateway).await;
    pb.finish_and_clear();
    result.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action_idle() {
        assert_eq!(parse_action(ScanState::Idle, "c"), Some(ScanAction::Camera));
        assert_eq!(parse_action(ScanState::Idle, "m"), Some(ScanAction::Manual));
        assert_eq!(parse_action(ScanState::Idle, "x"), None);
        assert_eq!(parse_action(ScanState::Idle, "Artichoke"), None);
    }

    #[test]
    fn test_parse_action_confirming() {
        assert_eq!(parse_action(ScanState::Confirming, ""), Some(ScanAction::Search));
        assert_eq!(parse_action(ScanState::Confirming, "r"), Some(ScanAction::Retake));
        assert_eq!(parse_action(ScanState::Confirming, "x"), Some(ScanAction::Reset));
        assert_eq!(
            parse_action(ScanState::Confirming, " Trà Atiso "),
            Some(ScanAction::Edit("Trà Atiso".into()))
        );
    }

    #[test]
    fn test_parse_action_manual_and_result() {
        assert_eq!(parse_action(ScanState::ManualInput, ""), None);
        assert_eq!(
            parse_action(ScanState::ManualInput, "Dâu tây"),
            Some(ScanAction::Edit("Dâu tây".into()))
        );
        assert_eq!(parse_action(ScanState::Result, ""), Some(ScanAction::Reset));
        assert_eq!(parse_action(ScanState::Result, "q"), Some(ScanAction::Quit));
    }

    #[test]
    fn test_parse_action_capturing() {
        assert_eq!(parse_action(ScanState::Capturing, ""), Some(ScanAction::Shutter));
        assert_eq!(parse_action(ScanState::Capturing, "x"), Some(ScanAction::Reset));
        assert_eq!(parse_action(ScanState::Capturing, "hello"), None);
    }

    #[test]
    fn test_parse_action_language_toggle_in_any_state() {
        for state in ScanState::ALL {
            assert_eq!(parse_action(state, "l"), Some(ScanAction::ToggleLanguage), "{}", state);
        }
    }
}
