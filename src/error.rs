use dalat_market_common::{messages, Language};
use thiserror::Error;

/// 「未設定」と判断するエラー本文のシグネチャ
const NOT_CONFIGURED_SIGNATURES: &[&str] = &["Requested entity was not found", "API_KEY"];

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`dalat-market config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("APIの接続設定が無効です: {0}")]
    NotConfigured(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("カメラエラー: {0}")]
    Camera(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("この状態では実行できません: {state} で {action}")]
    InvalidTransition { state: String, action: String },

    #[error("入力が空です")]
    EmptyInput,

    #[error("対話入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

}

impl MarketError {
    /// HTTPエラーを分類する
    ///
    /// 認証エラー（401/403）と「未設定」シグネチャを含む本文は `NotConfigured`、
    /// それ以外は `ApiCall`
    pub fn from_http_failure(status: u16, body: &str) -> Self {
        if status == 401 || status == 403 || has_not_configured_signature(body) {
            MarketError::NotConfigured(format!("HTTP {}: {}", status, body))
        } else {
            MarketError::ApiCall(format!("HTTP {}: {}", status, body))
        }
    }

    /// 接続設定（APIキー・エンドポイント）の問題か
    pub fn is_not_configured(&self) -> bool {
        match self {
            MarketError::MissingApiKey | MarketError::NotConfigured(_) => true,
            MarketError::ApiCall(msg) => has_not_configured_signature(msg),
            _ => false,
        }
    }

    /// 利用者向けの短いメッセージ
    ///
    /// 設定不備は設定の案内、それ以外は `"<fallback>: <再試行>"`
    pub fn user_message(&self, lang: Language, fallback: &str) -> String {
        let m = messages(lang);
        if self.is_not_configured() {
            m.setup_required.to_string()
        } else {
            format!("{}: {}", fallback, m.retry)
        }
    }
}

fn has_not_configured_signature(text: &str) -> bool {
    NOT_CONFIGURED_SIGNATURES.iter().any(|sig| text.contains(sig))
}

impl From<reqwest::Error> for MarketError {
    fn from(e: reqwest::Error) -> Self {
        MarketError::ApiCall(e.to_string())
    }
}

/// 共通クレートのパース失敗はAPI応答の解釈失敗
impl From<dalat_market_common::Error> for MarketError {
    fn from(e: dalat_market_common::Error) -> Self {
        MarketError::ApiParse(e.to_string())
    }
}

impl From<image::ImageError> for MarketError {
    fn from(e: image::ImageError) -> Self {
        MarketError::ImageLoad(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;
