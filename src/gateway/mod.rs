//! 外部生成AIとの連携
//!
//! - MarketGateway: 画像認識 / 相場検索 / 翻訳 / 地図ピンの4操作
//! - GeminiGateway: Gemini generateContent への HTTP 実装
//!
//! 各操作は独立した1往復で、状態を持たない

mod gemini;
mod wire;

pub use gemini::GeminiGateway;

use crate::camera::CapturedImage;
use crate::error::Result;
use async_trait::async_trait;
use dalat_market_common::{ItemIdentification, Language, MapSpot, PriceResult, TranslationResult};

#[async_trait]
pub trait MarketGateway: Send + Sync {
    /// 画像に写っている商品名を返す（空にはならない）
    async fn identify_item(&self, image: &CapturedImage, lang: Language) -> Result<ItemIdentification>;

    /// 夜市での相場・単位・値切りのコツ・説明を返す
    async fn estimate_price(&self, item_name: &str, lang: Language) -> Result<PriceResult>;

    /// `source` からもう一方の言語へ翻訳する
    ///
    /// レスポンスが解釈できない場合は入力をそのまま返す（エラーにしない）
    async fn translate_text(&self, text: &str, source: Language) -> Result<TranslationResult>;

    /// 市場内の主要地点（入口・フードコート階段・バイク駐車場）
    async fn find_map_spots(&self, lang: Language) -> Result<Vec<MapSpot>>;

    /// ログ表示用のプロバイダ名
    fn name(&self) -> &str;
}
