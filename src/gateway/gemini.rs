//! Gemini API連携
//!
//! プロンプト生成とレスポンス解釈は dalat_market_common を使う

use super::wire::{EmptyObject, GenerateRequest, GenerateResponse, InlineData, Part, Tool};
use super::MarketGateway;
use crate::camera::CapturedImage;
use crate::config::{Config, DEFAULT_API_BASE_URL};
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use dalat_market_common::prompts::{MARKET_LATITUDE, MARKET_LONGITUDE};
use dalat_market_common::{
    build_identify_prompt, build_map_spots_prompt, build_price_prompt, build_translate_prompt,
    grounding_source, map_spot, parse_item_name, parse_price_response, parse_translation_response,
    try_parse_translation, ItemIdentification, Language, MapSpot, PriceResult, TranslationResult,
};
use reqwest::Client;
use std::time::Duration;

pub struct GeminiGateway {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    maps_model: String,
}

impl GeminiGateway {
    /// APIキーを受け取って作成（空キーは `MissingApiKey`）
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let defaults = Config::default();
        Self::build(
            api_key.into(),
            DEFAULT_API_BASE_URL.to_string(),
            defaults.model,
            defaults.maps_model,
            Client::new(),
        )
    }

    /// 設定ファイル・環境変数から作成
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Self::build(
            config.get_api_key()?,
            config.api_base_url.clone(),
            config.model.clone(),
            config.maps_model.clone(),
            client,
        )
    }

    fn build(api_key: String, base_url: String, model: String, maps_model: String, client: Client) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(MarketError::MissingApiKey);
        }
        Ok(Self {
            client,
            api_key,
            base_url,
            model,
            maps_model,
        })
    }

    /// エンドポイントを差し替える（プロキシ・テスト用）
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    /// generateContent 呼び出し（共通処理）
    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = self.endpoint(model);
        log::debug!("Gemini呼び出し: {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| MarketError::ApiCall(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".into());
            let err = MarketError::from_http_failure(status.as_u16(), &body);
            log::warn!("Gemini APIエラー: {}", err);
            return Err(err);
        }

        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| MarketError::ApiParse(format!("generateContent: {}", e)))?;
        log::debug!("Gemini応答: {} chars", body.len());
        Ok(parsed)
    }
}

#[async_trait]
impl MarketGateway for GeminiGateway {
    async fn identify_item(&self, image: &CapturedImage, lang: Language) -> Result<ItemIdentification> {
        let request = GenerateRequest::new(vec![
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                },
            },
            Part::Text {
                text: build_identify_prompt(lang),
            },
        ]);

        let response = self.generate(&self.model, &request).await?;
        Ok(parse_item_name(&response.text(), lang))
    }

    async fn estimate_price(&self, item_name: &str, lang: Language) -> Result<PriceResult> {
        let request = GenerateRequest::new(vec![Part::Text {
            text: build_price_prompt(item_name, lang),
        }])
        .with_tool(Tool::GoogleSearch(EmptyObject::default()));

        let response = self.generate(&self.model, &request).await?;
        let mut result = parse_price_response(&response.text(), item_name, lang).into_result()?;

        result.sources = response
            .grounding_chunks()
            .iter()
            .map(|chunk| {
                let web = chunk.web.as_ref();
                grounding_source(
                    web.and_then(|w| w.title.as_deref()),
                    web.and_then(|w| w.uri.as_deref()),
                )
            })
            .collect();
        Ok(result)
    }

    async fn translate_text(&self, text: &str, source: Language) -> Result<TranslationResult> {
        let request = GenerateRequest::new(vec![Part::Text {
            text: build_translate_prompt(text, source),
        }])
        .with_json_response();

        let response = self.generate(&self.model, &request).await?;
        let raw = response.text();
        if !try_parse_translation(&raw).is_parsed() {
            log::warn!("翻訳レスポンスを解釈できず入力を返します ({} chars)", raw.len());
        }
        Ok(parse_translation_response(&raw, text, source.counterpart()))
    }

    async fn find_map_spots(&self, lang: Language) -> Result<Vec<MapSpot>> {
        let request = GenerateRequest::new(vec![Part::Text {
            text: build_map_spots_prompt(),
        }])
        .with_tool(Tool::GoogleMaps(EmptyObject::default()))
        .with_location(MARKET_LATITUDE, MARKET_LONGITUDE);

        let response = self.generate(&self.maps_model, &request).await?;
        Ok(response
            .grounding_chunks()
            .iter()
            .filter_map(|chunk| chunk.maps.as_ref())
            .filter_map(|maps| map_spot(maps.title.as_deref(), maps.uri.as_deref(), lang))
            .collect())
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
