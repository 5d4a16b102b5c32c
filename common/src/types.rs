//! スキャナーの型定義
//!
//! CLIとゲートウェイで共有される型:
//! - Language: UI言語（韓国語 / ベトナム語）
//! - ItemIdentification: 画像認識の出力
//! - PriceResult: 相場検索の出力
//! - TranslationResult: 翻訳の出力
//! - MapSpot: 市場内の地図ピン

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// UI言語
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "KO")]
    Korean,
    #[serde(rename = "VN")]
    Vietnamese,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Korean, Language::Vietnamese];

    /// 言語コード（KO / VN）
    pub fn code(&self) -> &'static str {
        match self {
            Language::Korean => "KO",
            Language::Vietnamese => "VN",
        }
    }

    /// プロンプト内で使う自称名
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Korean => "한국어",
            Language::Vietnamese => "Tiếng Việt",
        }
    }

    /// プロンプト内で使う英語名
    pub fn english_name(&self) -> &'static str {
        match self {
            Language::Korean => "Korean",
            Language::Vietnamese => "Vietnamese",
        }
    }

    /// 翻訳先（もう一方の言語）
    pub fn counterpart(&self) -> Language {
        match self {
            Language::Korean => Language::Vietnamese,
            Language::Vietnamese => Language::Korean,
        }
    }

    /// 発音表記が必要な翻訳先か
    ///
    /// ベトナム語へ訳すときだけ、韓国語の読み仮名を付ける
    pub fn needs_phonetic(&self) -> bool {
        matches!(self, Language::Vietnamese)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ko" | "kr" | "korean" => Ok(Language::Korean),
            "vn" | "vi" | "vietnamese" => Ok(Language::Vietnamese),
            _ => Err(format!("Unknown language: {}. Use ko or vn", s)),
        }
    }
}

/// 画像認識の結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemIdentification {
    pub item_name: String,
}

/// 出典（検索グラウンディングの参照）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// 相場検索の結果
///
/// 価格は数値に変換しない（"80,000 - 120,000" のような文字列のまま保持）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResult {
    pub price_range: String,
    pub unit: String,
    pub negotiation_tip: String,
    pub description: String,
    #[serde(default)]
    pub sources: Vec<GroundingSource>,
}

/// 翻訳結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationResult {
    pub translated_text: String,
    pub phonetic: String,
}

impl TranslationResult {
    /// パース失敗時のフォールバック（入力をそのまま返す）
    pub fn echo(text: &str) -> Self {
        Self {
            translated_text: text.to_string(),
            phonetic: String::new(),
        }
    }
}

/// 地図ピン
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSpot {
    pub title: String,
    pub uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_str() {
        assert_eq!("ko".parse::<Language>().unwrap(), Language::Korean);
        assert_eq!("VN".parse::<Language>().unwrap(), Language::Vietnamese);
        assert_eq!("vi".parse::<Language>().unwrap(), Language::Vietnamese);
        assert!("jp".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_counterpart() {
        assert_eq!(Language::Korean.counterpart(), Language::Vietnamese);
        assert_eq!(Language::Vietnamese.counterpart(), Language::Korean);
        assert!(Language::Korean.counterpart().needs_phonetic());
        assert!(!Language::Vietnamese.counterpart().needs_phonetic());
    }

    #[test]
    fn test_language_serde_code() {
        let json = serde_json::to_string(&Language::Vietnamese).unwrap();
        assert_eq!(json, "\"VN\"");
        let lang: Language = serde_json::from_str("\"KO\"").unwrap();
        assert_eq!(lang, Language::Korean);
    }

    #[test]
    fn test_price_result_serialize() {
        let result = PriceResult {
            price_range: "80,000 - 120,000".to_string(),
            unit: "per box".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_string(&result).expect("シリアライズ失敗");
        assert!(json.contains("\"priceRange\":\"80,000 - 120,000\""));
        assert!(json.contains("\"negotiationTip\":\"\""));
        assert!(json.contains("\"sources\":[]"));
    }

    #[test]
    fn test_translation_result_deserialize_partial() {
        let json = r#"{"translatedText": "깎아주세요."}"#;
        let result: TranslationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.translated_text, "깎아주세요.");
        assert_eq!(result.phonetic, "");
    }

    #[test]
    fn test_translation_echo() {
        let result = TranslationResult::echo("Giảm giá đi.");
        assert_eq!(result.translated_text, "Giảm giá đi.");
        assert!(result.phonetic.is_empty());
    }
}
