//! APIレスポンスパーサー
//!
//! 外部モデルの半構造化テキストを型付きの結果へ変換する。
//! どの関数も欠けた項目は既定値で埋め、空フィールドを返さない

use crate::error::{Error, Result};
use crate::strings::{self, DEFAULT_PRICE_RANGE, DEFAULT_SOURCE_TITLE, DEFAULT_SOURCE_URI};
use crate::types::{GroundingSource, ItemIdentification, Language, MapSpot, PriceResult, TranslationResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PRICE_RE: Regex = label_regex("PRICE");
    static ref UNIT_RE: Regex = label_regex("UNIT");
    static ref TIP_RE: Regex = label_regex("TIP");
    static ref DESC_RE: Regex = label_regex("DESC");
}

/// ラベル（大文字小文字を区別しない）に続く同じ行の値を取る
///
/// 番号付きリスト・見出し・文中のラベルも拾う
fn label_regex(label: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}[ \t]*:[ \t]*([^\r\n]*)", label))
        .expect("label regex is valid")
}

/// パース結果
///
/// 失敗時は生テキストを保持し、呼び出し側で扱いを決める
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    ParseFailed(String),
}

impl<T> ParseOutcome<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }

    /// 失敗を `Error::Parse` に変換
    pub fn into_result(self) -> Result<T> {
        match self {
            ParseOutcome::Parsed(value) => Ok(value),
            ParseOutcome::ParseFailed(raw) => {
                let preview: String = raw.chars().take(80).collect();
                Err(Error::Parse(format!("レスポンスを解釈できません: {:?}", preview)))
            }
        }
    }

    /// 失敗時にフォールバック値を使う
    pub fn unwrap_or_else(self, fallback: impl FnOnce(String) -> T) -> T {
        match self {
            ParseOutcome::Parsed(value) => value,
            ParseOutcome::ParseFailed(raw) => fallback(raw),
        }
    }
}

/// APIレスポンスからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...} オブジェクト
/// 3. エラー
///
/// # Examples
/// ```
/// use dalat_market_common::extract_json;
///
/// let response = "result: {\"translatedText\": \"Xin chào\"}";
/// let json = extract_json(response).unwrap();
/// assert!(json.starts_with('{'));
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 強調記号（**）を取り除く
pub fn strip_emphasis(text: &str) -> String {
    text.replace("**", "")
}

/// 画像認識レスポンスをパース
///
/// 空レスポンスは言語ごとの「不明」プレースホルダにする
pub fn parse_item_name(response: &str, lang: Language) -> ItemIdentification {
    let name = strip_emphasis(response).trim().to_string();
    let item_name = if name.is_empty() {
        strings::messages(lang).unknown_item.to_string()
    } else {
        name
    };
    ItemIdentification { item_name }
}

fn capture_label(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// 相場検索レスポンスをパース（ラベル行形式）
///
/// ```text
/// PRICE: 80,000 - 120,000
/// UNIT: per box
/// TIP: ...
/// DESC: ...
/// ```
///
/// 欠けた項目は既定値で埋める。DESC が無い場合は本文の最初の行を使う。
/// 本文そのものが空なら `ParseFailed`
///
/// # Arguments
/// * `response` - モデルの生テキスト
/// * `item_name` - 検索した商品名（説明文の最終フォールバック）
/// * `lang` - UI言語
pub fn parse_price_response(response: &str, item_name: &str, lang: Language) -> ParseOutcome<PriceResult> {
    let text = strip_emphasis(response);
    if text.trim().is_empty() {
        return ParseOutcome::ParseFailed(response.to_string());
    }

    let messages = strings::messages(lang);
    let first_line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string);

    let description = capture_label(&DESC_RE, &text)
        .or(first_line)
        .unwrap_or_else(|| item_name.trim().to_string());

    ParseOutcome::Parsed(PriceResult {
        price_range: capture_label(&PRICE_RE, &text).unwrap_or_else(|| DEFAULT_PRICE_RANGE.to_string()),
        unit: capture_label(&UNIT_RE, &text).unwrap_or_else(|| messages.unknown_unit.to_string()),
        negotiation_tip: capture_label(&TIP_RE, &text).unwrap_or_else(|| messages.default_tip.to_string()),
        description,
        sources: Vec::new(),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// グラウンディング出典を作る（欠損は "Ref" / "#"）
pub fn grounding_source(title: Option<&str>, uri: Option<&str>) -> GroundingSource {
    GroundingSource {
        title: non_empty(title).unwrap_or(DEFAULT_SOURCE_TITLE).to_string(),
        uri: non_empty(uri).unwrap_or(DEFAULT_SOURCE_URI).to_string(),
    }
}

/// 地図ピンを作る（URI が無いピンは捨てる）
pub fn map_spot(title: Option<&str>, uri: Option<&str>, lang: Language) -> Option<MapSpot> {
    let uri = non_empty(uri)?;
    Some(MapSpot {
        title: non_empty(title)
            .unwrap_or(strings::messages(lang).map_spot_title)
            .to_string(),
        uri: uri.to_string(),
    })
}

/// 翻訳レスポンスをパース（JSON）
///
/// JSONとして読めない場合は `ParseFailed`
pub fn try_parse_translation(response: &str) -> ParseOutcome<TranslationResult> {
    let parsed = extract_json(response)
        .ok()
        .and_then(|json| serde_json::from_str::<TranslationResult>(json.trim()).ok());

    match parsed {
        Some(result) => ParseOutcome::Parsed(result),
        None => ParseOutcome::ParseFailed(response.to_string()),
    }
}

/// 翻訳レスポンスをパースし、失敗時は入力をそのまま返す
///
/// # Arguments
/// * `response` - モデルの生テキスト
/// * `input` - 翻訳元テキスト
/// * `target` - 翻訳先の言語（発音表記はベトナム語向けだけ残す）
pub fn parse_translation_response(response: &str, input: &str, target: Language) -> TranslationResult {
    let mut result = try_parse_translation(response).unwrap_or_else(|_| TranslationResult::echo(input));

    if result.translated_text.trim().is_empty() {
        result.translated_text = input.to_string();
    }

    result.phonetic = if target.needs_phonetic() {
        result.phonetic.replace('"', "").trim().to_string()
    } else {
        String::new()
    };

    result
}
