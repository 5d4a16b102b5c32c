//! プロンプト生成モジュール
//!
//! ゲートウェイから外部モデルへ送るプロンプト:
//! - build_identify_prompt: 画像認識（商品名だけを短く）
//! - build_price_prompt: 相場検索（PRICE/UNIT/TIP/DESC のラベル行形式）
//! - build_translate_prompt: 翻訳（JSONオブジェクト）
//! - build_map_spots_prompt: 市場内の地図ピン

use crate::types::Language;

/// ダラット夜市の座標（地図グラウンディング用）
pub const MARKET_LATITUDE: f64 = 11.942475;
pub const MARKET_LONGITUDE: f64 = 108.437025;

/// 画像認識プロンプト生成
///
/// 回答を商品名だけに限定し、強調記号（**）を禁止する
pub fn build_identify_prompt(lang: Language) -> String {
    format!(
        "당신은 베트남 달랏 야시장의 전문가 가이드입니다. 이 이미지 속의 주요 음식이나 기념품이 무엇인지 {}로 답변하세요. 오직 상품 이름만 짧게 답변하세요. 강조 표시(**)는 사용하지 마세요.",
        lang.native_name()
    )
}

/// 相場検索プロンプト生成
///
/// 出力形式はラベル行（PRICE / UNIT / TIP / DESC）に固定する。
/// 検索ツールと併用するため JSON 出力は要求しない
pub fn build_price_prompt(item_name: &str, lang: Language) -> String {
    let item = item_name.trim();
    let lang_text = lang.native_name();

    format!(
        r#"Provide current market price info for "{item}" in Dalat Night Market (Dalat, Vietnam).
Language: {lang_text}. Do NOT use markdown bold (**).

Please provide the info in this exact format:
PRICE: [number range like 20,000 - 40,000 or 50,000]
UNIT: [e.g. per kg, per piece]
TIP: [one short bargaining tip]
DESC: [brief description about this item]"#
    )
}

/// 翻訳プロンプト生成
///
/// # Arguments
/// * `text` - 翻訳対象
/// * `source` - 入力側の言語（翻訳先はもう一方）
pub fn build_translate_prompt(text: &str, source: Language) -> String {
    let target = source.counterpart();
    let phonetic_rule = if target.needs_phonetic() {
        r#"Translating to Vietnamese: you MUST include a field "phonetic" which is the Korean pronunciation of the Vietnamese text."#
    } else {
        r#"Leave "phonetic" as an empty string."#
    };

    format!(
        r#"Translate to {target_name}.
{phonetic_rule}
Return JSON: {{"translatedText": "...", "phonetic": "..."}}
Text: "{text}""#,
        target_name = target.english_name(),
        text = text.replace('"', "\\\""),
    )
}

/// 地図ピン検索プロンプト生成
pub fn build_map_spots_prompt() -> String {
    "Find 3 key specific location pins within Dalat Night Market (Chợ Đêm Đà Lạt): The entrance area, the main food court steps, and the motorcycle parking area nearby.".to_string()
}
