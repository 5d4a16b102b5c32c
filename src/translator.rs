//! 翻訳パネル
//!
//! 入力・直近の翻訳結果・通信中フラグ・エラーを持つ。
//! 翻訳結果は履歴を残さず毎回置き換える

use crate::error::{MarketError, Result};
use crate::gateway::MarketGateway;
use crate::session::{Delivery, RequestKind, Ticket};
use dalat_market_common::{messages, Language, TranslationResult};

/// 翻訳の呼び出し内容
#[derive(Debug, Clone)]
pub struct PendingTranslation {
    pub ticket: Ticket,
    pub text: String,
    pub source: Language,
}

#[derive(Debug, Default)]
pub struct TranslatorPanel {
    lang: Language,
    input: String,
    translation: Option<TranslationResult>,
    error_message: Option<String>,
    in_flight: Option<u64>,
    request_id: u64,
}

impl TranslatorPanel {
    pub fn new(lang: Language) -> Self {
        Self {
            lang,
            ..Default::default()
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn translation(&self) -> Option<&TranslationResult> {
        self.translation.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_translating(&self) -> bool {
        self.in_flight.is_some()
    }

    /// 翻訳を開始（空入力・通信中は拒否）
    pub fn begin(&mut self) -> Result<PendingTranslation> {
        if self.is_translating() {
            return Err(MarketError::InvalidTransition {
                state: "Translating".into(),
                action: "translate".into(),
            });
        }
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return Err(MarketError::EmptyInput);
        }

        self.request_id += 1;
        self.in_flight = Some(self.request_id);
        self.error_message = None;
        Ok(PendingTranslation {
            ticket: Ticket {
                id: self.request_id,
                kind: RequestKind::Translate,
            },
            text,
            source: self.lang,
        })
    }

    /// 翻訳の応答を反映
    pub fn apply(&mut self, ticket: Ticket, result: Result<TranslationResult>) -> Delivery {
        if ticket.kind != RequestKind::Translate || self.in_flight != Some(ticket.id) {
            log::warn!("古い翻訳応答を破棄: ticket {}", ticket.id);
            return Delivery::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(translation) => {
                self.translation = Some(translation);
            }
            Err(e) => {
                log::warn!("翻訳失敗: {}", e);
                self.error_message = Some(e.user_message(self.lang, messages(self.lang).translate_failed));
            }
        }
        Delivery::Applied
    }

    /// 入力と結果を消去（通信中の応答は破棄される）
    pub fn clear(&mut self) {
        self.input.clear();
        self.translation = None;
        self.error_message = None;
        self.in_flight = None;
        self.request_id += 1;
    }

    /// 開始 → 翻訳 → 反映 を続けて実行
    pub async fn translate_with(&mut self, gateway: &dyn MarketGateway) -> Result<Delivery> {
        let pending = self.begin()?;
        let result = gateway.translate_text(&pending.text, pending.source).await;
        Ok(self.apply(pending.ticket, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_is_ignored() {
        let mut panel = TranslatorPanel::new(Language::Korean);
        panel.set_input("  ");
        assert!(matches!(panel.begin(), Err(MarketError::EmptyInput)));
        assert!(!panel.is_translating());
    }

    #[test]
    fn test_second_translate_rejected_while_in_flight() {
        let mut panel = TranslatorPanel::new(Language::Korean);
        panel.set_input("깎아주세요");
        let pending = panel.begin().unwrap();
        assert_eq!(pending.source, Language::Korean);
        assert!(panel.is_translating());
        assert!(matches!(panel.begin(), Err(MarketError::InvalidTransition { .. })));
    }

    #[test]
    fn test_result_replaced_not_accumulated() {
        let mut panel = TranslatorPanel::new(Language::Vietnamese);
        for text in ["Bao nhiêu tiền?", "Giảm giá đi."] {
            panel.set_input(text);
            let pending = panel.begin().unwrap();
            panel.apply(pending.ticket, Ok(TranslationResult::echo(text)));
        }
        assert_eq!(panel.translation().unwrap().translated_text, "Giảm giá đi.");
    }

    #[test]
    fn test_failure_sets_localized_error() {
        let mut panel = TranslatorPanel::new(Language::Vietnamese);
        panel.set_input("Bao nhiêu tiền?");
        let pending = panel.begin().unwrap();
        panel.apply(pending.ticket, Err(MarketError::ApiCall("HTTP 503".into())));
        assert_eq!(panel.error_message(), Some("Lỗi dịch: Hãy thử lại."));
        assert!(!panel.is_translating());
    }

    #[test]
    fn test_clear_discards_late_response() {
        let mut panel = TranslatorPanel::new(Language::Korean);
        panel.set_input("얼마예요?");
        let pending = panel.begin().unwrap();
        panel.clear();
        assert_eq!(
            panel.apply(pending.ticket, Ok(TranslationResult::echo("x"))),
            Delivery::Discarded
        );
        assert!(panel.translation().is_none());
    }
}
