//! スキャンセッション（状態機械）
//!
//! Idle → Capturing → Identifying → Confirming → Searching → Result
//! と、手入力の ManualInput → Searching を扱う。
//!
//! 外部呼び出しは `begin`（状態遷移 + 呼び出し内容の発行）と
//! `apply`（応答の反映）に分かれる。リセット後に届いた古い応答は
//! チケットのIDが一致しないため破棄される。

mod types;

pub use types::{Delivery, PendingIdentify, PendingLookup, RequestKind, ScanState, Ticket};

use crate::camera::{CameraDevice, CameraSession, CapturedImage};
use crate::error::{MarketError, Result};
use crate::gateway::MarketGateway;
use dalat_market_common::{messages, ItemIdentification, Language, PriceResult};

#[derive(Debug)]
pub struct ScanSession {
    lang: Language,
    state: ScanState,
    camera: Option<CameraSession>,
    captured_image: Option<CapturedImage>,
    item_name: String,
    price_result: Option<PriceResult>,
    error_message: Option<String>,
    request_id: u64,
}

impl ScanSession {
    pub fn new(lang: Language) -> Self {
        Self {
            lang,
            state: ScanState::Idle,
            camera: None,
            captured_image: None,
            item_name: String::new(),
            price_result: None,
            error_message: None,
            request_id: 0,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    /// 言語切替（以降のプロンプトとメッセージに反映）
    pub fn set_language(&mut self, lang: Language) {
        self.lang = lang;
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn captured_image(&self) -> Option<&CapturedImage> {
        self.captured_image.as_ref()
    }

    pub fn price_result(&self) -> Option<&PriceResult> {
        self.price_result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn camera_active(&self) -> bool {
        self.camera.as_ref().is_some_and(|c| c.is_active())
    }

    fn transition(&mut self, to: ScanState) {
        debug_assert!(
            to == ScanState::Idle || self.state.successors().contains(&to),
            "不正な遷移: {} → {}",
            self.state,
            to
        );
        if self.state != to {
            log::info!("スキャン状態: {} → {}", self.state, to);
        }
        self.state = to;
    }

    fn require(&self, expected: &[ScanState], action: &str) -> Result<()> {
        if expected.contains(&self.state) {
            Ok(())
        } else {
            Err(MarketError::InvalidTransition {
                state: self.state.to_string(),
                action: action.to_string(),
            })
        }
    }

    fn next_ticket(&mut self, kind: RequestKind) -> Ticket {
        self.request_id += 1;
        Ticket {
            id: self.request_id,
            kind,
        }
    }

    fn is_current(&self, ticket: Ticket, expected: ScanState) -> bool {
        let current = ticket.id == self.request_id && self.state == expected;
        if !current {
            log::warn!(
                "古い応答を破棄: {:?} (ticket {}, current {}, state {})",
                ticket.kind,
                ticket.id,
                self.request_id,
                self.state
            );
        }
        current
    }

    fn release_camera(&mut self) {
        if let Some(camera) = self.camera.take() {
            camera.release();
        }
    }

    /// カメラを開いて Capturing へ
    ///
    /// 失敗時は Idle に戻り、エラーメッセージを残す
    fn open_camera(&mut self, device: &mut dyn CameraDevice) -> Result<()> {
        self.transition(ScanState::Capturing);
        match CameraSession::acquire(device) {
            Ok(camera) => {
                log::info!("カメラ使用中: {:?}", camera.facing());
                self.camera = Some(camera);
                Ok(())
            }
            Err(e) => {
                log::warn!("カメラ取得失敗: {}", e);
                self.error_message = Some(e.user_message(self.lang, messages(self.lang).camera_failed));
                self.transition(ScanState::Idle);
                Err(e)
            }
        }
    }

    /// Idle → Capturing（カメラ取得）
    pub fn choose_camera(&mut self, device: &mut dyn CameraDevice) -> Result<()> {
        self.require(&[ScanState::Idle], "choose camera")?;
        self.error_message = None;
        self.open_camera(device)
    }

    /// Idle → ManualInput
    pub fn choose_manual(&mut self) -> Result<()> {
        self.require(&[ScanState::Idle], "choose manual entry")?;
        self.error_message = None;
        self.transition(ScanState::ManualInput);
        Ok(())
    }

    /// Capturing → Identifying（撮影してカメラを解放）
    pub fn shutter(&mut self) -> Result<PendingIdentify> {
        self.require(&[ScanState::Capturing], "shutter")?;

        let frame = match self.camera.take() {
            Some(camera) => camera.capture_frame(),
            None => Err(MarketError::Camera("カメラが開いていません".into())),
        };

        let image = match frame {
            Ok(image) => image,
            Err(e) => {
                self.error_message = Some(e.user_message(self.lang, messages(self.lang).camera_failed));
                self.transition(ScanState::Idle);
                return Err(e);
            }
        };

        self.captured_image = Some(image.clone());
        self.transition(ScanState::Identifying);
        Ok(PendingIdentify {
            ticket: self.next_ticket(RequestKind::Identify),
            image,
            lang: self.lang,
        })
    }

    /// 画像認識の応答を反映
    ///
    /// 成功: Confirming（商品名を編集可能に）/ 失敗: Idle（撮り直し）
    pub fn apply_identify(&mut self, ticket: Ticket, result: Result<ItemIdentification>) -> Delivery {
        if ticket.kind != RequestKind::Identify || !self.is_current(ticket, ScanState::Identifying) {
            return Delivery::Discarded;
        }

        match result {
            Ok(identification) => {
                self.item_name = identification.item_name;
                self.error_message = None;
                self.transition(ScanState::Confirming);
            }
            Err(e) => {
                log::warn!("画像認識失敗: {}", e);
                self.error_message = Some(e.user_message(self.lang, messages(self.lang).identify_failed));
                self.captured_image = None;
                self.item_name.clear();
                self.transition(ScanState::Idle);
            }
        }
        Delivery::Applied
    }

    /// 商品名の編集（通信なし）
    pub fn edit_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.require(&[ScanState::Confirming, ScanState::ManualInput], "edit name")?;
        self.item_name = name.into();
        Ok(())
    }

    /// Confirming → Capturing（画像を破棄して撮り直し）
    pub fn retake(&mut self, device: &mut dyn CameraDevice) -> Result<()> {
        self.require(&[ScanState::Confirming], "retake")?;
        self.captured_image = None;
        self.error_message = None;
        self.open_camera(device)
    }

    fn begin_lookup(&mut self, from: ScanState, action: &str) -> Result<PendingLookup> {
        self.require(&[from], action)?;
        let item_name = self.item_name.trim().to_string();
        if item_name.is_empty() {
            return Err(MarketError::EmptyInput);
        }

        self.error_message = None;
        self.transition(ScanState::Searching);
        Ok(PendingLookup {
            ticket: self.next_ticket(RequestKind::PriceLookup),
            item_name,
            lang: self.lang,
        })
    }

    /// Confirming → Searching
    pub fn confirm_search(&mut self) -> Result<PendingLookup> {
        self.begin_lookup(ScanState::Confirming, "confirm search")
    }

    /// ManualInput → Searching
    pub fn submit_manual(&mut self) -> Result<PendingLookup> {
        self.begin_lookup(ScanState::ManualInput, "submit name")
    }

    /// 相場検索の応答を反映
    ///
    /// 成功: Result / 失敗: Confirming（商品名はそのまま、再検索可能）
    pub fn apply_price(&mut self, ticket: Ticket, result: Result<PriceResult>) -> Delivery {
        if ticket.kind != RequestKind::PriceLookup || !self.is_current(ticket, ScanState::Searching) {
            return Delivery::Discarded;
        }

        match result {
            Ok(price) => {
                self.price_result = Some(price);
                self.error_message = None;
                self.transition(ScanState::Result);
            }
            Err(e) => {
                log::warn!("相場検索失敗: {}", e);
                self.error_message = Some(e.user_message(self.lang, messages(self.lang).price_failed));
                self.transition(ScanState::Confirming);
            }
        }
        Delivery::Applied
    }

    /// どの状態からでも Idle へ（カメラ解放・一時データ消去）
    ///
    /// 応答待ちの呼び出しはこの時点で古くなる
    pub fn reset(&mut self) {
        self.release_camera();
        self.captured_image = None;
        self.item_name.clear();
        self.price_result = None;
        self.error_message = None;
        self.request_id += 1;
        self.transition(ScanState::Idle);
    }

    /// 撮影 → 画像認識 → 反映 を続けて実行
    pub async fn capture_and_identify(&mut self, gateway: &dyn MarketGateway) -> Result<Delivery> {
        let pending = self.shutter()?;
        log::debug!("画像認識: {} ({} bytes base64)", gateway.name(), pending.image.data.len());
        let result = gateway.identify_item(&pending.image, pending.lang).await;
        Ok(self.apply_identify(pending.ticket, result))
    }

    /// 現在の状態（Confirming / ManualInput）から相場検索を実行
    pub async fn search(&mut self, gateway: &dyn MarketGateway) -> Result<Delivery> {
        let pending = match self.state {
            ScanState::ManualInput => self.submit_manual()?,
            _ => self.confirm_search()?,
        };
        log::debug!("相場検索: {} \"{}\"", gateway.name(), pending.item_name);
        let result = gateway.estimate_price(&pending.item_name, pending.lang).await;
        Ok(self.apply_price(pending.ticket, result))
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identified(name: &str) -> Result<ItemIdentification> {
        Ok(ItemIdentification {
            item_name: name.to_string(),
        })
    }

    fn session_in_identifying() -> (ScanSession, Ticket) {
        let mut session = ScanSession::new(Language::Korean);
        session.state = ScanState::Identifying;
        let ticket = session.next_ticket(RequestKind::Identify);
        (session, ticket)
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = ScanSession::default();
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(session.item_name(), "");
        assert!(session.price_result().is_none());
        assert!(session.error_message().is_none());
        assert!(!session.camera_active());
    }

    #[test]
    fn test_manual_entry_from_idle_only() {
        let mut session = ScanSession::default();
        session.choose_manual().unwrap();
        assert_eq!(session.state(), ScanState::ManualInput);

        let err = session.choose_manual().unwrap_err();
        assert!(matches!(err, MarketError::InvalidTransition { .. }));
    }

    #[test]
    fn test_shutter_requires_capturing() {
        let mut session = ScanSession::default();
        assert!(matches!(session.shutter(), Err(MarketError::InvalidTransition { .. })));
        assert_eq!(session.state(), ScanState::Idle);
    }

    #[test]
    fn test_apply_identify_success() {
        let (mut session, ticket) = session_in_identifying();
        assert_eq!(session.apply_identify(ticket, identified("Artichoke Tea")), Delivery::Applied);
        assert_eq!(session.state(), ScanState::Confirming);
        assert_eq!(session.item_name(), "Artichoke Tea");
    }

    #[test]
    fn test_apply_identify_failure_returns_idle() {
        let (mut session, ticket) = session_in_identifying();
        session.apply_identify(ticket, Err(MarketError::ApiCall("HTTP 500".into())));
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(session.error_message(), Some("인식 실패: 다시 시도해주세요."));
        assert!(session.captured_image().is_none());
        assert_eq!(session.item_name(), "");
    }

    #[test]
    fn test_apply_identify_after_reset_is_discarded() {
        let (mut session, ticket) = session_in_identifying();
        session.reset();
        assert_eq!(session.apply_identify(ticket, identified("Artichoke Tea")), Delivery::Discarded);
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(session.item_name(), "");
    }

    #[test]
    fn test_apply_with_wrong_kind_is_discarded() {
        let (mut session, ticket) = session_in_identifying();
        let price = PriceResult::default();
        assert_eq!(session.apply_price(ticket, Ok(price)), Delivery::Discarded);
        assert_eq!(session.state(), ScanState::Identifying);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut session = ScanSession::default();
        session.choose_manual().unwrap();
        session.edit_name("   ").unwrap();
        assert!(matches!(session.submit_manual(), Err(MarketError::EmptyInput)));
        assert_eq!(session.state(), ScanState::ManualInput);
    }

    #[test]
    fn test_overlapping_lookup_is_rejected() {
        let mut session = ScanSession::default();
        session.choose_manual().unwrap();
        session.edit_name("Dâu tây").unwrap();
        let pending = session.submit_manual().unwrap();
        assert_eq!(pending.item_name, "Dâu tây");
        assert_eq!(session.state(), ScanState::Searching);

        assert!(matches!(session.confirm_search(), Err(MarketError::InvalidTransition { .. })));
        assert!(matches!(session.submit_manual(), Err(MarketError::InvalidTransition { .. })));
        assert!(matches!(session.edit_name("x"), Err(MarketError::InvalidTransition { .. })));
    }

    #[test]
    fn test_price_failure_keeps_name_with_setup_message() {
        let mut session = ScanSession::new(Language::Vietnamese);
        session.choose_manual().unwrap();
        session.edit_name("Trà Atiso").unwrap();
        let pending = session.submit_manual().unwrap();

        session.apply_price(pending.ticket, Err(MarketError::NotConfigured("HTTP 403".into())));
        assert_eq!(session.state(), ScanState::Confirming);
        assert_eq!(session.item_name(), "Trà Atiso");
        assert_eq!(session.error_message(), Some("Cần thiết lập kết nối."));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = ScanSession::default();
        session.choose_manual().unwrap();
        session.edit_name("Bánh tráng nướng").unwrap();
        let pending = session.submit_manual().unwrap();
        session.apply_price(
            pending.ticket,
            Ok(PriceResult {
                price_range: "15,000 - 25,000".into(),
                ..Default::default()
            }),
        );
        assert_eq!(session.state(), ScanState::Result);

        session.reset();
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(session.item_name(), "");
        assert!(session.price_result().is_none());
        assert!(session.error_message().is_none());
        assert!(session.captured_image().is_none());
    }
}
