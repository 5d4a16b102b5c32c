use crate::camera::CapturedImage;
use dalat_market_common::Language;
use std::fmt;

/// スキャン画面の状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScanState {
    #[default]
    Idle,
    Capturing,
    Identifying,
    Confirming,
    Searching,
    Result,
    ManualInput,
}

impl ScanState {
    pub const ALL: [ScanState; 7] = [
        ScanState::Idle,
        ScanState::Capturing,
        ScanState::Identifying,
        ScanState::Confirming,
        ScanState::Searching,
        ScanState::Result,
        ScanState::ManualInput,
    ];

    /// 利用者操作・応答で1ステップに到達できる状態（リセットを除く）
    pub fn successors(&self) -> &'static [ScanState] {
        match self {
            ScanState::Idle => &[ScanState::Capturing, ScanState::ManualInput],
            ScanState::Capturing => &[ScanState::Identifying, ScanState::Idle],
            ScanState::Identifying => &[ScanState::Confirming, ScanState::Idle],
            ScanState::Confirming => &[ScanState::Confirming, ScanState::Searching, ScanState::Capturing],
            ScanState::Searching => &[ScanState::Result, ScanState::Confirming],
            ScanState::Result => &[],
            ScanState::ManualInput => &[ScanState::ManualInput, ScanState::Searching],
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanState::Idle => "Idle",
            ScanState::Capturing => "Capturing",
            ScanState::Identifying => "Identifying",
            ScanState::Confirming => "Confirming",
            ScanState::Searching => "Searching",
            ScanState::Result => "Result",
            ScanState::ManualInput => "ManualInput",
        };
        write!(f, "{}", name)
    }
}

/// 呼び出しの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Identify,
    PriceLookup,
    Translate,
}

/// 発行した呼び出しの識別子
///
/// 応答を反映するときに現在のリクエストIDと照合する
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub(crate) id: u64,
    pub(crate) kind: RequestKind,
}

/// 応答の反映結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// 状態に反映した
    Applied,
    /// リセット等で古くなったため破棄した
    Discarded,
}

/// 画像認識の呼び出し内容
#[derive(Debug, Clone)]
pub struct PendingIdentify {
    pub ticket: Ticket,
    pub image: CapturedImage,
    pub lang: Language,
}

/// 相場検索の呼び出し内容
#[derive(Debug, Clone)]
pub struct PendingLookup {
    pub ticket: Ticket,
    pub item_name: String,
    pub lang: Language,
}
