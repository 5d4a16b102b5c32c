//! ダラット夜市 AI価格スキャナー
//!
//! - gateway: 外部生成AI（画像認識・相場・翻訳・地図ピン）
//! - session: 撮影 → 認識 → 確認 → 相場 の状態機械
//! - camera: スコープ付きカメラセッション
//! - translator: 翻訳パネル

pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod interactive;
pub mod session;
pub mod translator;

pub use camera::{CameraDevice, CameraSession, CameraStream, CapturedImage, Facing, FileCamera};
pub use config::Config;
pub use error::{MarketError, Result};
pub use gateway::{GeminiGateway, MarketGateway};
pub use session::{Delivery, ScanSession, ScanState};
pub use translator::TranslatorPanel;
