//! カメラ入力
//!
//! - CameraDevice / CameraStream: 端末カメラの抽象
//! - CameraSession: 撮影中だけ保持するスコープ付きリソース（Dropで必ず解放）
//! - FileCamera: ディスク上の静止画をフレームとして返す実装

mod file;

pub use file::{encode_frame, FileCamera};

use crate::error::{MarketError, Result};

/// 要求するカメラの向き
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// 背面カメラ
    Environment,
    /// 向きを問わない（フォールバック）
    Any,
}

/// 撮影した1フレーム（Base64エンコード済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub mime_type: String,
    pub data: String,
}

impl CapturedImage {
    pub fn jpeg(data: impl Into<String>) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            data: data.into(),
        }
    }
}

/// 開いているカメラストリーム
pub trait CameraStream: Send {
    /// 現在のフレームを取得
    fn grab_frame(&mut self) -> Result<CapturedImage>;

    /// 全トラックを停止
    fn stop(&mut self);
}

/// カメラデバイス
pub trait CameraDevice: Send {
    fn open(&mut self, facing: Facing) -> Result<Box<dyn CameraStream>>;
}

/// スコープ付きカメラセッション
///
/// 取得から解放までを1つの値で表す。`capture_frame` / `release` / Drop の
/// どの経路でもストリームは停止される
pub struct CameraSession {
    stream: Option<Box<dyn CameraStream>>,
    facing: Facing,
}

impl CameraSession {
    /// 背面カメラを要求し、失敗したら向きを問わず再要求する
    pub fn acquire(device: &mut dyn CameraDevice) -> Result<Self> {
        match device.open(Facing::Environment) {
            Ok(stream) => Ok(Self::new(stream, Facing::Environment)),
            Err(first) => {
                log::warn!("背面カメラを開けません、任意のカメラで再試行: {}", first);
                let stream = device
                    .open(Facing::Any)
                    .map_err(|e| MarketError::Camera(format!("{} / {}", first, e)))?;
                Ok(Self::new(stream, Facing::Any))
            }
        }
    }

    fn new(stream: Box<dyn CameraStream>, facing: Facing) -> Self {
        log::debug!("カメラ取得: {:?}", facing);
        Self {
            stream: Some(stream),
            facing,
        }
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// フレームを1枚撮影し、カメラを解放する
    pub fn capture_frame(mut self) -> Result<CapturedImage> {
        let mut stream = self
            .stream
            .take()
            .ok_or_else(|| MarketError::Camera("カメラは解放済みです".into()))?;
        let frame = stream.grab_frame();
        stream.stop();
        log::debug!("カメラ解放（撮影後）");
        frame
    }

    /// 撮影せずに解放する
    pub fn release(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            log::debug!("カメラ解放");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("facing", &self.facing)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingStream {
        active: Arc<AtomicUsize>,
        stopped: bool,
    }

    impl CameraStream for CountingStream {
        fn grab_frame(&mut self) -> Result<CapturedImage> {
            Ok(CapturedImage::jpeg("ZnJhbWU="))
        }

        fn stop(&mut self) {
            if !self.stopped {
                self.stopped = true;
                self.active.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    struct FakeDevice {
        active: Arc<AtomicUsize>,
        deny_environment: bool,
        deny_all: bool,
        requests: Vec<Facing>,
    }

    impl FakeDevice {
        fn new() -> Self {
            Self {
                active: Arc::new(AtomicUsize::new(0)),
                deny_environment: false,
                deny_all: false,
                requests: Vec::new(),
            }
        }
    }

    impl CameraDevice for FakeDevice {
        fn open(&mut self, facing: Facing) -> Result<Box<dyn CameraStream>> {
            self.requests.push(facing);
            if self.deny_all || (self.deny_environment && facing == Facing::Environment) {
                return Err(MarketError::Camera("permission denied".into()));
            }
            self.active.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(CountingStream {
                active: Arc::clone(&self.active),
                stopped: false,
            }))
        }
    }

    #[test]
    fn test_acquire_environment_first() {
        let mut device = FakeDevice::new();
        let session = CameraSession::acquire(&mut device).unwrap();
        assert_eq!(session.facing(), Facing::Environment);
        assert_eq!(device.requests, vec![Facing::Environment]);
    }

    #[test]
    fn test_acquire_falls_back_to_any() {
        let mut device = FakeDevice::new();
        device.deny_environment = true;
        let session = CameraSession::acquire(&mut device).unwrap();
        assert_eq!(session.facing(), Facing::Any);
        assert_eq!(device.requests, vec![Facing::Environment, Facing::Any]);
    }

    #[test]
    fn test_acquire_denied() {
        let mut device = FakeDevice::new();
        device.deny_all = true;
        let result = CameraSession::acquire(&mut device);
        assert!(matches!(result, Err(MarketError::Camera(_))));
        assert_eq!(device.active.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_capture_releases_stream() {
        let mut device = FakeDevice::new();
        let session = CameraSession::acquire(&mut device).unwrap();
        assert_eq!(device.active.load(Ordering::SeqCst), 1);

        let frame = session.capture_frame().unwrap();
        assert_eq!(frame.mime_type, "image/jpeg");
        assert_eq!(device.active.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_releases_stream() {
        let mut device = FakeDevice::new();
        {
            let _session = CameraSession::acquire(&mut device).unwrap();
            assert_eq!(device.active.load(Ordering::SeqCst), 1);
        }
        assert_eq!(device.active.load(Ordering::SeqCst), 0);
    }
}
