use super::{CameraDevice, CameraStream, CapturedImage, Facing};
use crate::error::{MarketError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};

const JPEG_QUALITY: u8 = 80;

/// 静止画ファイルをカメラとして扱う
///
/// 向きの指定は無視する（どの向きでも同じ画像を返す）
#[derive(Debug, Clone)]
pub struct FileCamera {
    path: PathBuf,
    max_size: u32,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>, max_size: u32) -> Self {
        Self {
            path: path.into(),
            max_size,
        }
    }
}

impl CameraDevice for FileCamera {
    fn open(&mut self, facing: Facing) -> Result<Box<dyn CameraStream>> {
        if !self.path.is_file() {
            return Err(MarketError::Camera(format!(
                "画像が見つかりません: {}",
                self.path.display()
            )));
        }
        log::debug!("FileCamera open ({:?}): {}", facing, self.path.display());
        Ok(Box::new(FileStream {
            path: self.path.clone(),
            max_size: self.max_size,
        }))
    }
}

struct FileStream {
    path: PathBuf,
    max_size: u32,
}

impl CameraStream for FileStream {
    fn grab_frame(&mut self) -> Result<CapturedImage> {
        load_frame(&self.path, self.max_size)
    }

    fn stop(&mut self) {}
}

fn load_frame(path: &Path, max_size: u32) -> Result<CapturedImage> {
    let img = image::open(path)
        .map_err(|e| MarketError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    encode_frame(&img, max_size)
}

/// 長辺を `max_size` 以下に縮小し、JPEG + Base64 にする
pub fn encode_frame(img: &DynamicImage, max_size: u32) -> Result<CapturedImage> {
    let (w, h) = img.dimensions();
    let longest = w.max(h);

    let resized;
    let img = if max_size > 0 && longest > max_size {
        let ratio = max_size as f64 / longest as f64;
        let new_w = ((w as f64 * ratio).round() as u32).max(1);
        let new_h = ((h as f64 * ratio).round() as u32).max(1);
        resized = img.resize_exact(new_w, new_h, imageops::FilterType::Triangle);
        &resized
    } else {
        img
    };

    let (w, h) = img.dimensions();
    let mut jpeg_buf: Vec<u8> = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_buf, JPEG_QUALITY)
        .encode(img.to_rgb8().as_raw(), w, h, image::ExtendedColorType::Rgb8)?;

    log::debug!("フレーム: {}x{} ({} bytes)", w, h, jpeg_buf.len());
    Ok(CapturedImage::jpeg(BASE64.encode(&jpeg_buf)))
}
