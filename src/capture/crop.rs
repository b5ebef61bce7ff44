//! Bitmap cropper
//!
//! Maps a selection rectangle (logical pixels) onto a captured frame (device
//! pixels) and extracts that region. The frame is captured at device
//! resolution, so every coordinate is scaled by the device pixel ratio before
//! cropping.

use image::GenericImageView;
use std::io::Cursor;
use thiserror::Error;

use crate::capture::CaptureFrame;
use crate::selection::Rect;

/// Crop failure: the frame could not be decoded or the region is unusable.
#[derive(Debug, Error)]
pub enum CropError {
    #[error("failed to decode capture frame: {0}")]
    Decode(String),
    #[error("crop region lies outside the frame")]
    OutOfBounds,
    #[error("failed to encode cropped image: {0}")]
    Encode(String),
}

/// A cropped region of a capture frame, ready for OCR.
#[derive(Debug, Clone)]
pub struct CroppedImage {
    /// PNG-encoded crop.
    pub png: Vec<u8>,
    /// Crop width in device pixels.
    pub width: u32,
    /// Crop height in device pixels.
    pub height: u32,
}

/// Crop `rect` (logical pixels) out of `frame`, scaling by the frame's device
/// pixel ratio. The output measures `rect.width * dpr` by `rect.height * dpr`
/// device pixels, clamped to the frame bounds.
pub fn crop_frame(frame: &CaptureFrame, rect: &Rect) -> Result<CroppedImage, CropError> {
    let image = frame.decode().map_err(CropError::Decode)?;
    let (frame_w, frame_h) = image.dimensions();

    let dpr = frame.device_pixel_ratio;
    let x = (rect.x * dpr).round().max(0.0) as u32;
    let y = (rect.y * dpr).round().max(0.0) as u32;
    let w = (rect.width * dpr).round() as u32;
    let h = (rect.height * dpr).round() as u32;

    if x >= frame_w || y >= frame_h || w == 0 || h == 0 {
        return Err(CropError::OutOfBounds);
    }
    let w = w.min(frame_w - x);
    let h = h.min(frame_h - y);

    let crop = image.crop_imm(x, y, w, h);

    let mut png = Vec::new();
    crop.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| CropError::Encode(e.to_string()))?;

    Ok(CroppedImage {
        png,
        width: w,
        height: h,
    })
}
