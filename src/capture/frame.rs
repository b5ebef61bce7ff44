//! Captured frame transport
//!
//! A frame is a full-viewport bitmap at device resolution, carried between
//! contexts as a PNG data URL plus the device pixel ratio it was captured at.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::DynamicImage;
use std::io::Cursor;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// A full-viewport screen frame in transportable form.
#[derive(Debug, Clone)]
pub struct CaptureFrame {
    /// PNG image as a `data:image/png;base64,` URL.
    pub data_url: String,
    /// Frame width in device pixels.
    pub width: u32,
    /// Frame height in device pixels.
    pub height: u32,
    /// Ratio of device pixels to logical pixels at capture time.
    pub device_pixel_ratio: f32,
}

impl CaptureFrame {
    /// Encode an image into a transportable frame.
    pub fn from_image(image: &DynamicImage, device_pixel_ratio: f32) -> anyhow::Result<Self> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;

        Ok(Self {
            data_url: format!("{DATA_URL_PREFIX}{}", BASE64.encode(&png)),
            width: image.width(),
            height: image.height(),
            device_pixel_ratio,
        })
    }

    /// Decode the transported PNG back into an image.
    pub fn decode(&self) -> Result<DynamicImage, String> {
        let encoded = self
            .data_url
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or_else(|| "not a PNG data URL".to_string())?;
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| format!("invalid base64 payload: {e}"))?;
        image::load_from_memory(&bytes).map_err(|e| format!("image decode failed: {e}"))
    }
}
