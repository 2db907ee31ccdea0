use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("image is not valid base64: {0}")]
    Base64(String),
    #[error("image could not be decoded: {0}")]
    Decode(String),
    #[error("jpeg encoding failed: {0}")]
    Encode(String),
}

/// Accepts either a `data:image/...;base64,` URL or bare base64.
pub fn decode_image(input: &str) -> Result<RgbImage, CodecError> {
    let payload = strip_data_url(input.trim());
    let bytes = BASE64
        .decode(payload)
        .map_err(|e| CodecError::Base64(e.to_string()))?;
    let img = image::load_from_memory(&bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
    Ok(img.to_rgb8())
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(image)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(buf)
}

pub fn jpeg_data_url(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", BASE64.encode(jpeg))
}

fn strip_data_url(input: &str) -> &str {
    match input.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(""),
        None => input,
    }
}
