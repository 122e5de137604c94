use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::RgbImage;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("image payload is empty")]
    Empty,
    #[error("invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unreadable image: {0}")]
    Image(#[from] image::ImageError),
}

/// Returns the base64 part of a payload, dropping a `data:image/...;base64,` prefix.
pub fn strip_data_url(payload: &str) -> &str {
    match payload.split(',').nth(1) {
        Some(body) => body,
        None => payload,
    }
}

/// Decodes a base64 or data-URL image into an RGB frame.
pub fn decode_frame(payload: &str) -> Result<RgbImage, DecodeError> {
    let encoded = strip_data_url(payload.trim()).trim();
    if encoded.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = STANDARD.decode(encoded)?;
    let frame = image::load_from_memory(&bytes)?.to_rgb8();

    tracing::debug!(
        width = frame.width(),
        height = frame.height(),
        bytes = bytes.len(),
        "decoded frame"
    );
    Ok(frame)
}
