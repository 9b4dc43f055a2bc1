// src/services/avatar.rs
// DOCUMENTATION: Avatar image processing
// PURPOSE: Decode an uploaded image, crop it to a square and re-encode it as PNG

use std::io::Cursor;

use image::imageops::FilterType;
use image::io::{Limits, Reader};
use image::{GenericImageView, ImageOutputFormat};

use crate::errors::HubError;

/// Width and height of every stored avatar
pub const AVATAR_SIZE: u32 = 256;
pub const AVATAR_CONTENT_TYPE: &str = "image/png";
/// Largest accepted upload body
pub const MAX_AVATAR_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// Uploads wider or taller than this are rejected
pub const MAX_SOURCE_DIMENSION: u32 = 4096;

/// Resize an uploaded PNG, JPEG, GIF or WebP to an AVATAR_SIZE square PNG.
/// The image is scaled to cover the square and the overflow is cropped.
pub fn resize_avatar(bytes: &[u8]) -> Result<Vec<u8>, HubError> {
    if bytes.is_empty() {
        return Err(HubError::InvalidInput("Avatar upload is empty".to_string()));
    }

    let unreadable = |e: image::ImageError| {
        log::warn!("Rejected avatar upload: {}", e);
        HubError::InvalidInput("Avatar must be a PNG, JPEG, GIF or WebP image".to_string())
    };

    let mut reader = Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| unreadable(e.into()))?;
    if reader.format().is_none() {
        return Err(HubError::InvalidInput(
            "Avatar must be a PNG, JPEG, GIF or WebP image".to_string(),
        ));
    }

    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_SOURCE_DIMENSION);
    limits.max_image_height = Some(MAX_SOURCE_DIMENSION);
    reader.limits(limits);

    let source = reader.decode().map_err(unreadable)?;
    let (width, height) = source.dimensions();
    if width > MAX_SOURCE_DIMENSION || height > MAX_SOURCE_DIMENSION {
        return Err(HubError::InvalidInput(format!(
            "Avatar must be at most {}x{} pixels",
            MAX_SOURCE_DIMENSION, MAX_SOURCE_DIMENSION
        )));
    }

    let avatar = source.resize_to_fill(AVATAR_SIZE, AVATAR_SIZE, FilterType::Lanczos3);

    let mut out = Cursor::new(Vec::new());
    avatar
        .write_to(&mut out, ImageOutputFormat::Png)
        .map_err(|e| {
            log::error!("Failed to encode avatar: {}", e);
            HubError::InternalError
        })?;

    log::debug!(
        "Resized avatar from {}x{} ({} bytes in, {} bytes out)",
        width,
        height,
        bytes.len(),
        out.get_ref().len()
    );
    Ok(out.into_inner())
}
