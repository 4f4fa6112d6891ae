// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image codec: wire formats in, RGB buffers through the detector, JPEG out

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{codecs::jpeg::JpegEncoder, DynamicImage, ImageFormat, RgbImage};
use thiserror::Error;

use crate::vision::yolo::{AnnotatedImage, ChannelOrder};

/// Custom error types for image processing
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,

    #[error("Annotated buffer is {actual} bytes, expected {expected} for {width}x{height}")]
    BufferMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Format sniffed from the payload, if recognised
    pub format: Option<ImageFormat>,
    /// Size in bytes
    pub size_bytes: usize,
}

/// Decode raw image bytes (multipart uploads) into a 3-channel RGB buffer
///
/// The container format is sniffed from content, the declared filename or
/// content type plays no part. Alpha and grayscale inputs are flattened to RGB.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(RgbImage, ImageInfo), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = image::guess_format(bytes).ok();
    let img = image::load_from_memory(bytes).map_err(|e| ImageError::DecodeFailed(e.to_string()))?;
    let rgb = img.into_rgb8();

    let info = ImageInfo {
        width: rgb.width(),
        height: rgb.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((rgb, info))
}

/// Decode a base64-encoded image
///
/// Accepts plain standard-alphabet base64 as well as `data:image/...;base64,`
/// URLs, which browsers hand out from `FileReader.readAsDataURL`. Whitespace
/// is ignored, so MIME-wrapped payloads decode too.
///
/// # Example
/// ```ignore
/// let (image, info) = decode_base64_image("iVBORw0KGgo...")?;
/// println!("Image size: {}x{}", info.width, info.height);
/// ```
pub fn decode_base64_image(base64_str: &str) -> Result<(RgbImage, ImageInfo), ImageError> {
    let payload: String = strip_data_url(base64_str.trim())
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if payload.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let bytes = STANDARD.decode(&payload)?;
    decode_image_bytes(&bytes)
}

/// Compress an annotated buffer as JPEG and return it base64-encoded
///
/// The buffer is swapped to RGB first when the renderer produced BGR. The JPEG
/// encoder runs at its default quality.
pub fn encode_jpeg_base64(annotated: &AnnotatedImage) -> Result<String, ImageError> {
    let rgb = to_rgb(annotated)?;

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new(&mut buffer)
        .encode_image(&DynamicImage::ImageRgb8(rgb))
        .map_err(|e| ImageError::EncodeFailed(e.to_string()))?;

    Ok(STANDARD.encode(buffer.into_inner()))
}

/// Convert an annotated buffer into RGB channel order
pub fn to_rgb(annotated: &AnnotatedImage) -> Result<RgbImage, ImageError> {
    let (width, height) = annotated.dimensions();
    let expected = width as usize * height as usize * 3;
    let raw = annotated.as_raw();
    if raw.len() != expected {
        return Err(ImageError::BufferMismatch {
            width,
            height,
            expected,
            actual: raw.len(),
        });
    }

    let data = match annotated.order() {
        ChannelOrder::Rgb => raw.to_vec(),
        ChannelOrder::Bgr => raw
            .chunks_exact(3)
            .flat_map(|px| [px[2], px[1], px[0]])
            .collect(),
    };

    RgbImage::from_raw(width, height, data).ok_or(ImageError::BufferMismatch {
        width,
        height,
        expected,
        actual: raw.len(),
    })
}

fn strip_data_url(input: &str) -> &str {
    if input.starts_with("data:") {
        if let Some(idx) = input.find(";base64,") {
            return &input[idx + ";base64,".len()..];
        }
    }
    input
}
