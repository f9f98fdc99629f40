//! Product image rule.
//!
//! Every accepted upload is checked against [`MIN_RESOLUTION`] and
//! [`MAX_RESOLUTION`], then re-encoded as a 400x400 RGB JPEG. Only the
//! normalized bytes are ever persisted.

use std::io::Cursor;

use image::{ImageReader, codecs::jpeg::JpegEncoder, imageops::FilterType};
use thiserror::Error;

pub const MIN_RESOLUTION: (u32, u32) = (10, 10);
pub const MAX_RESOLUTION: (u32, u32) = (800, 800);
pub const NORMALIZED_RESOLUTION: (u32, u32) = (400, 400);
pub const JPEG_QUALITY: u8 = 90;
/// 3 MiB.
pub const MAX_IMAGE_SIZE: usize = 3 * 1024 * 1024;
pub const NORMALIZED_CONTENT_TYPE: &str = "image/jpeg";

const FALLBACK_FILE_NAME: &str = "image.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("image is too small: {width}x{height}, minimum is {min_width}x{min_height}")]
    TooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },
    #[error("image is too large: {width}x{height}, maximum is {max_width}x{max_height}")]
    TooLarge {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("upload is {size} bytes, limit is {limit} bytes")]
    TooBig { size: usize, limit: usize },

    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Raw upload as received from the admin form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn check_resolution(width: u32, height: u32) -> Result<(), ResolutionError> {
    let (min_width, min_height) = MIN_RESOLUTION;
    let (max_width, max_height) = MAX_RESOLUTION;
    if width < min_width || height < min_height {
        return Err(ResolutionError::TooSmall {
            width,
            height,
            min_width,
            min_height,
        });
    }
    if width > max_width || height > max_height {
        return Err(ResolutionError::TooLarge {
            width,
            height,
            max_width,
            max_height,
        });
    }
    Ok(())
}

/// Validate an upload and re-encode it to the fixed storage format.
///
/// Dimensions are read from the header before the full decode, so an
/// oversized image is rejected without allocating its pixel buffer.
pub fn normalize(upload: ImageUpload) -> Result<NormalizedImage, ImageError> {
    if upload.bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooBig {
            size: upload.bytes.len(),
            limit: MAX_IMAGE_SIZE,
        });
    }

    let (width, height) = ImageReader::new(Cursor::new(&upload.bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(e.into()))?
        .into_dimensions()
        .map_err(ImageError::Decode)?;
    check_resolution(width, height)?;

    let decoded = image::load_from_memory(&upload.bytes).map_err(ImageError::Decode)?;
    let (target_width, target_height) = NORMALIZED_RESOLUTION;
    let resized = image::imageops::resize(
        &decoded.to_rgb8(),
        target_width,
        target_height,
        FilterType::Lanczos3,
    );

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode_image(&resized)
        .map_err(ImageError::Encode)?;

    tracing::debug!(
        file_name = %upload.file_name,
        original_width = width,
        original_height = height,
        size = bytes.len(),
        "image normalized"
    );

    Ok(NormalizedImage {
        file_name: storage_file_name(&upload.file_name),
        bytes,
    })
}

/// Keep the uploaded name (extension included) but drop any directory part.
fn storage_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        base.to_string()
    }
}
