//! Image upscaling to a minimum long-side resolution.
//!
//! The cutter rasterises its bezier cut lines at the source image's
//! resolution, so small images produce jagged piece edges. Images whose
//! longest axis is below the configured `min_long_side` are upscaled so
//! that axis reaches it exactly, with Lanczos resampling.
//!
//! Images already at or above the threshold are left alone.

use image::DynamicImage;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;

use crate::types::{Dimensions, PipelineError};

/// Resampling filter used when upscaling.
const UPSCALE_FILTER: FilterType = FilterType::Lanczos3;

/// Decode raw image bytes (PNG, JPEG, BMP, WebP).
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Target dimensions for upscaling, or `None` if the image is already
/// large enough.
///
/// The long side becomes exactly `min_long_side`; the short side is
/// scaled by the same factor and rounded to the nearest pixel (never
/// below 1).
#[must_use]
pub fn upscaled_dimensions(dimensions: Dimensions, min_long_side: u32) -> Option<Dimensions> {
    let long = dimensions.long_side();
    if long == 0 || long >= min_long_side {
        return None;
    }

    let scale_axis = |axis: u32| -> u32 {
        let scaled = (u64::from(axis) * u64::from(min_long_side) + u64::from(long) / 2)
            / u64::from(long);
        // Bounded by min_long_side since axis <= long.
        u32::try_from(scaled).unwrap_or(min_long_side).max(1)
    };

    Some(Dimensions::new(
        scale_axis(dimensions.width),
        scale_axis(dimensions.height),
    ))
}

/// Upscale `image` so its longest axis is `min_long_side` pixels.
///
/// Returns `None` when no upscaling is needed.
#[must_use]
pub fn upscale(image: &DynamicImage, min_long_side: u32) -> Option<DynamicImage> {
    let target = upscaled_dimensions(
        Dimensions::new(image.width(), image.height()),
        min_long_side,
    )?;
    Some(image.resize_exact(target.width, target.height, UPSCALE_FILTER))
}

/// Encode an image as PNG bytes.
///
/// # Errors
///
/// Returns [`PipelineError::ImageEncode`] if the pixel format cannot be
/// written as PNG.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Vec::new();
    image
        .write_with_encoder(PngEncoder::new(&mut buf))
        .map_err(PipelineError::ImageEncode)?;
    Ok(buf)
}
