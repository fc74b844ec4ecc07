use image::{imageops, RgbaImage};
use thiserror::Error;

use crate::config::OutputSize;
use crate::geometry::Rect;

/// Largest surface, in pixels, that [`ImageopsDrawing`] will allocate.
pub const DEFAULT_MAX_SURFACE_PIXELS: u64 = 128 * 1024 * 1024;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("crop region is empty: {description}")]
    EmptyRegion { description: String },
    #[error("surface {width}x{height} exceeds the {limit} pixel limit")]
    SurfaceTooLarge { width: u32, height: u32, limit: u64 },
    #[error("render failed: {message}")]
    Render { message: String },
}

pub type DrawResult<T> = std::result::Result<T, DrawError>;

/// Bitmap drawing collaborator used when a crop session commits.
pub trait Drawing {
    /// Crops `source` to `crop` (source-pixel space) and resamples the result to `output`.
    fn crop_and_scale(
        &self,
        source: &RgbaImage,
        crop: Rect,
        output: OutputSize,
    ) -> DrawResult<RgbaImage>;
}

/// [`Drawing`] backed by `image::imageops`.
#[derive(Debug, Clone, Copy)]
pub struct ImageopsDrawing {
    filter: imageops::FilterType,
    max_surface_pixels: u64,
}

impl ImageopsDrawing {
    pub const fn new(filter: imageops::FilterType) -> Self {
        Self {
            filter,
            max_surface_pixels: DEFAULT_MAX_SURFACE_PIXELS,
        }
    }

    pub const fn with_max_surface_pixels(mut self, max_surface_pixels: u64) -> Self {
        self.max_surface_pixels = max_surface_pixels;
        self
    }

    fn check_surface(&self, width: u32, height: u32) -> DrawResult<()> {
        if u64::from(width) * u64::from(height) > self.max_surface_pixels {
            return Err(DrawError::SurfaceTooLarge {
                width,
                height,
                limit: self.max_surface_pixels,
            });
        }
        Ok(())
    }
}

impl Default for ImageopsDrawing {
    fn default() -> Self {
        Self::new(imageops::FilterType::Triangle)
    }
}

/// Rounds `crop` to whole pixels: `(left, top, width, height)`.
pub(crate) fn pixel_region(crop: Rect) -> Option<(i64, i64, u32, u32)> {
    let values = [crop.x, crop.y, crop.width, crop.height];
    if values.iter().any(|value| !value.is_finite()) {
        return None;
    }
    let width = crop.width.round();
    let height = crop.height.round();
    if width < 1.0 || height < 1.0 || width > f64::from(u32::MAX) || height > f64::from(u32::MAX) {
        return None;
    }
    Some((
        crop.x.round() as i64,
        crop.y.round() as i64,
        width as u32,
        height as u32,
    ))
}

impl Drawing for ImageopsDrawing {
    fn crop_and_scale(
        &self,
        source: &RgbaImage,
        crop: Rect,
        output: OutputSize,
    ) -> DrawResult<RgbaImage> {
        let (left, top, width, height) =
            pixel_region(crop).ok_or_else(|| DrawError::EmptyRegion {
                description: crop.to_string(),
            })?;
        if !output.is_positive() {
            return Err(DrawError::EmptyRegion {
                description: format!("output {}x{}", output.width, output.height),
            });
        }
        self.check_surface(width, height)?;
        self.check_surface(output.width, output.height)?;

        // Pixels of the crop that fall outside the source stay transparent.
        let mut cropped = RgbaImage::new(width, height);
        imageops::replace(&mut cropped, source, -left, -top);

        if (width, height) == (output.width, output.height) {
            return Ok(cropped);
        }
        Ok(imageops::resize(
            &cropped,
            output.width,
            output.height,
            self.filter,
        ))
    }
}
