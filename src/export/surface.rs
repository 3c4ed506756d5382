//! Raster surfaces and data URLs.

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use tracing::trace;

use super::ExportFormat;
use crate::error::{AtelierError, Result};

/// Encode hook of a rendering surface.
pub trait RasterSurface {
    /// Logical width in pixels, before the multiplier.
    fn width(&self) -> u32;

    /// Logical height in pixels, before the multiplier.
    fn height(&self) -> u32;

    /// Encode the current frame as a `data:` URL. `quality` is in `[0, 1]`
    /// and only affects lossy formats; `multiplier` scales the resolution.
    fn to_data_url(&self, format: ExportFormat, quality: f64, multiplier: f64) -> Result<String>;
}

/// Surface over one captured RGBA frame.
#[derive(Debug, Clone)]
pub struct FrameSurface {
    frame: RgbaImage,
}

impl FrameSurface {
    pub fn new(frame: RgbaImage) -> Self {
        Self { frame }
    }

    /// Frame from raw RGBA bytes.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let frame = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| AtelierError::Encoding {
            reason: format!("pixel buffer does not match {width}x{height} RGBA"),
        })?;
        Ok(Self { frame })
    }

    /// Uniformly filled frame.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            frame: RgbaImage::from_pixel(width, height, image::Rgba(rgba)),
        }
    }

    /// Load a captured frame from an image file.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AtelierError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let frame = image::open(path)?.to_rgba8();
        Ok(Self { frame })
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    fn scaled(&self, multiplier: f64) -> RgbaImage {
        let width = scaled_dimension(self.frame.width(), multiplier);
        let height = scaled_dimension(self.frame.height(), multiplier);
        if (width, height) == self.frame.dimensions() {
            self.frame.clone()
        } else {
            imageops::resize(&self.frame, width, height, FilterType::Lanczos3)
        }
    }
}

fn scaled_dimension(size: u32, multiplier: f64) -> u32 {
    ((f64::from(size) * multiplier).round() as u32).max(1)
}

/// JPEG quality setting for a `[0, 1]` quality.
fn jpeg_quality(quality: f64) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

impl RasterSurface for FrameSurface {
    fn width(&self) -> u32 {
        self.frame.width()
    }

    fn height(&self) -> u32 {
        self.frame.height()
    }

    fn to_data_url(&self, format: ExportFormat, quality: f64, multiplier: f64) -> Result<String> {
        let frame = self.scaled(multiplier);
        let (width, height) = frame.dimensions();
        let mut bytes = Vec::new();

        match format {
            ExportFormat::Png => {
                PngEncoder::new(Cursor::new(&mut bytes)).write_image(
                    frame.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )?;
            }
            ExportFormat::Jpeg => {
                // JPEG carries no alpha channel.
                let rgb = DynamicImage::ImageRgba8(frame).to_rgb8();
                JpegEncoder::new_with_quality(Cursor::new(&mut bytes), jpeg_quality(quality))
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
            }
        }

        trace!(%format, width, height, bytes = bytes.len(), "frame encoded");
        Ok(format!("data:{};base64,{}", format.mime_type(), BASE64.encode(&bytes)))
    }
}

/// Size of the decoded file, estimated from the data URL length.
pub fn estimate_bytes(data_url: &str) -> usize {
    data_url.len() * 3 / 4
}

/// Split a base64 data URL into its MIME type and decoded bytes.
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>)> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| AtelierError::MalformedDataUrl {
            reason: "missing data: scheme".to_string(),
        })?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| AtelierError::MalformedDataUrl {
            reason: "missing ;base64, marker".to_string(),
        })?;
    Ok((mime.to_string(), BASE64.decode(payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_frame(width: u32, height: u32) -> FrameSurface {
        let mut seed: u32 = 0x2545_f491;
        let pixels = (0..width * height * 4)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                (seed & 0xff) as u8
            })
            .collect();
        FrameSurface::from_rgba(width, height, pixels).unwrap()
    }

    #[test]
    fn test_png_data_url_decodes() {
        let surface = FrameSurface::solid(8, 4, [255, 0, 0, 255]);
        let url = surface.to_data_url(ExportFormat::Png, 1.0, 2.0).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let (mime, bytes) = decode_data_url(&url).unwrap();
        assert_eq!(mime, "image/png");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn test_jpeg_quality_shrinks_payload() {
        let surface = noisy_frame(64, 64);
        let high = surface.to_data_url(ExportFormat::Jpeg, 1.0, 1.0).unwrap();
        let low = surface.to_data_url(ExportFormat::Jpeg, 0.1, 1.0).unwrap();
        assert!(low.starts_with("data:image/jpeg;base64,"));
        assert!(estimate_bytes(&low) < estimate_bytes(&high));
    }

    #[test]
    fn test_multiplier_never_collapses_to_zero() {
        let surface = FrameSurface::solid(3, 3, [0, 0, 0, 255]);
        let url = surface.to_data_url(ExportFormat::Png, 1.0, 0.01).unwrap();
        let (_, bytes) = decode_data_url(&url).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1, 1));
    }

    #[test]
    fn test_mismatched_buffer_rejected() {
        assert!(FrameSurface::from_rgba(4, 4, vec![0; 10]).is_err());
    }

    #[test]
    fn test_malformed_data_urls() {
        assert!(matches!(
            decode_data_url("image/png;base64,AAAA"),
            Err(AtelierError::MalformedDataUrl { .. })
        ));
        assert!(matches!(
            decode_data_url("data:image/png,AAAA"),
            Err(AtelierError::MalformedDataUrl { .. })
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,!!!"),
            Err(AtelierError::Base64(_))
        ));
    }

    #[test]
    fn test_estimate_is_three_quarters_of_length() {
        assert_eq!(estimate_bytes(&"a".repeat(400)), 300);
    }
}
