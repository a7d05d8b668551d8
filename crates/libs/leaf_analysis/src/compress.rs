//! Shrinks and re-encodes a picked image before it is uploaded.
//!
//! Decoding and rendering sit behind [`ImageDecoder`] and [`ImageEncoder`] so the
//! size logic can be exercised without touching real pixels. [`NativeCodec`] is the
//! implementation used in production.

use crate::data_url::encode_data_url;
use crate::{AnalysisError, RawImage};
use app_state::CompressionSettings;
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, Resizer};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, ImageReader, Rgb, RgbImage};
use std::io::Cursor;
use tracing::info;

/// Limits applied by [`ImageCompressor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionOptions {
    max_dimension: u32,
    quality: f32,
}

impl CompressionOptions {
    pub const DEFAULT_MAX_DIMENSION: u32 = 800;
    pub const DEFAULT_QUALITY: f32 = 0.7;

    /// `max_dimension` must be above zero and `quality` in `(0, 1]`.
    pub fn new(max_dimension: u32, quality: f32) -> Result<Self, AnalysisError> {
        if max_dimension == 0 {
            return Err(AnalysisError::InvalidOptions(
                "max_dimension must be above zero".to_string(),
            ));
        }
        if !(quality > 0.0 && quality <= 1.0) {
            return Err(AnalysisError::InvalidOptions(format!(
                "quality must be in (0, 1], got {quality}"
            )));
        }
        Ok(Self {
            max_dimension,
            quality,
        })
    }

    #[must_use]
    pub const fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    #[must_use]
    pub const fn quality(&self) -> f32 {
        self.quality
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_dimension: Self::DEFAULT_MAX_DIMENSION,
            quality: Self::DEFAULT_QUALITY,
        }
    }
}

impl TryFrom<&CompressionSettings> for CompressionOptions {
    type Error = AnalysisError;

    fn try_from(settings: &CompressionSettings) -> Result<Self, Self::Error> {
        Self::new(settings.max_dimension, settings.quality)
    }
}

/// JPEG ready to be sent inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl CompressedImage {
    pub const MIME_TYPE: &'static str = "image/jpeg";

    #[must_use]
    pub fn to_data_url(&self) -> String {
        encode_data_url(Self::MIME_TYPE, &self.bytes)
    }
}

pub trait ImageDecoder: Send + Sync {
    fn decode(&self, image: &RawImage) -> Result<RgbImage, AnalysisError>;
}

pub trait ImageEncoder: Send + Sync {
    /// Draws `source` onto a `width` x `height` surface and serializes it as JPEG.
    fn render_jpeg(
        &self,
        source: RgbImage,
        width: u32,
        height: u32,
        quality: f32,
    ) -> Result<Vec<u8>, AnalysisError>;
}

/// Target size keeping the aspect ratio, with the longest side at most `max_dimension`.
/// Images that already fit are left as they are.
#[must_use]
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }
    let scaled = |minor: u32, major: u32| -> u32 {
        let value = f64::from(minor) / f64::from(major) * f64::from(max_dimension);
        value.round().max(1.0) as u32
    };
    if width > height {
        (max_dimension, scaled(height, width))
    } else {
        (scaled(width, height), max_dimension)
    }
}

fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Decoding with `image`, resizing with `fast_image_resize`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

impl NativeCodec {
    fn resize(source: RgbImage, width: u32, height: u32) -> Result<RgbImage, AnalysisError> {
        let (orig_w, orig_h) = source.dimensions();
        let src_image = Image::from_vec_u8(orig_w, orig_h, source.into_raw(), PixelType::U8x3)
            .map_err(AnalysisError::render)?;
        let mut dst_image = Image::new(width, height, PixelType::U8x3);

        let mut resizer = Resizer::new();
        resizer
            .resize(&src_image, &mut dst_image, None)
            .map_err(AnalysisError::render)?;

        ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, dst_image.into_vec())
            .ok_or_else(|| AnalysisError::render("failed to construct resized image"))
    }
}

impl ImageDecoder for NativeCodec {
    fn decode(&self, image: &RawImage) -> Result<RgbImage, AnalysisError> {
        let decoded = ImageReader::new(Cursor::new(&image.bytes))
            .with_guessed_format()
            .map_err(AnalysisError::decode)?
            .decode()
            .map_err(AnalysisError::decode)?;
        Ok(decoded.into_rgb8())
    }
}

impl ImageEncoder for NativeCodec {
    fn render_jpeg(
        &self,
        source: RgbImage,
        width: u32,
        height: u32,
        quality: f32,
    ) -> Result<Vec<u8>, AnalysisError> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::render(format!(
                "cannot allocate a {width}x{height} surface"
            )));
        }
        let surface = if source.dimensions() == (width, height) {
            source
        } else {
            Self::resize(source, width, height)?
        };

        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality));
        surface
            .write_with_encoder(encoder)
            .map_err(AnalysisError::render)?;
        Ok(bytes)
    }
}

pub struct ImageCompressor<D = NativeCodec, E = NativeCodec> {
    decoder: D,
    encoder: E,
    options: CompressionOptions,
}

impl ImageCompressor {
    #[must_use]
    pub fn native(options: CompressionOptions) -> Self {
        Self::new(NativeCodec, NativeCodec, options)
    }
}

impl<D: ImageDecoder, E: ImageEncoder> ImageCompressor<D, E> {
    #[must_use]
    pub fn new(decoder: D, encoder: E, options: CompressionOptions) -> Self {
        Self {
            decoder,
            encoder,
            options,
        }
    }

    #[must_use]
    pub const fn options(&self) -> CompressionOptions {
        self.options
    }

    pub fn compress(&self, image: &RawImage) -> Result<CompressedImage, AnalysisError> {
        let source = self.decoder.decode(image)?;
        let (orig_w, orig_h) = source.dimensions();
        if orig_w == 0 || orig_h == 0 {
            return Err(AnalysisError::decode("source image has no pixels"));
        }

        let (width, height) = fit_within(orig_w, orig_h, self.options.max_dimension);
        let bytes = self
            .encoder
            .render_jpeg(source, width, height, self.options.quality)?;

        info!(
            "Compressed {orig_w}x{orig_h} {} ({} bytes) to {width}x{height} JPEG ({} bytes)",
            image.mime_type,
            image.bytes.len(),
            bytes.len()
        );
        Ok(CompressedImage {
            width,
            height,
            bytes,
        })
    }
}
