//! Image preprocessing: raw upload bytes to a normalized NHWC tensor.

use cropcast_common::{CropcastError, Result};
use image::{
    DynamicImage, RgbImage,
    imageops::{self, FilterType},
};
use ndarray::Array4;
use tracing::debug;

use crate::sniff::{ImageKind, sniff};

/// Spatial resolution the classifier was trained on.
pub const INPUT_SIZE: usize = 128;

/// Color channels after conversion to RGB.
pub const CHANNELS: usize = 3;

/// Shape of a single preprocessed image: (batch, height, width, channels).
pub const INPUT_SHAPE: [usize; 4] = [1, INPUT_SIZE, INPUT_SIZE, CHANNELS];

/// A preprocessed image with a leading batch axis of size 1.
///
/// Values are in `[0.0, 1.0]`, laid out as (1, 128, 128, 3).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Array4<f32>,
}

impl ImageTensor {
    pub fn shape(&self) -> [usize; 4] {
        let dims = self.data.dim();
        [dims.0, dims.1, dims.2, dims.3]
    }

    pub fn view(&self) -> &Array4<f32> {
        &self.data
    }

    /// Flatten in logical (row-major NHWC) order.
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    pub fn zeros() -> Self {
        Self {
            data: Array4::zeros((1, INPUT_SIZE, INPUT_SIZE, CHANNELS)),
        }
    }
}

/// Check the signature of `bytes` against the allow-list.
pub fn validate_signature(bytes: &[u8]) -> Result<ImageKind> {
    match sniff(bytes) {
        Some(kind) if kind.is_supported() => Ok(kind),
        other => Err(CropcastError::UnsupportedFormat(
            other.map(|kind| kind.name().to_string()),
        )),
    }
}

/// Decode `bytes` with the decoder for `kind`.
pub fn decode(bytes: &[u8], kind: ImageKind) -> Result<DynamicImage> {
    let format = kind
        .image_format()
        .ok_or_else(|| CropcastError::UnsupportedFormat(Some(kind.name().to_string())))?;
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| CropcastError::InferenceFailure(e.to_string()))
}

/// Force 3 channels and resize to the model's input resolution.
pub fn to_model_rgb(image: &DynamicImage) -> RgbImage {
    imageops::resize(
        &image.to_rgb8(),
        INPUT_SIZE as u32,
        INPUT_SIZE as u32,
        FilterType::CatmullRom,
    )
}

/// Scale 0..=255 pixels to 0.0..=1.0 and add the batch axis.
pub fn to_tensor(rgb: &RgbImage) -> Result<ImageTensor> {
    let (width, height) = rgb.dimensions();
    if width as usize != INPUT_SIZE || height as usize != INPUT_SIZE {
        return Err(CropcastError::InferenceFailure(format!(
            "expected {}x{} image, got {}x{}",
            INPUT_SIZE, INPUT_SIZE, width, height
        )));
    }

    let data = Array4::from_shape_fn((1, INPUT_SIZE, INPUT_SIZE, CHANNELS), |(_, y, x, c)| {
        rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    });
    Ok(ImageTensor { data })
}

/// Full preprocessing pipeline for one uploaded image.
///
/// Fails with [`CropcastError::UnsupportedFormat`] before any decoding when
/// the signature is not on the allow-list.
pub fn preprocess(bytes: &[u8]) -> Result<ImageTensor> {
    let kind = validate_signature(bytes)?;
    let image = decode(bytes, kind)?;
    debug!(
        kind = %kind,
        width = image.width(),
        height = image.height(),
        "Decoded upload"
    );
    to_tensor(&to_model_rgb(&image))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{GrayImage, ImageFormat, Luma, Rgb, Rgba, RgbaImage};

    use super::*;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    fn solid_red(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 0, 0])))
    }

    fn assert_valid_tensor(tensor: &ImageTensor) {
        assert_eq!(tensor.shape(), INPUT_SHAPE);
        assert!(tensor.view().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_preprocess_supported_formats() {
        for format in [
            ImageFormat::Jpeg,
            ImageFormat::Png,
            ImageFormat::Bmp,
            ImageFormat::WebP,
        ] {
            let bytes = encode(solid_red(50, 50), format);
            let tensor = preprocess(&bytes).unwrap();
            assert_valid_tensor(&tensor);
        }
    }

    #[test]
    fn test_preprocess_solid_red_png_is_exact() {
        let bytes = encode(solid_red(50, 50), ImageFormat::Png);
        let tensor = preprocess(&bytes).unwrap();
        let view = tensor.view();
        assert!((view[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!(view[[0, 64, 64, 1]].abs() < 1e-6);
        assert!(view[[0, 127, 127, 2]].abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_lossless_webp_keeps_colors() {
        let bytes = encode(solid_red(50, 50), ImageFormat::WebP);
        assert_eq!(sniff(&bytes), Some(ImageKind::Webp));
        let tensor = preprocess(&bytes).unwrap();
        assert_valid_tensor(&tensor);
        let view = tensor.view();
        assert!((view[[0, 32, 32, 0]] - 1.0).abs() < 1e-6);
        assert!(view[[0, 32, 32, 1]].abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_grayscale_becomes_three_channels() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(20, 30, Luma([51])));
        let bytes = encode(gray, ImageFormat::Png);
        let tensor = preprocess(&bytes).unwrap();
        assert_valid_tensor(&tensor);
        let view = tensor.view();
        for c in 0..CHANNELS {
            assert!((view[[0, 10, 10, c]] - 0.2).abs() < 1e-6);
        }
    }

    #[test]
    fn test_preprocess_drops_alpha() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            200,
            100,
            Rgba([0, 255, 0, 10]),
        ));
        let bytes = encode(rgba, ImageFormat::Png);
        let tensor = preprocess(&bytes).unwrap();
        assert_valid_tensor(&tensor);
        assert!((tensor.view()[[0, 5, 5, 1]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_rejects_text() {
        let err = preprocess(b"hello, this is not an image").unwrap_err();
        assert!(matches!(err, CropcastError::UnsupportedFormat(None)));
        assert_eq!(err.to_string(), "Unsupported image type: None");
    }

    #[test]
    fn test_preprocess_rejects_gif_by_name() {
        let err = preprocess(b"GIF89a\x01\x00\x01\x00").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported image type: gif");
    }

    #[test]
    fn test_preprocess_truncated_png_is_inference_failure() {
        let bytes = encode(solid_red(10, 10), ImageFormat::Png);
        let err = preprocess(&bytes[..16]).unwrap_err();
        assert!(matches!(err, CropcastError::InferenceFailure(_)));
    }

    #[test]
    fn test_to_tensor_rejects_wrong_size() {
        let rgb = RgbImage::new(10, 10);
        assert!(to_tensor(&rgb).is_err());
    }

    #[test]
    fn test_zeros_tensor_shape() {
        let tensor = ImageTensor::zeros();
        assert_eq!(tensor.shape(), INPUT_SHAPE);
        assert_eq!(tensor.to_vec().len(), INPUT_SIZE * INPUT_SIZE * CHANNELS);
    }
}
