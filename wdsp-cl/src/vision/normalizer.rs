//! Image normalization for the classifier input
//!
//! Arbitrary image bytes → `[1, H, W, 3]` (or `[1, 3, H, W]`) `f32` tensor:
//! decode, force RGB, resize to the fixed square resolution without
//! preserving aspect ratio, then scale values the way the model was trained.
//!
//! The value scaling cannot be checked by error handling. A wrong
//! `Preprocessing` still yields a well-formed tensor and only shows up as poor
//! accuracy against known images.

use image::imageops::FilterType;
use image::RgbImage;
use serde::Deserialize;
use tract_onnx::prelude::*;

use crate::error::{Error, Result};

/// Per-channel ImageNet statistics (RGB order)
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Value scaling applied to each `u8` channel value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preprocessing {
    /// Keras MobileNetV2: `x / 127.5 - 1`, range `[-1, 1]`
    #[default]
    MobilenetV2,
    /// `x / 255`, range `[0, 1]`
    UnitRange,
    /// `(x / 255 - mean) / std` with ImageNet statistics
    ImagenetStandard,
}

impl Preprocessing {
    fn apply(&self, value: u8, channel: usize) -> f32 {
        let x = value as f32;
        match self {
            Preprocessing::MobilenetV2 => x / 127.5 - 1.0,
            Preprocessing::UnitRange => x / 255.0,
            Preprocessing::ImagenetStandard => {
                (x / 255.0 - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel]
            }
        }
    }
}

/// Axis order of the input tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorLayout {
    /// `[batch, height, width, channels]` (Keras / TensorFlow exports)
    #[default]
    Nhwc,
    /// `[batch, channels, height, width]` (PyTorch exports)
    Nchw,
}

/// Shape and value contract of the model input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpec {
    /// Square input resolution in pixels
    pub size: u32,
    pub layout: TensorLayout,
    pub preprocessing: Preprocessing,
}

impl Default for InputSpec {
    fn default() -> Self {
        Self {
            size: 224,
            layout: TensorLayout::default(),
            preprocessing: Preprocessing::default(),
        }
    }
}

impl InputSpec {
    /// Tensor shape produced by the normalizer, batch axis included
    pub fn shape(&self) -> [usize; 4] {
        let s = self.size as usize;
        match self.layout {
            TensorLayout::Nhwc => [1, s, s, 3],
            TensorLayout::Nchw => [1, 3, s, s],
        }
    }
}

/// Converts upload bytes into the classifier's input tensor
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    spec: InputSpec,
    filter: FilterType,
}

impl ImageNormalizer {
    pub fn new(spec: InputSpec) -> Self {
        Self {
            spec,
            filter: FilterType::CatmullRom,
        }
    }

    /// Decode, convert and scale an image
    ///
    /// Fails with `Error::Decode` when the bytes are not a supported image.
    pub fn normalize(&self, bytes: &[u8]) -> Result<Tensor> {
        let image = image::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))?;

        let size = self.spec.size;
        let rgb = image.resize_exact(size, size, self.filter).to_rgb8();

        Ok(self.to_tensor(&rgb))
    }

    fn to_tensor(&self, rgb: &RgbImage) -> Tensor {
        let s = self.spec.size as usize;
        let preprocessing = self.spec.preprocessing;

        match self.spec.layout {
            TensorLayout::Nhwc => {
                tract_ndarray::Array4::from_shape_fn((1, s, s, 3), |(_, y, x, c)| {
                    preprocessing.apply(rgb.get_pixel(x as u32, y as u32)[c], c)
                })
                .into_tensor()
            }
            TensorLayout::Nchw => {
                tract_ndarray::Array4::from_shape_fn((1, 3, s, s), |(_, c, y, x)| {
                    preprocessing.apply(rgb.get_pixel(x as u32, y as u32)[c], c)
                })
                .into_tensor()
            }
        }
    }
}
