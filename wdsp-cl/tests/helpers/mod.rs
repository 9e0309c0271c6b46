//! Shared test helpers for wdsp-cl integration tests

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, Luma, Rgb, RgbImage};
use serde_json::Value;
use wdsp_cl::disposal::{KnowledgeBase, LabelResolver};
use wdsp_cl::pipeline::{ClassificationPipeline, DEFAULT_TOP_K};
use wdsp_cl::vision::{ImageClassifier, ImageNormalizer, InputSpec, ScriptedClassifier};
use wdsp_cl::AppState;

pub const BOUNDARY: &str = "wdsp-test-boundary";

/// PNG-encoded solid color image
pub fn png_rgb(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img: RgbImage = ImageBuffer::from_pixel(width, height, Rgb(color));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

/// PNG-encoded single channel image
pub fn png_gray(width: u32, height: u32, value: u8) -> Vec<u8> {
    let img: GrayImage = ImageBuffer::from_pixel(width, height, Luma([value]));
    encode(DynamicImage::ImageLuma8(img), ImageFormat::Png)
}

/// JPEG-encoded solid color image
pub fn jpeg_rgb(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img: RgbImage = ImageBuffer::from_pixel(width, height, Rgb(color));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("Should encode test image");
    bytes
}

/// Pipeline with built-in tables and the given classifier
pub fn pipeline_with(classifier: Arc<dyn ImageClassifier>) -> ClassificationPipeline {
    ClassificationPipeline::new(
        ImageNormalizer::new(InputSpec::default()),
        classifier,
        LabelResolver::builtin(),
        KnowledgeBase::builtin(),
        DEFAULT_TOP_K,
    )
    .expect("Built-in tables should be consistent")
}

/// Pipeline whose classifier always answers with `script`
pub fn scripted_pipeline(script: &[(&str, f32)]) -> ClassificationPipeline {
    pipeline_with(Arc::new(ScriptedClassifier::new(script.to_vec())))
}

/// App state around a scripted pipeline
pub fn scripted_state(script: &[(&str, f32)], max_upload_bytes: usize) -> AppState {
    AppState::new(scripted_pipeline(script), max_upload_bytes)
}

/// One multipart part: (field name, optional filename, content)
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content: &'a [u8],
}

pub fn file_part<'a>(filename: &'a str, content: &'a [u8]) -> Part<'a> {
    Part {
        name: "file",
        filename: Some(filename),
        content,
    }
}

pub fn text_part<'a>(name: &'a str, value: &'a str) -> Part<'a> {
    Part {
        name,
        filename: None,
        content: value.as_bytes(),
    }
}

/// Encode parts as a multipart/form-data body
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// POST /classify with a multipart body
pub fn classify_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/classify")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
