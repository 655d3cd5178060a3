//! DeepFace REST 情绪分类器
//!
//! 通过 DeepFace 自带的 HTTP 服务 (`deepface api`, 默认端口 5005) 做情绪分析。
//!
//! 请求: `POST {base_url}/analyze`，图像以 base64 JPEG data URI 传输
//! 响应: `{"results": [{"dominant_emotion": "happy", "face_confidence": 0.93, ...}]}`

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use serde::{Deserialize, Serialize};
use tracing::trace;

use es_core::{EmoScopeError, Emotion, Frame, Result};
use es_vision::{convert, EmotionClassifier};

// ── 常量 ────────────────────────────────────────────────────────────────────────
const DEEPFACE_DEFAULT_BASE_URL: &str = "http://127.0.0.1:5005";
const DEEPFACE_ANALYZE_PATH: &str = "/analyze";

// ── 数据结构 ────────────────────────────────────────────────────────────────────
/// DeepFace 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepFaceConfig {
    /// 服务地址
    pub base_url: String,
    /// 人脸检测后端，如 "opencv", "retinaface", "mtcnn"
    pub detector_backend: String,
    /// 检测不到人脸时是否让服务端报错
    pub enforce_detection: bool,
    /// 是否做人脸对齐
    pub align: bool,
    /// JPEG 编码质量 (1-100)
    pub jpeg_quality: u8,
    /// 低于此人脸置信度视为未检测到人脸 (0 表示不过滤)
    pub min_face_confidence: f64,
    /// HTTP 请求超时 (毫秒)
    pub request_timeout_ms: u64,
}

impl Default for DeepFaceConfig {
    fn default() -> Self {
        Self {
            base_url: DEEPFACE_DEFAULT_BASE_URL.to_string(),
            detector_backend: "opencv".to_string(),
            enforce_detection: false,
            align: true,
            jpeg_quality: 85,
            min_face_confidence: 0.0,
            request_timeout_ms: 30_000,
        }
    }
}

impl DeepFaceConfig {
    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(EmoScopeError::Config(format!(
                "deepface.base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(EmoScopeError::Config(format!(
                "deepface.jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.min_face_confidence < 0.0 {
            return Err(EmoScopeError::Config(
                "deepface.min_face_confidence must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    results: Vec<FaceAnalysis>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FaceAnalysis {
    dominant_emotion: String,
    #[serde(default)]
    face_confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct DeepFaceClassifier {
    config: DeepFaceConfig,
    client: reqwest::Client,
}

// ── 主实现 ───────────────────────────────────────────────────────────────────────
impl DeepFaceClassifier {
    pub fn new(config: DeepFaceConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| {
                EmoScopeError::Classifier(format!("deepface: http client init failed: {}", e))
            })?;

        Ok(Self { config, client })
    }

    pub fn default_classifier() -> Result<Self> {
        Self::new(DeepFaceConfig::default())
    }

    pub fn config(&self) -> &DeepFaceConfig {
        &self.config
    }

    /// 构造 analyze URL
    fn analyze_url(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            DEEPFACE_ANALYZE_PATH
        )
    }

    /// 帧 → base64 JPEG data URI
    pub fn encode_frame(&self, frame: &Frame) -> Result<String> {
        let rgb = convert::to_rgb8(frame);
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.config.jpeg_quality)
            .encode(&rgb, frame.width(), frame.height(), ExtendedColorType::Rgb8)
            .map_err(|e| EmoScopeError::Classifier(format!("deepface: jpeg encode failed: {}", e)))?;

        Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg)))
    }

    /// 编译 analyze 请求体
    pub fn compile_request(&self, img: String) -> serde_json::Value {
        serde_json::json!({
            "img": img,
            "actions": ["emotion"],
            "detector_backend": self.config.detector_backend,
            "enforce_detection": self.config.enforce_detection,
            "align": self.config.align,
        })
    }
}

#[async_trait]
impl EmotionClassifier for DeepFaceClassifier {
    fn name(&self) -> &'static str {
        "deepface"
    }

    async fn classify(&self, frame: Frame) -> Result<Emotion> {
        let body = self.compile_request(self.encode_frame(&frame)?);
        let url = self.analyze_url();
        trace!(sequence = frame.sequence(), %url, "deepface analyze");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                EmoScopeError::Classifier(format!("deepface: analyze request failed: {}", e))
            })?;

        let status = resp.status();
        let raw_text = resp.text().await.unwrap_or_default();

        parse_analyze_response(status.as_u16(), &raw_text, self.config.min_face_confidence)
    }
}

/// 服务端的"找不到人脸"报错
fn is_no_face_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("face could not be detected") || lower.contains("no face")
}

fn analyze_error(status: u16, message: &str) -> EmoScopeError {
    if is_no_face_message(message) {
        EmoScopeError::NoFaceDetected
    } else {
        EmoScopeError::Classifier(format!(
            "deepface: analyze failed ({}): {}",
            status,
            message.trim()
        ))
    }
}

/// 解析 analyze 响应，取第一张人脸的主导情绪
pub fn parse_analyze_response(status: u16, body: &str, min_face_confidence: f64) -> Result<Emotion> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.to_string());
        return Err(analyze_error(status, &message));
    }

    let parsed: AnalyzeResponse = serde_json::from_str(body)?;
    if let Some(message) = parsed.error {
        return Err(analyze_error(status, &message));
    }

    let face = parsed
        .results
        .into_iter()
        .next()
        .ok_or(EmoScopeError::NoFaceDetected)?;

    if min_face_confidence > 0.0
        && face.face_confidence.unwrap_or(0.0) < min_face_confidence
    {
        return Err(EmoScopeError::NoFaceDetected);
    }

    Ok(Emotion::from_label(&face.dominant_emotion))
}
