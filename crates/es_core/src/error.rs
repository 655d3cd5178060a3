//! 全局错误处理机制

use thiserror::Error;

/// EmoScope 统一错误类型
#[derive(Error, Debug)]
pub enum EmoScopeError {
    #[error("Capture device {device_id} unavailable: {reason}")]
    DeviceUnavailable { device_id: u32, reason: String },

    #[error("Frame read failed: {0}")]
    FrameRead(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("No face detected")]
    NoFaceDetected,

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EmoScopeError {
    /// 是否为"未检测到人脸"类错误
    pub fn is_no_face(&self) -> bool {
        matches!(self, EmoScopeError::NoFaceDetected)
    }
}

/// 统一 Result 类型别名
pub type Result<T> = std::result::Result<T, EmoScopeError>;
