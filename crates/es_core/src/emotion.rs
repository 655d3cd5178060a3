//! 情绪标签与状态栏文本

use std::fmt;

/// 分类器输出的情绪标签
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
    /// 模型返回的其他标签 (原样保留)
    Other(String),
}

impl Emotion {
    /// 从模型标签解析 (忽略大小写与首尾空白)
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "angry" | "anger" => Emotion::Angry,
            "disgust" | "disgusted" => Emotion::Disgust,
            "fear" | "fearful" => Emotion::Fear,
            "happy" | "happiness" => Emotion::Happy,
            "sad" | "sadness" => Emotion::Sad,
            "surprise" | "surprised" => Emotion::Surprise,
            "neutral" => Emotion::Neutral,
            _ => Emotion::Other(trimmed.to_string()),
        }
    }

    /// 获取标签名称
    pub fn as_str(&self) -> &str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
            Emotion::Other(label) => label,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 状态栏显示内容
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusText {
    /// 尚未开始
    #[default]
    Idle,
    /// 检测到情绪
    Detected(Emotion),
    /// 分类失败或画面中没有人脸
    NoFace,
    /// 摄像头无法打开
    DeviceUnavailable { device_id: u32 },
}

impl fmt::Display for StatusText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusText::Idle => f.write_str("Click 'Start' to begin"),
            StatusText::Detected(emotion) => {
                write!(f, "Detected Emotion: {}", emotion.as_str().to_uppercase())
            }
            StatusText::NoFace => f.write_str("No face detected"),
            StatusText::DeviceUnavailable { device_id } => {
                write!(f, "Camera {device_id} unavailable")
            }
        }
    }
}
