//! 情绪分类器接口

use async_trait::async_trait;

use es_core::{EmoScopeError, Emotion, Frame, Result, StatusText};

/// 情绪分类器特征
#[async_trait]
pub trait EmotionClassifier: Send + Sync + 'static {
    /// 分类器名称 (日志用)
    fn name(&self) -> &'static str;

    /// 对一帧做情绪分类；画面中没有人脸时返回 `EmoScopeError::NoFaceDetected`
    async fn classify(&self, frame: Frame) -> Result<Emotion>;
}

/// 推理结果 (分发器边界上的穷尽处理)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceOutcome {
    /// 检测到情绪
    Detected(Emotion),
    /// 没有人脸或分类失败
    NoFace { reason: String },
}

impl InferenceOutcome {
    /// 对应的状态栏文本
    pub fn status(&self) -> StatusText {
        match self {
            InferenceOutcome::Detected(emotion) => StatusText::Detected(emotion.clone()),
            InferenceOutcome::NoFace { .. } => StatusText::NoFace,
        }
    }
}

impl From<Result<Emotion>> for InferenceOutcome {
    fn from(result: Result<Emotion>) -> Self {
        match result {
            Ok(emotion) => InferenceOutcome::Detected(emotion),
            Err(EmoScopeError::NoFaceDetected) => InferenceOutcome::NoFace {
                reason: "no face in frame".to_string(),
            },
            Err(other) => InferenceOutcome::NoFace {
                reason: other.to_string(),
            },
        }
    }
}
