//! 采集会话事件定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 会话 ID 类型别名
pub type SessionId = Uuid;

/// 会话事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// 事件唯一标识
    pub id: Uuid,
    /// 事件类型
    pub kind: EventKind,
    /// 事件时间戳
    pub timestamp: DateTime<Utc>,
    /// 关联会话 (推理事件不绑定会话)
    pub session_id: Option<SessionId>,
    /// 事件载荷 (JSON)
    pub payload: serde_json::Value,
}

impl Event {
    /// 创建新事件
    pub fn new(kind: EventKind, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            timestamp: Utc::now(),
            session_id: None,
            payload,
        }
    }

    /// 设置关联会话
    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }
}

/// 事件类型枚举
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventKind {
    // 会话事件
    SessionStarted,
    SessionStopped,
    DeviceUnavailable,

    // 采集事件
    FrameReadFailed,

    // 推理事件
    EmotionDetected,
    NoFaceDetected,
    StaleResultDiscarded,
}

impl EventKind {
    /// 获取事件类型名称
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SessionStarted => "session_started",
            EventKind::SessionStopped => "session_stopped",
            EventKind::DeviceUnavailable => "device_unavailable",
            EventKind::FrameReadFailed => "frame_read_failed",
            EventKind::EmotionDetected => "emotion_detected",
            EventKind::NoFaceDetected => "no_face_detected",
            EventKind::StaleResultDiscarded => "stale_result_discarded",
        }
    }
}
