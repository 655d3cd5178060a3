//! 采集会话
//!
//! 一次 start → stop 的生命周期。会话独占采集句柄，关闭或析构时释放。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use es_core::{EmoScopeError, Frame, Result, SessionId};

use crate::capture::CaptureStream;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// 已停止
    Stopped,
    /// 运行中
    Running,
}

/// 会话统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// 成功读取的帧数
    pub frames_read: u64,
    /// 读取失败次数
    pub read_failures: u64,
}

/// 采集会话
pub struct Session {
    id: SessionId,
    device_id: u32,
    started_at: DateTime<Utc>,
    /// 采集句柄 (关闭后为 None)
    handle: Option<Box<dyn CaptureStream>>,
    stats: SessionStats,
}

impl Session {
    /// 以已打开的句柄创建会话
    pub fn new(device_id: u32, handle: Box<dyn CaptureStream>) -> Self {
        Self {
            id: Uuid::new_v4(),
            device_id,
            started_at: Utc::now(),
            handle: Some(handle),
            stats: SessionStats::default(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// 句柄是否仍然持有
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// 从句柄读取一帧
    pub fn read_frame(&mut self) -> Result<Frame> {
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| EmoScopeError::FrameRead("capture handle released".to_string()))?;

        let result = handle.read_frame();
        match &result {
            Ok(_) => self.stats.frames_read += 1,
            Err(_) => self.stats.read_failures += 1,
        }
        result
    }

    /// 释放句柄，返回会话统计 (重复调用无副作用)
    pub fn close(&mut self) -> SessionStats {
        if let Some(mut handle) = self.handle.take() {
            handle.release();
        }
        self.stats
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
