//! 采集循环与推理配置

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 会话运行中再次调用 `start()` 的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// 忽略 (保持当前会话)
    #[default]
    Ignore,
    /// 释放旧句柄后重新打开
    Restart,
}

/// 情绪标签的写入顺序策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelOrdering {
    /// 只接受不旧于已写入结果的帧 (按帧序号)
    #[default]
    Freshest,
    /// 按完成时间, 最后写入者生效
    Completion,
}

/// 采集配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// 摄像头设备号
    pub device_id: u32,
    /// tick 间隔 (毫秒)
    pub tick_interval_ms: u64,
    /// 重复 start 策略
    pub start_policy: StartPolicy,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            tick_interval_ms: 10,
            start_policy: StartPolicy::Ignore,
        }
    }
}

impl CaptureConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// 推理配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// 单次分类超时 (毫秒, 0 表示不限)
    pub timeout_ms: u64,
    /// 标签写入顺序
    pub label_ordering: LabelOrdering,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            label_ordering: LabelOrdering::Freshest,
        }
    }
}

impl InferenceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}
