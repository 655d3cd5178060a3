//! 协作式 tick 调度
//!
//! 呈现上下文 (egui 帧循环或异步 sleep 循环) 每次刷新时调用 `poll`。
//! 下一次 tick 的到期时间在上一次 tick 的同步部分结束后才确定，因此两次 tick 不会重叠。

use std::time::{Duration, Instant};

use crate::controller::{CaptureController, TickOutcome};

/// tick 调度器
#[derive(Debug, Default)]
pub struct TickDriver {
    next_due: Option<Instant>,
}

impl TickDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 安排首个 tick 立即执行 (在 `start()` 成功后调用)
    pub fn arm(&mut self) {
        self.next_due = Some(Instant::now());
    }

    /// 取消后续 tick
    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// 推进调度，返回距下一次需要唤醒的延迟；`None` 表示循环已结束
    pub fn poll(&mut self, controller: &mut CaptureController, now: Instant) -> Option<Duration> {
        let due = self.next_due?;
        if now < due {
            return Some(due - now);
        }

        match controller.tick() {
            TickOutcome::Reschedule(delay) => {
                self.next_due = Some(Instant::now() + delay);
                Some(delay)
            }
            TickOutcome::Halt => {
                self.next_due = None;
                None
            }
        }
    }
}
