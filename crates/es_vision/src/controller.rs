//! 采集循环控制器
//!
//! 持有会话生命周期，驱动显示 tick，并在不阻塞 tick 的前提下分发推理。
//! tick 只在读帧与格式转换上阻塞，从不等待推理结果。

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, trace, warn};

use es_core::{EmoScopeError, Event, EventKind, Result, StatusText};

use crate::capture::CaptureSource;
use crate::config::{CaptureConfig, StartPolicy};
use crate::convert;
use crate::dispatcher::InferenceDispatcher;
use crate::display::DisplayState;
use crate::events::EventBus;
use crate::session::{Session, SessionState};

/// tick 结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 在给定延迟后再次 tick
    Reschedule(Duration),
    /// 会话已停止，循环结束
    Halt,
}

/// 采集循环控制器
pub struct CaptureController {
    source: Box<dyn CaptureSource>,
    config: CaptureConfig,
    /// 当前会话 (最多一个)
    session: Option<Session>,
    dispatcher: InferenceDispatcher,
    display: Arc<DisplayState>,
    events: EventBus,
    /// 最近分配的帧序号，跨会话单调递增
    last_sequence: u64,
}

impl CaptureController {
    /// 创建新控制器 (初始为停止状态)
    pub fn new(
        source: Box<dyn CaptureSource>,
        dispatcher: InferenceDispatcher,
        display: Arc<DisplayState>,
        events: EventBus,
        config: CaptureConfig,
    ) -> Self {
        Self {
            source,
            config,
            session: None,
            dispatcher,
            display,
            events,
            last_sequence: 0,
        }
    }

    /// 开始采集
    ///
    /// 设备打开失败时写入状态栏并返回 `DeviceUnavailable`，会话保持停止。
    /// 已在运行时按 `StartPolicy` 处理。
    pub fn start(&mut self) -> Result<()> {
        if self.session.is_some() {
            match self.config.start_policy {
                StartPolicy::Ignore => {
                    debug!("start requested while running, ignored");
                    return Ok(());
                }
                StartPolicy::Restart => {
                    info!("start requested while running, restarting session");
                    self.stop();
                }
            }
        }

        let device_id = self.config.device_id;
        let handle = match self.source.open(device_id) {
            Ok(handle) => handle,
            Err(err) => {
                warn!(device_id, backend = self.source.name(), error = %err, "capture device unavailable");
                self.display
                    .set_label(StatusText::DeviceUnavailable { device_id });
                self.events.publish(Event::new(
                    EventKind::DeviceUnavailable,
                    json!({ "device_id": device_id, "reason": err.to_string() }),
                ));
                return Err(match err {
                    EmoScopeError::DeviceUnavailable { .. } => err,
                    other => EmoScopeError::DeviceUnavailable {
                        device_id,
                        reason: other.to_string(),
                    },
                });
            }
        };

        let session = Session::new(device_id, handle);
        info!(
            session_id = %session.id(),
            device_id,
            backend = self.source.name(),
            classifier = self.dispatcher.classifier_name(),
            "capture session started"
        );
        self.events.publish(
            Event::new(EventKind::SessionStarted, json!({ "device_id": device_id }))
                .with_session(session.id()),
        );
        self.session = Some(session);
        Ok(())
    }

    /// 停止采集：释放句柄并清空画面 (未运行时无操作)
    ///
    /// 在途推理不会被取消，它们之后写入的标签无害。
    pub fn stop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        let stats = session.close();
        self.display.clear_image();

        info!(
            session_id = %session.id(),
            frames_read = stats.frames_read,
            read_failures = stats.read_failures,
            in_flight = self.dispatcher.in_flight(),
            "capture session stopped"
        );
        self.events.publish(
            Event::new(
                EventKind::SessionStopped,
                json!({
                    "frames_read": stats.frames_read,
                    "read_failures": stats.read_failures,
                }),
            )
            .with_session(session.id()),
        );
    }

    /// 一次显示循环迭代
    pub fn tick(&mut self) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Halt;
        };

        let frame = match session.read_frame() {
            Ok(frame) => frame,
            Err(err) => {
                debug!(session_id = %session.id(), error = %err, "frame read failed, retrying next tick");
                self.events.publish(
                    Event::new(EventKind::FrameReadFailed, json!({ "reason": err.to_string() }))
                        .with_session(session.id()),
                );
                return TickOutcome::Reschedule(self.config.tick_interval());
            }
        };

        self.last_sequence += 1;
        let frame = frame.with_sequence(self.last_sequence);
        trace!(sequence = self.last_sequence, "frame captured");

        // 推理任务持有自己的副本，tick 不等待其结果
        drop(self.dispatcher.submit(frame.clone()));

        self.display.set_image(convert::to_display_image(&frame));

        TickOutcome::Reschedule(self.config.tick_interval())
    }

    /// 会话状态
    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Running
        } else {
            SessionState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// 当前会话
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn display(&self) -> &Arc<DisplayState> {
        &self.display
    }

    pub fn dispatcher(&self) -> &InferenceDispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.stop();
    }
}
