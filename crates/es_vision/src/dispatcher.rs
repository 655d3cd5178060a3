//! 推理分发器
//!
//! 每次 `submit` 在运行时上派生一个独立任务：没有共享队列，也没有反压。
//! 任务之间可以并发、乱序完成；所有失败路径都终止于一次标签写入，不向外传播。

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::json;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use es_core::{EmoScopeError, Emotion, Event, EventKind, Frame, Result};

use crate::classifier::{EmotionClassifier, InferenceOutcome};
use crate::display::DisplayState;
use crate::events::EventBus;

/// 推理分发器
pub struct InferenceDispatcher {
    classifier: Arc<dyn EmotionClassifier>,
    display: Arc<DisplayState>,
    events: EventBus,
    /// 推理任务所在的运行时
    runtime: Handle,
    /// 单次分类超时
    timeout: Option<Duration>,
    /// 正在执行的任务数
    in_flight: Arc<AtomicUsize>,
}

/// 在途计数守卫，任务结束 (含 panic/取消) 时递减
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl InferenceDispatcher {
    /// 创建新分发器
    pub fn new(
        classifier: Arc<dyn EmotionClassifier>,
        display: Arc<DisplayState>,
        events: EventBus,
        runtime: Handle,
    ) -> Self {
        Self {
            classifier,
            display,
            events,
            runtime,
            timeout: None,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 设置单次分类超时
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// 提交一帧做异步分类，立即返回
    ///
    /// 调用方可以丢弃返回的句柄 (任务照常运行)。
    pub fn submit(&self, frame: Frame) -> JoinHandle<InferenceOutcome> {
        let guard = InFlightGuard::enter(&self.in_flight);
        let classifier = self.classifier.clone();
        let display = self.display.clone();
        let events = self.events.clone();
        let timeout = self.timeout;
        let sequence = frame.sequence();

        trace!(sequence, classifier = classifier.name(), "inference submitted");

        self.runtime.spawn(async move {
            let _guard = guard;

            let result = run_classifier(classifier.as_ref(), frame, timeout).await;
            let outcome = InferenceOutcome::from(result);
            let applied = display.publish_result(sequence, outcome.status());

            let kind = match (&outcome, applied) {
                (_, false) => {
                    debug!(sequence, "stale inference result discarded");
                    EventKind::StaleResultDiscarded
                }
                (InferenceOutcome::Detected(emotion), true) => {
                    debug!(sequence, %emotion, "emotion detected");
                    EventKind::EmotionDetected
                }
                (InferenceOutcome::NoFace { reason }, true) => {
                    debug!(sequence, %reason, "no face detected");
                    EventKind::NoFaceDetected
                }
            };
            events.publish(Event::new(
                kind,
                json!({
                    "frame_sequence": sequence,
                    "status": outcome.status().to_string(),
                }),
            ));

            outcome
        })
    }

    /// 正在执行的推理任务数
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }
}

/// 执行分类，超时与 panic 都折叠为分类错误
async fn run_classifier(
    classifier: &dyn EmotionClassifier,
    frame: Frame,
    timeout: Option<Duration>,
) -> Result<Emotion> {
    let name = classifier.name();
    let task = AssertUnwindSafe(classifier.classify(frame)).catch_unwind();

    let caught = match timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(caught) => caught,
            Err(_) => {
                return Err(EmoScopeError::Classifier(format!(
                    "{name}: timed out after {limit:?}"
                )))
            }
        },
        None => task.await,
    };

    caught.unwrap_or_else(|_| {
        Err(EmoScopeError::Classifier(format!(
            "{name}: classifier panicked"
        )))
    })
}
