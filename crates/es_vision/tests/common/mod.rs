//! 集成测试共用的假采集源与分类器

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use es_core::{EmoScopeError, Emotion, Frame, PixelFormat, Result};
use es_vision::{
    CaptureConfig, CaptureController, CaptureSource, CaptureStream, DisplayState,
    EmotionClassifier, EventBus, InferenceDispatcher, LabelOrdering,
};

/// 假摄像头的共享计数
#[derive(Debug, Default)]
pub struct CameraProbe {
    pub opens: AtomicUsize,
    pub releases: AtomicUsize,
    /// 当前未释放的句柄数
    pub live_handles: AtomicUsize,
    /// 同时存在的最大句柄数
    pub peak_handles: AtomicUsize,
    pub reads: AtomicUsize,
    /// 释放之后仍被读取的次数
    pub reads_after_release: AtomicUsize,
    /// 预设的读帧结果 (true = 成功), 用完后一律成功
    pub read_script: Mutex<VecDeque<bool>>,
}

impl CameraProbe {
    pub fn live(&self) -> usize {
        self.live_handles.load(Ordering::SeqCst)
    }

    pub fn script_reads(&self, results: &[bool]) {
        self.read_script.lock().unwrap().extend(results.iter().copied());
    }
}

/// 假摄像头
pub struct FakeCamera {
    pub probe: Arc<CameraProbe>,
    pub available: bool,
}

impl CaptureSource for FakeCamera {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn open(&self, device_id: u32) -> Result<Box<dyn CaptureStream>> {
        if !self.available {
            return Err(EmoScopeError::DeviceUnavailable {
                device_id,
                reason: "unplugged".to_string(),
            });
        }

        self.probe.opens.fetch_add(1, Ordering::SeqCst);
        let live = self.probe.live_handles.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.peak_handles.fetch_max(live, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            probe: self.probe.clone(),
            released: false,
        }))
    }
}

struct FakeStream {
    probe: Arc<CameraProbe>,
    released: bool,
}

impl CaptureStream for FakeStream {
    fn read_frame(&mut self) -> Result<Frame> {
        self.probe.reads.fetch_add(1, Ordering::SeqCst);
        if self.released {
            self.probe.reads_after_release.fetch_add(1, Ordering::SeqCst);
        }

        let ok = self.probe.read_script.lock().unwrap().pop_front().unwrap_or(true);
        if !ok {
            return Err(EmoScopeError::FrameRead("buffering".to_string()));
        }
        Frame::new(2, 2, PixelFormat::Bgr8, vec![10, 20, 30].repeat(4))
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.probe.releases.fetch_add(1, Ordering::SeqCst);
            self.probe.live_handles.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// 固定结果分类器，记录调用次数
pub struct StaticClassifier {
    pub label: Option<&'static str>,
    pub calls: AtomicUsize,
}

impl StaticClassifier {
    pub fn detecting(label: &'static str) -> Self {
        Self {
            label: Some(label),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn no_face() -> Self {
        Self {
            label: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmotionClassifier for StaticClassifier {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn classify(&self, _frame: Frame) -> Result<Emotion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.label {
            Some(label) => Ok(Emotion::from_label(label)),
            None => Err(EmoScopeError::NoFaceDetected),
        }
    }
}

/// 按帧序号闸门放行的分类器，用于控制任务完成顺序
#[derive(Default)]
pub struct GatedClassifier {
    gates: Mutex<HashMap<u64, oneshot::Receiver<Result<Emotion>>>>,
}

impl GatedClassifier {
    /// 为某帧序号注册闸门，返回放行端
    pub fn gate(&self, sequence: u64) -> oneshot::Sender<Result<Emotion>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(sequence, rx);
        tx
    }
}

#[async_trait]
impl EmotionClassifier for GatedClassifier {
    fn name(&self) -> &'static str {
        "gated"
    }

    async fn classify(&self, frame: Frame) -> Result<Emotion> {
        let gate = self.gates.lock().unwrap().remove(&frame.sequence());
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(EmoScopeError::Classifier("gate dropped".into()))),
            None => Err(EmoScopeError::Classifier("no gate registered".into())),
        }
    }
}

/// 测试装配
pub struct Harness {
    pub controller: CaptureController,
    pub probe: Arc<CameraProbe>,
    pub display: Arc<DisplayState>,
    pub events: EventBus,
}

pub fn harness(
    classifier: Arc<dyn EmotionClassifier>,
    available: bool,
    config: CaptureConfig,
) -> Harness {
    let probe = Arc::new(CameraProbe::default());
    let display = Arc::new(DisplayState::new(LabelOrdering::Freshest));
    let events = EventBus::default();
    let dispatcher = InferenceDispatcher::new(
        classifier,
        display.clone(),
        events.clone(),
        tokio::runtime::Handle::current(),
    );
    let controller = CaptureController::new(
        Box::new(FakeCamera {
            probe: probe.clone(),
            available,
        }),
        dispatcher,
        display.clone(),
        events.clone(),
        config,
    );

    Harness {
        controller,
        probe,
        display,
        events,
    }
}

/// 等待所有在途推理结束
pub async fn settle(controller: &CaptureController) {
    for _ in 0..1000 {
        if controller.dispatcher().in_flight() == 0 {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("inference tasks did not settle");
}

/// 构造带序号的测试帧
pub fn frame(sequence: u64) -> Frame {
    Frame::new(1, 1, PixelFormat::Rgb8, vec![0, 0, 0])
        .unwrap()
        .with_sequence(sequence)
}
