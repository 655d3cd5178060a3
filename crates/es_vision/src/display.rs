//! 共享显示状态
//!
//! 画面与情绪标签是两个独立的槽位，各自最后写入生效，互不构成事务。
//! 写入可能来自任意线程 (采集 tick、推理任务)，读取只发生在呈现上下文。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use es_core::StatusText;

use crate::config::LabelOrdering;

/// 呈现层唤醒回调 (例如 egui 的 `request_repaint`)
pub type RepaintHook = Arc<dyn Fn() + Send + Sync>;

/// 可显示图像 (RGBA)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    /// 来源帧序号
    pub frame_sequence: u64,
}

/// 标签槽位
#[derive(Debug, Default)]
struct LabelSlot {
    status: StatusText,
    /// 最近一次被采纳的推理结果的帧序号
    applied_sequence: Option<u64>,
}

/// 共享显示状态
pub struct DisplayState {
    image: Mutex<Option<Arc<DisplayImage>>>,
    /// 每次画面写入 (含清空) 递增
    image_generation: AtomicU64,
    label: Mutex<LabelSlot>,
    ordering: LabelOrdering,
    repaint: OnceLock<RepaintHook>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DisplayState {
    /// 创建新显示状态, 初始标签为 `Idle`
    pub fn new(ordering: LabelOrdering) -> Self {
        Self {
            image: Mutex::new(None),
            image_generation: AtomicU64::new(0),
            label: Mutex::new(LabelSlot::default()),
            ordering,
            repaint: OnceLock::new(),
        }
    }

    /// 注册呈现层唤醒回调 (只能注册一次)
    pub fn set_repaint_hook(&self, hook: RepaintHook) -> bool {
        self.repaint.set(hook).is_ok()
    }

    fn request_repaint(&self) {
        if let Some(hook) = self.repaint.get() {
            hook();
        }
    }

    pub fn ordering(&self) -> LabelOrdering {
        self.ordering
    }

    /// 写入画面
    pub fn set_image(&self, image: DisplayImage) {
        *lock(&self.image) = Some(Arc::new(image));
        self.image_generation.fetch_add(1, Ordering::Release);
        self.request_repaint();
    }

    /// 清空画面
    pub fn clear_image(&self) {
        *lock(&self.image) = None;
        self.image_generation.fetch_add(1, Ordering::Release);
        self.request_repaint();
    }

    /// 当前画面
    pub fn image(&self) -> Option<Arc<DisplayImage>> {
        lock(&self.image).clone()
    }

    /// 画面代数，呈现层据此判断是否需要重新上传纹理
    pub fn image_generation(&self) -> u64 {
        self.image_generation.load(Ordering::Acquire)
    }

    /// 无条件写入标签
    pub fn set_label(&self, status: StatusText) {
        lock(&self.label).status = status;
        self.request_repaint();
    }

    /// 写入推理结果标签，返回是否被采纳
    ///
    /// `Freshest` 策略下，序号早于已采纳结果的写入会被丢弃；
    /// `Completion` 策略下总是采纳。
    pub fn publish_result(&self, frame_sequence: u64, status: StatusText) -> bool {
        {
            let mut slot = lock(&self.label);
            if self.ordering == LabelOrdering::Freshest
                && slot.applied_sequence.is_some_and(|applied| frame_sequence < applied)
            {
                return false;
            }
            slot.status = status;
            slot.applied_sequence = Some(frame_sequence);
        }
        self.request_repaint();
        true
    }

    /// 当前标签
    pub fn label(&self) -> StatusText {
        lock(&self.label).status.clone()
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new(LabelOrdering::default())
    }
}
