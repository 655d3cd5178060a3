//! # es_vision - EmoScope Capture Loop
//!
//! 采集循环：会话控制器按固定节拍读帧，推理分发器在 tick 之外并发跑分类，
//! 共享显示状态收集最新画面与情绪标签供呈现层读取。

pub mod capture;
pub mod classifier;
pub mod config;
pub mod controller;
pub mod convert;
pub mod dispatcher;
pub mod display;
pub mod driver;
pub mod events;
pub mod session;
pub mod synthetic;

pub use capture::{CaptureSource, CaptureStream};
pub use classifier::{EmotionClassifier, InferenceOutcome};
pub use config::{CaptureConfig, InferenceConfig, LabelOrdering, StartPolicy};
pub use controller::{CaptureController, TickOutcome};
pub use dispatcher::InferenceDispatcher;
pub use display::{DisplayImage, DisplayState, RepaintHook};
pub use driver::TickDriver;
pub use events::EventBus;
pub use session::{Session, SessionState, SessionStats};
pub use synthetic::{SyntheticCamera, SyntheticConfig};

pub use es_core::{EmoScopeError, Result};
