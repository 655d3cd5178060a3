//! # es_core - EmoScope Core Primitives
//!
//! 核心原语层，定义帧快照、情绪标签与状态文本、会话事件以及全局错误处理机制。
//! 此 crate 是整个项目的基础依赖，不依赖其他业务 crate。

pub mod emotion;
pub mod error;
pub mod event;
pub mod frame;

pub use emotion::{Emotion, StatusText};
pub use error::{EmoScopeError, Result};
pub use event::{Event, EventKind, SessionId};
pub use frame::{Frame, PixelFormat};
