//! 会话事件总线

use tokio::sync::broadcast;

use es_core::Event;

/// 默认缓冲容量
const DEFAULT_CAPACITY: usize = 256;

/// 事件总线 (广播, 慢订阅者丢弃旧事件)
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// 创建新总线
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// 发布事件 (没有订阅者时直接丢弃)
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// 订阅事件
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
