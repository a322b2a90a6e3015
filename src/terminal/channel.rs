//! 会话事件通道
//!
//! 无界 FIFO：读线程与会话操作入队，宿主定时整批取出。两端都不阻塞等待。

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::events::{EventKind, SessionEvent};

#[derive(Debug, Default)]
pub struct EventChannel {
    queue: Mutex<VecDeque<SessionEvent>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, event: SessionEvent) {
        self.queue.lock().push_back(event);
    }

    pub fn push(&self, kind: EventKind, text: impl Into<String>) {
        self.enqueue(SessionEvent::new(kind, text));
    }

    /// 原子地取出当前所有事件（按入队顺序），没有事件时返回空
    pub fn drain_all(&self) -> Vec<SessionEvent> {
        self.queue.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}
