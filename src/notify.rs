//! Всплывающие уведомления.
//!
//! Очередь коротких сообщений, которые интерфейс показывает и закрывает.
//! Каждое уведомление дублируется в лог.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: Level,
    pub message: String,
}

#[derive(Debug, Default)]
struct Queue {
    next_id: u64,
    items: VecDeque<Notification>,
}

/// Общая очередь уведомлений. Клонирование даёт ту же очередь.
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    inner: Arc<Mutex<Queue>>,
}

// Старые уведомления вытесняются, если их никто не закрывает
const MAX_VISIBLE: usize = 5;

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: Level, message: impl Into<String>) -> u64 {
        let message = message.into();
        match level {
            Level::Error => error!("{}", message),
            Level::Warning => warn!("{}", message),
            Level::Info | Level::Success => info!("{}", message),
        }

        let mut queue = self.lock();
        queue.next_id += 1;
        let id = queue.next_id;
        queue.items.push_back(Notification { id, level, message });
        while queue.items.len() > MAX_VISIBLE {
            queue.items.pop_front();
        }
        id
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(Level::Info, message)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(Level::Success, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.push(Level::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(Level::Error, message)
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut queue = self.lock();
        let before = queue.items.len();
        queue.items.retain(|n| n.id != id);
        queue.items.len() != before
    }

    pub fn visible(&self) -> Vec<Notification> {
        self.lock().items.iter().cloned().collect()
    }

    /// Забирает все уведомления (например, чтобы напечатать их в терминал).
    pub fn drain(&self) -> Vec<Notification> {
        self.lock().items.drain(..).collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.lock().items.back().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Queue> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
