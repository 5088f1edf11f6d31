//! Outbound notifications (speed tier unlocks).
//!
//! The core only ever calls `notify()`; it never reads notifications back.
//! `NotificationQueue` is the default sink: each entry carries an expiry
//! timestamp and is dropped by `prune()` on a later host tick, so nothing
//! here runs on a timer.

use crate::types::RealTime;
use serde::Serialize;
use std::collections::VecDeque;

/// How long a notification stays visible, in real seconds.
pub const NOTIFICATION_TTL_SECS: f64 = 2.0;

/// Fire-and-forget receiver of player-facing messages.
pub trait NotificationSink {
    fn notify(&mut self, message: &str);
}

/// Collects messages verbatim. Handy for hosts that render their own toasts.
impl NotificationSink for Vec<String> {
    fn notify(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notification {
    pub id:         u64,
    pub content:    String,
    pub expires_at: RealTime,
}

#[derive(Debug, Clone)]
pub struct NotificationQueue {
    entries: VecDeque<Notification>,
    next_id: u64,
    /// Real time of the latest prune; new entries expire relative to it.
    now:     RealTime,
    ttl:     f64,
}

impl NotificationQueue {
    pub fn new(now: RealTime) -> Self {
        Self::with_ttl(now, NOTIFICATION_TTL_SECS)
    }

    pub fn with_ttl(now: RealTime, ttl: f64) -> Self {
        Self {
            entries: VecDeque::new(),
            next_id: 1,
            now,
            ttl,
        }
    }

    /// Drop every entry whose expiry is at or before `now`.
    /// Returns how many were removed.
    pub fn prune(&mut self, now: RealTime) -> usize {
        self.now = self.now.max(now);
        let now = self.now;
        let before = self.entries.len();
        self.entries.retain(|n| n.expires_at > now);
        before - self.entries.len()
    }

    pub fn active(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NotificationSink for NotificationQueue {
    fn notify(&mut self, message: &str) {
        let id = self.next_id;
        self.next_id += 1;
        log::debug!("notification #{id}: {message}");
        self.entries.push_back(Notification {
            id,
            content: message.to_string(),
            expires_at: self.now + self.ttl,
        });
    }
}
