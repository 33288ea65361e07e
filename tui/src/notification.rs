//! Banner notifications for management outcomes.
//!
//! Every save, export, import or reset produces one [`Notification`] that
//! stays visible for a fixed time and then expires. The center keeps a
//! short bounded history; only the newest live entry is shown.

use dashdeck_core::Outcome;


// ---------------------------------------------------------------------------
// NotificationType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Success,
    Error,
    /// Neutral status text (e.g. "Importing ...").
    Info,
}


// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub notification_type: NotificationType,
    pub body: String,
    /// Timestamp (ms since epoch) when the notification was created.
    pub created_ms: u64,
    /// `None` keeps the notification until it is dismissed or replaced.
    pub ttl_ms: Option<u64>,
}

impl Notification {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self.ttl_ms {
            Some(ttl) => now_ms.saturating_sub(self.created_ms) >= ttl,
            None => false,
        }
    }
}


// ---------------------------------------------------------------------------
// NotificationCenter
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct NotificationCenter {
    notifications: Vec<Notification>,
    max_entries: usize,
    ttl_ms: u64,
    next_id: u64,
}

impl NotificationCenter {
    /// A center whose outcome banners expire after `ttl_ms`.
    pub fn new(ttl_ms: u64) -> Self {
        NotificationCenter {
            notifications: Vec::new(),
            max_entries: 20,
            ttl_ms,
            next_id: 1,
        }
    }

    /// Add a notification. Returns its ID.
    pub fn push(
        &mut self,
        notification_type: NotificationType,
        body: &str,
        now_ms: u64,
        ttl_ms: Option<u64>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.notifications.push(Notification {
            id,
            notification_type,
            body: body.to_string(),
            created_ms: now_ms,
            ttl_ms,
        });
        if self.notifications.len() > self.max_entries {
            let excess = self.notifications.len() - self.max_entries;
            self.notifications.drain(..excess);
        }
        id
    }

    /// Show `outcome` as a success or error banner with the default TTL.
    pub fn push_outcome(&mut self, outcome: &Outcome, now_ms: u64) -> u64 {
        let kind = if outcome.success {
            NotificationType::Success
        } else {
            NotificationType::Error
        };
        self.push(kind, &outcome.message, now_ms, Some(self.ttl_ms))
    }

    pub fn prune(&mut self, now_ms: u64) {
        self.notifications.retain(|n| !n.is_expired(now_ms));
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() < before
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// The newest notification that has not expired at `now_ms`.
    pub fn current(&self, now_ms: u64) -> Option<&Notification> {
        self.notifications.iter().rev().find(|n| !n.is_expired(now_ms))
    }
}


impl Default for NotificationCenter {
    fn default() -> Self {
        NotificationCenter::new(3000)
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
