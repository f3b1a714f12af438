//! Polled notification inbox.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::WorkflowResult;
use crate::api::{ClinicClient, Transport};
use crate::models::NotificationFeed;
use crate::session::Session;

/// Keeps the latest notification feed, fetching at most once per interval.
pub struct NotificationInbox<T: Transport> {
    client: Arc<ClinicClient<T>>,
    interval: Duration,
    feed: NotificationFeed,
    last_poll: Option<Instant>,
}

impl<T: Transport> NotificationInbox<T> {
    pub fn new(client: Arc<ClinicClient<T>>, interval: Duration) -> Self {
        Self {
            client,
            interval,
            feed: NotificationFeed::default(),
            last_poll: None,
        }
    }

    pub fn feed(&self) -> &NotificationFeed {
        &self.feed
    }

    pub fn unread_count(&self) -> u32 {
        self.feed.unread_count
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_poll {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Fetch if the interval has elapsed. Returns whether the feed was
    /// replaced.
    pub fn poll_if_due(&mut self, session: &Session, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.poll(session, now)
    }

    /// Fetch now. A failure keeps the previous feed.
    pub fn poll(&mut self, session: &Session, now: Instant) -> bool {
        self.last_poll = Some(now);
        match self.client.notifications(session) {
            Ok(feed) => {
                log::debug!(
                    "Fetched {} notifications, {} unread",
                    feed.notifications.len(),
                    feed.unread_count
                );
                self.feed = feed;
                true
            }
            Err(e) => {
                log::warn!("Notification poll failed: {}", e);
                false
            }
        }
    }

    /// Mark one notification read on the server, then locally.
    pub fn mark_read(&mut self, session: &Session, id: u64) -> WorkflowResult<()> {
        self.client.mark_notification_read(session, id)?;
        self.feed.mark_read(id);
        Ok(())
    }

    pub fn mark_all_read(&mut self, session: &Session) -> WorkflowResult<()> {
        self.client.mark_all_notifications_read(session)?;
        self.feed.mark_all_read();
        Ok(())
    }
}
