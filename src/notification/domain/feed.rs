//! Client-side notification feed with local read and hidden overlays.
//!
//! The server list is never modified from here: reading and hiding are
//! tracked as id sets that the tracker persists locally. Every notification,
//! whether it arrives from the initial load, a poll or a push, goes through
//! [`NotificationFeed::ingest`], which de-duplicates by id.

use super::{Notification, NotificationId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A visible notification with its local read flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// The server record.
    pub notification: Notification,
    /// Whether the user has read it on this device.
    pub is_read_local: bool,
}

/// What [`NotificationFeed::ingest`] did with a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The user hid this id earlier; it stays out of the list.
    Hidden,
    /// The id is already listed.
    Duplicate,
    /// The notification was inserted.
    Added {
        /// Whether it counts towards the unread badge.
        unread: bool,
    },
}

impl IngestOutcome {
    /// Returns whether a desktop alert should be raised.
    #[must_use]
    pub const fn should_alert(self) -> bool {
        matches!(self, Self::Added { unread: true })
    }
}

/// Notification list merged with the local overlays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationFeed {
    items: Vec<Notification>,
    read: BTreeSet<NotificationId>,
    hidden: BTreeSet<NotificationId>,
    highest_seen: Option<NotificationId>,
}

impl NotificationFeed {
    /// Creates an empty feed with persisted overlays.
    #[must_use]
    pub const fn with_overlays(read: BTreeSet<NotificationId>, hidden: BTreeSet<NotificationId>) -> Self {
        Self {
            items: Vec::new(),
            read,
            hidden,
            highest_seen: None,
        }
    }

    /// Replaces the list with a fresh server snapshot.
    ///
    /// `seen_before` is [`Self::last_seen`] taken when the fetch started.
    /// Listed notifications above both it and the snapshot's newest id
    /// arrived while the snapshot was in flight and are kept, since later
    /// polls only ask for ids above them.
    pub fn replace_all(
        &mut self,
        notifications: impl IntoIterator<Item = Notification>,
        seen_before: Option<NotificationId>,
    ) {
        let snapshot: Vec<Notification> = notifications.into_iter().collect();
        let boundary = snapshot
            .iter()
            .map(|notification| Some(notification.id))
            .fold(seen_before, Option::max);
        self.items.retain(|existing| Some(existing.id) > boundary);
        for notification in snapshot {
            self.ingest(notification);
        }
    }

    /// Merges one notification keyed by id.
    pub fn ingest(&mut self, notification: Notification) -> IngestOutcome {
        let id = notification.id;
        self.highest_seen = self.highest_seen.max(Some(id));
        if self.hidden.contains(&id) {
            return IngestOutcome::Hidden;
        }
        if self.items.iter().any(|existing| existing.id == id) {
            return IngestOutcome::Duplicate;
        }
        let position = self
            .items
            .iter()
            .position(|existing| newer_first(&notification, existing))
            .unwrap_or(self.items.len());
        self.items.insert(position, notification);
        IngestOutcome::Added {
            unread: !self.read.contains(&id),
        }
    }

    /// Marks one notification, or every visible one, as read.
    ///
    /// Returns whether the read set changed; repeating a call is a no-op.
    pub fn mark_as_read(&mut self, id: Option<NotificationId>) -> bool {
        match id {
            Some(single) => self.read.insert(single),
            None => {
                let before = self.read.len();
                self.read.extend(self.items.iter().map(|item| item.id));
                self.read.len() != before
            }
        }
    }

    /// Hides one notification locally; returns whether the hidden set
    /// changed.
    pub fn hide(&mut self, id: NotificationId) -> bool {
        self.items.retain(|item| item.id != id);
        self.hidden.insert(id)
    }

    /// Hides every visible notification.
    pub fn hide_all(&mut self) {
        self.hidden.extend(self.items.iter().map(|item| item.id));
        self.items.clear();
    }

    /// Forgets every hidden id.
    pub fn restore_hidden(&mut self) {
        self.hidden.clear();
    }

    /// Forgets every local overlay and the listed notifications.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns the visible notifications, newest first.
    #[must_use]
    pub fn visible(&self) -> Vec<FeedItem> {
        self.items
            .iter()
            .map(|notification| FeedItem {
                notification: notification.clone(),
                is_read_local: self.read.contains(&notification.id),
            })
            .collect()
    }

    /// Returns the raw visible notifications, newest first.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.items
    }

    /// Counts visible notifications not read locally.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| !self.read.contains(&item.id))
            .count()
    }

    /// Returns the highest id ever ingested, hidden ones included.
    #[must_use]
    pub const fn last_seen(&self) -> Option<NotificationId> {
        self.highest_seen
    }

    /// Returns the locally read ids.
    #[must_use]
    pub const fn read_ids(&self) -> &BTreeSet<NotificationId> {
        &self.read
    }

    /// Returns the locally hidden ids.
    #[must_use]
    pub const fn hidden_ids(&self) -> &BTreeSet<NotificationId> {
        &self.hidden
    }
}

fn newer_first(candidate: &Notification, existing: &Notification) -> bool {
    (candidate.created_at, candidate.id) > (existing.created_at, existing.id)
}
