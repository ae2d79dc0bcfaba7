use chrono::{DateTime, Utc};

use crate::db::StoreError;
use crate::db::repository::Repository;
use crate::models::Notification;
use crate::utils::format::time_ago;

/// A notification prepared for display.
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeView {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub label: &'static str,
    pub badge: Option<&'static str>,
    pub age: String,
    pub unread: bool,
}

impl NoticeView {
    pub fn from_notification(n: &Notification, now: DateTime<Utc>) -> Self {
        Self {
            id: n.id,
            title: n.title.clone(),
            content: n.content.clone(),
            label: n.category.label(),
            badge: n.priority.badge(),
            age: time_ago(n.posted_at, now),
            unread: !n.read,
        }
    }
}

/// Newest first. An unreadable store shows as an empty list.
pub fn list_notices(repo: &dyn Repository, now: DateTime<Utc>) -> Vec<NoticeView> {
    match repo.list_notifications() {
        Ok(list) => list
            .iter()
            .map(|n| NoticeView::from_notification(n, now))
            .collect(),
        Err(e) => {
            log::warn!("could not load notifications: {}", e);
            Vec::new()
        }
    }
}

pub fn unread_count(notices: &[NoticeView]) -> usize {
    notices.iter().filter(|n| n.unread).count()
}

pub fn mark_read(repo: &dyn Repository, id: i64) -> Result<bool, StoreError> {
    let found = repo.mark_notification_read(id)?;
    if !found {
        log::debug!("no notification with id {}", id);
    }
    Ok(found)
}
