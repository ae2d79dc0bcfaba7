use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    Salah,
    Events,
    Updates,
    Blog,
    Courses,
    Ramadan,
    Friday,
}

impl NotificationCategory {
    pub const ALL: [NotificationCategory; 7] = [
        NotificationCategory::Salah,
        NotificationCategory::Events,
        NotificationCategory::Updates,
        NotificationCategory::Blog,
        NotificationCategory::Courses,
        NotificationCategory::Ramadan,
        NotificationCategory::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::Salah => "salah",
            NotificationCategory::Events => "events",
            NotificationCategory::Updates => "updates",
            NotificationCategory::Blog => "blog",
            NotificationCategory::Courses => "courses",
            NotificationCategory::Ramadan => "ramadan",
            NotificationCategory::Friday => "friday",
        }
    }

    /// Label used on a posted notification.
    pub fn label(&self) -> &'static str {
        match self {
            NotificationCategory::Salah => "Salah Reminder",
            NotificationCategory::Events => "Event",
            NotificationCategory::Updates => "School Update",
            NotificationCategory::Blog => "Blog Post",
            NotificationCategory::Courses => "New Course",
            NotificationCategory::Ramadan => "Ramadan Program",
            NotificationCategory::Friday => "Friday Reminder",
        }
    }

    /// Label used when listing what someone subscribed to.
    pub fn subscription_label(&self) -> &'static str {
        match self {
            NotificationCategory::Salah => "Salah Reminders",
            NotificationCategory::Events => "Events",
            NotificationCategory::Updates => "Updates from School",
            NotificationCategory::Blog => "Blog Posts",
            NotificationCategory::Courses => "New Courses",
            NotificationCategory::Ramadan => "Ramadan Programs",
            NotificationCategory::Friday => "Friday Reminders",
        }
    }
}

impl FromStr for NotificationCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationCategory::ALL
            .iter()
            .find(|c| c.as_str() == s.to_lowercase())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Unknown notification category: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn badge(&self) -> Option<&'static str> {
        match self {
            Priority::Normal => None,
            Priority::High => Some("HIGH"),
            Priority::Urgent => Some("URGENT"),
        }
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(anyhow::anyhow!("Unknown priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub category: NotificationCategory,
    pub priority: Priority,
    pub posted_at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub categories: Vec<NotificationCategory>,
    pub subscribed_at: DateTime<Utc>,
    pub active: bool,
}
