use chrono::{DateTime, NaiveTime, Utc};
use std::path::Path;
use thiserror::Error;

use crate::config::settings::AdminConfig;
use crate::db::StoreError;
use crate::db::repository::Repository;
use crate::models::{
    DailyPrayerTimes, DayOverride, DelayConfig, Enrollment, MediaItem, MediaType, MediaUpload,
    Notification, NotificationCategory, PrayerType, Priority, Question, Subscription,
    WeeklyCategory,
};
use crate::prayer_times::{ScheduleDeriver, TimesProvider};

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("incorrect admin password")]
    Denied,

    #[error("{0}")]
    Invalid(String),

    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Compares a passphrase against the configured one.
///
/// The passphrase only keeps casual visitors away from the admin commands;
/// it ships in plain text in the config file.
pub struct AdminGate<'a> {
    passphrase: &'a str,
}

/// Proof that the gate was passed. Every mutating admin operation hangs
/// off this type, so none can run without it.
#[derive(Debug)]
pub struct AdminSession {
    _unlocked: (),
}

impl<'a> AdminGate<'a> {
    pub fn new(config: &'a AdminConfig) -> Self {
        Self {
            passphrase: &config.passphrase,
        }
    }

    pub fn unlock(&self, attempt: &str) -> Result<AdminSession, AdminError> {
        if attempt == self.passphrase {
            Ok(AdminSession { _unlocked: () })
        } else {
            log::warn!("rejected admin passphrase");
            Err(AdminError::Denied)
        }
    }
}

fn parse_24h(prayer: PrayerType, what: &str, value: Option<&str>) -> Result<String, AdminError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AdminError::Invalid(format!("{} {} time is required", prayer, what)))?;
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| {
            AdminError::Invalid(format!(
                "{} {} time '{}' is not a 24-hour HH:MM time",
                prayer, what, value
            ))
        })
}

fn complete_24h(what: &str, times: &DailyPrayerTimes) -> Result<DailyPrayerTimes, AdminError> {
    PrayerType::ALL
        .iter()
        .map(|&p| Ok((p, parse_24h(p, what, times.get(p))?)))
        .collect()
}

#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub title: String,
    pub content: String,
    pub category: NotificationCategory,
    pub priority: Priority,
}

#[derive(Debug, Clone)]
pub struct MediaDraft {
    pub title: String,
    pub media_type: MediaType,
    pub weekly_category: Option<WeeklyCategory>,
    pub description: Option<String>,
    pub teacher: Option<String>,
}

pub fn guess_mime(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "pdf" => "application/pdf",
        "epub" => "application/epub+zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

impl AdminSession {
    /// Replace today's call and congregation times verbatim. All ten values
    /// are required; the day's prayer times are kept.
    pub fn set_call_times(
        &self,
        repo: &dyn Repository,
        deriver: &mut ScheduleDeriver,
        call_times: &DailyPrayerTimes,
        congregation_times: &DailyPrayerTimes,
    ) -> Result<DayOverride, AdminError> {
        let call = complete_24h("adhan", call_times)?;
        let congregation = complete_24h("iqaama", congregation_times)?;

        let mut day_override = DayOverride::new(deriver.date(), deriver.times().clone());
        day_override.call_times = Some(call);
        day_override.congregation_times = Some(congregation);

        repo.put_override(&day_override)?;
        deriver.apply_override(day_override.clone());
        log::info!("adhan/iqaama override stored for {}", day_override.date);
        Ok(day_override)
    }

    /// Replace today's five prayer times. Delays still apply.
    pub fn set_prayer_times(
        &self,
        repo: &dyn Repository,
        deriver: &mut ScheduleDeriver,
        times: &DailyPrayerTimes,
    ) -> Result<DayOverride, AdminError> {
        let day_override = DayOverride::new(deriver.date(), complete_24h("prayer", times)?);
        repo.put_override(&day_override)?;
        deriver.apply_override(day_override.clone());
        log::info!("prayer time override stored for {}", day_override.date);
        Ok(day_override)
    }

    /// Merge `patch` into the stored delays and persist the result.
    pub fn set_delays(
        &self,
        repo: &dyn Repository,
        deriver: &mut ScheduleDeriver,
        patch: &DelayConfig,
    ) -> Result<DelayConfig, AdminError> {
        let stored = match repo.get_delays() {
            Ok(Some(d)) => d,
            Ok(None) => DelayConfig::default(),
            Err(e) => {
                log::warn!("replacing unreadable delay configuration: {}", e);
                DelayConfig::default()
            }
        };
        let merged = stored.merged_with(patch);
        repo.put_delays(&merged)?;
        deriver.apply_delays(&merged);
        Ok(merged)
    }

    pub fn clear_override(
        &self,
        repo: &dyn Repository,
        deriver: &mut ScheduleDeriver,
        provider: Option<&dyn TimesProvider>,
    ) -> Result<(), AdminError> {
        repo.clear_override()?;
        deriver.reload(repo, provider);
        Ok(())
    }

    pub fn post_notification(
        &self,
        repo: &dyn Repository,
        draft: &NotificationDraft,
        now: DateTime<Utc>,
    ) -> Result<Notification, AdminError> {
        let title = draft.title.trim();
        let content = draft.content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(AdminError::Invalid(
                "notification title and content are required".to_string(),
            ));
        }
        let mut notification = Notification {
            id: None,
            title: title.to_string(),
            content: content.to_string(),
            category: draft.category,
            priority: draft.priority,
            posted_at: now,
            read: false,
        };
        notification.id = Some(repo.add_notification(&notification)?);
        Ok(notification)
    }

    /// Store the file at `path` inline with its metadata.
    pub fn upload_media(
        &self,
        repo: &dyn Repository,
        draft: &MediaDraft,
        path: &Path,
        now: DateTime<Utc>,
    ) -> Result<MediaItem, AdminError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(AdminError::Invalid("media title is required".to_string()));
        }
        if draft.media_type == MediaType::Weekly && draft.weekly_category.is_none() {
            return Err(AdminError::Invalid(
                "weekly teachings need a weekly category".to_string(),
            ));
        }

        let data = std::fs::read(path).map_err(|source| AdminError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if data.is_empty() {
            return Err(AdminError::Invalid(format!("{} is empty", path.display())));
        }
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        let upload = MediaUpload {
            item: MediaItem {
                id: None,
                title: title.to_string(),
                media_type: draft.media_type,
                weekly_category: match draft.media_type {
                    MediaType::Weekly => draft.weekly_category,
                    _ => None,
                },
                description: draft.description.clone().unwrap_or_default(),
                teacher: draft.teacher.clone().unwrap_or_default(),
                mime_type: guess_mime(&file_name).to_string(),
                file_name,
                file_size: data.len() as u64,
                uploaded_at: now,
                download_count: 0,
            },
            data,
        };
        let id = repo.add_media(&upload)?;
        let mut item = upload.item;
        item.id = Some(id);
        log::info!("uploaded '{}' ({} bytes)", item.title, item.file_size);
        Ok(item)
    }

    // ─── Submissions ─────────────────────────────────────────────────────────

    pub fn subscribers(&self, repo: &dyn Repository) -> Result<Vec<Subscription>, AdminError> {
        Ok(repo.list_subscriptions()?)
    }

    pub fn questions(&self, repo: &dyn Repository) -> Result<Vec<Question>, AdminError> {
        Ok(repo.list_questions()?)
    }

    pub fn enrollments(&self, repo: &dyn Repository) -> Result<Vec<Enrollment>, AdminError> {
        Ok(repo.list_enrollments()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::SqliteRepository;
    use crate::models::PrayerDelay;
    use chrono::NaiveDate;
    use std::io::Write;

    fn setup() -> (SqliteRepository, ScheduleDeriver) {
        let repo = SqliteRepository::in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let deriver = ScheduleDeriver::load(&repo, None, DailyPrayerTimes::builtin_default(), date);
        (repo, deriver)
    }

    fn session() -> AdminSession {
        AdminGate::new(&AdminConfig::default()).unlock("kiuma2025").unwrap()
    }

    fn times(values: [&str; 5]) -> DailyPrayerTimes {
        PrayerType::ALL
            .iter()
            .zip(values)
            .map(|(p, v)| (*p, v.to_string()))
            .collect()
    }

    #[test]
    fn wrong_passphrase_is_denied() {
        let config = AdminConfig::default();
        let gate = AdminGate::new(&config);
        assert!(matches!(gate.unlock("KIUMA2025"), Err(AdminError::Denied)));
        assert!(matches!(gate.unlock(" kiuma2025"), Err(AdminError::Denied)));
        assert!(gate.unlock("kiuma2025").is_ok());
    }

    #[test]
    fn call_times_require_all_values() {
        let (repo, mut deriver) = setup();
        let partial = times(["05:15", "12:35", "15:20", "18:40", ""]);
        let congregation = times(["05:25", "12:45", "15:30", "18:45", "20:00"]);

        let err = session()
            .set_call_times(&repo, &mut deriver, &partial, &congregation)
            .unwrap_err();
        assert!(err.to_string().contains("Isha"));
        assert!(repo.get_override(deriver.date()).unwrap().is_none());
    }

    #[test]
    fn call_times_are_adopted_immediately() {
        let (repo, mut deriver) = setup();
        let call = times(["05:15", "12:35", "15:20", "18:40", "19:50"]);
        let congregation = times(["05:25", "12:45", "15:30", "18:45", "20:00"]);
        session()
            .set_call_times(&repo, &mut deriver, &call, &congregation)
            .unwrap();

        assert!(deriver.is_explicit());
        let fajr = deriver.schedule().slot(PrayerType::Fajr).unwrap();
        assert_eq!((fajr.call, fajr.congregation), (Some(315), Some(325)));
        let stored = repo.get_override(deriver.date()).unwrap().unwrap();
        assert_eq!(stored.times, DailyPrayerTimes::builtin_default());
    }

    #[test]
    fn twelve_hour_input_is_rejected() {
        let (repo, mut deriver) = setup();
        let t = times(["5:15 AM", "12:35", "15:20", "18:40", "19:50"]);
        assert!(matches!(
            session().set_prayer_times(&repo, &mut deriver, &t),
            Err(AdminError::Invalid(_))
        ));
    }

    #[test]
    fn delays_merge_into_stored_config() {
        let (repo, mut deriver) = setup();
        let mut first = DelayConfig::empty();
        first.set(PrayerType::Fajr, PrayerDelay::new(20, 10));
        session().set_delays(&repo, &mut deriver, &first).unwrap();

        let mut second = DelayConfig::empty();
        second.set(PrayerType::Isha, PrayerDelay::new(0, 15));
        let merged = session().set_delays(&repo, &mut deriver, &second).unwrap();

        assert_eq!(merged.delay_for(PrayerType::Fajr), PrayerDelay::new(20, 10));
        assert_eq!(merged.delay_for(PrayerType::Isha), PrayerDelay::new(0, 15));
        assert_eq!(repo.get_delays().unwrap(), Some(merged));
        // 05:30 - 20
        assert_eq!(deriver.schedule().slot(PrayerType::Fajr).unwrap().call, Some(310));
    }

    #[test]
    fn clearing_override_restores_fallback() {
        let (repo, mut deriver) = setup();
        let t = times(["04:00", "12:00", "15:00", "18:00", "19:00"]);
        session().set_prayer_times(&repo, &mut deriver, &t).unwrap();
        assert_eq!(deriver.times().get(PrayerType::Fajr), Some("04:00"));

        session().clear_override(&repo, &mut deriver, None).unwrap();
        assert_eq!(deriver.times().get(PrayerType::Fajr), Some("05:30"));
    }

    #[test]
    fn notification_is_posted() {
        let repo = SqliteRepository::in_memory().unwrap();
        let draft = NotificationDraft {
            title: " Jumu'ah khutbah ".to_string(),
            content: "Starts at 1pm".to_string(),
            category: NotificationCategory::Friday,
            priority: Priority::Urgent,
        };
        let posted = session().post_notification(&repo, &draft, Utc::now()).unwrap();
        assert_eq!(posted.title, "Jumu'ah khutbah");
        assert_eq!(repo.list_notifications().unwrap().len(), 1);
    }

    #[test]
    fn weekly_upload_needs_category() {
        let repo = SqliteRepository::in_memory().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ID3 audio").unwrap();

        let mut draft = MediaDraft {
            title: "Tafsir week 3".to_string(),
            media_type: MediaType::Weekly,
            weekly_category: None,
            description: None,
            teacher: Some("Imam Fahad".to_string()),
        };
        assert!(matches!(
            session().upload_media(&repo, &draft, file.path(), Utc::now()),
            Err(AdminError::Invalid(_))
        ));

        draft.weekly_category = Some(WeeklyCategory::Tafsir);
        let item = session()
            .upload_media(&repo, &draft, file.path(), Utc::now())
            .unwrap();
        assert_eq!(item.file_size, 9);
        assert!(item.id.is_some());
        assert_eq!(repo.list_media(Some(MediaType::Weekly)).unwrap().len(), 1);
    }

    #[test]
    fn submissions_are_listed_for_the_session() {
        let repo = SqliteRepository::in_memory().unwrap();
        let subscription = Subscription {
            id: None,
            name: "Amina".to_string(),
            email: "amina@example.com".to_string(),
            phone: None,
            categories: vec![NotificationCategory::Salah, NotificationCategory::Friday],
            subscribed_at: Utc::now(),
            active: true,
        };
        repo.add_subscription(&subscription).unwrap();

        let listed = session().subscribers(&repo).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].categories, subscription.categories);
        assert!(session().questions(&repo).unwrap().is_empty());
        assert!(session().enrollments(&repo).unwrap().is_empty());
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(guess_mime("lecture.MP3"), "audio/mpeg");
        assert_eq!(guess_mime("book.pdf"), "application/pdf");
        assert_eq!(guess_mime("README"), "application/octet-stream");
    }
}
