use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::str::FromStr;

use crate::db::error::{StoreError, StoreResult};
use crate::db::migrations::run_migrations;
use crate::models::{
    AcademicLevel, DayOverride, DelayConfig, Enrollment, MediaItem, MediaType, MediaUpload,
    Notification, NotificationCategory, Priority, Program, Question, QuestionCategory,
    Subscription, WeeklyCategory,
};

/// `app_meta` key holding the administrator's [`DayOverride`].
pub const OVERRIDE_KEY: &str = "custom_prayer_times";
/// `app_meta` key holding the stored [`DelayConfig`].
pub const DELAYS_KEY: &str = "custom_delays";

/// Everything the board and its forms persist.
///
/// Reads of JSON-encoded configuration report [`StoreError::Malformed`]
/// instead of guessing; callers decide whether to fall back.
pub trait Repository {
    /// The override stored for `date`, if any. An override for another day
    /// is treated as absent.
    fn get_override(&self, date: NaiveDate) -> StoreResult<Option<DayOverride>>;
    fn put_override(&self, day_override: &DayOverride) -> StoreResult<()>;
    fn clear_override(&self) -> StoreResult<()>;

    fn get_delays(&self) -> StoreResult<Option<DelayConfig>>;
    fn put_delays(&self, delays: &DelayConfig) -> StoreResult<()>;

    fn add_notification(&self, notification: &Notification) -> StoreResult<i64>;
    /// Newest first.
    fn list_notifications(&self) -> StoreResult<Vec<Notification>>;
    /// Returns false when no notification has that id.
    fn mark_notification_read(&self, id: i64) -> StoreResult<bool>;

    fn add_subscription(&self, subscription: &Subscription) -> StoreResult<i64>;
    fn list_subscriptions(&self) -> StoreResult<Vec<Subscription>>;

    fn add_media(&self, upload: &MediaUpload) -> StoreResult<i64>;
    /// Metadata only, newest first, optionally narrowed to one type.
    fn list_media(&self, media_type: Option<MediaType>) -> StoreResult<Vec<MediaItem>>;
    fn get_media(&self, id: i64) -> StoreResult<Option<MediaUpload>>;
    fn record_download(&self, id: i64) -> StoreResult<()>;

    fn add_question(&self, question: &Question) -> StoreResult<i64>;
    fn list_questions(&self) -> StoreResult<Vec<Question>>;

    fn add_enrollment(&self, enrollment: &Enrollment) -> StoreResult<i64>;
    fn list_enrollments(&self) -> StoreResult<Vec<Enrollment>>;

    /// Moves whenever another connection commits. Two equal readings mean
    /// nothing changed underneath this handle in between.
    fn data_version(&self) -> StoreResult<i64>;
}

pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open (or create) the database file and bring its schema up to date.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        // Enable WAL mode so the CLI can write while the board is open
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    // ─── Meta ────────────────────────────────────────────────────────────────

    pub fn get_meta(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM app_meta WHERE key = ?1",
                params![key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten())
    }

    pub fn set_meta(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO app_meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete_meta(&self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM app_meta WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get_meta(key)? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Malformed {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    fn put_json<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set_meta(key, &raw)
    }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn invalid(table: &'static str, detail: impl ToString) -> StoreError {
    StoreError::InvalidRecord {
        table,
        detail: detail.to_string(),
    }
}

fn parse_field<T>(table: &'static str, value: &str) -> StoreResult<T>
where
    T: FromStr<Err = anyhow::Error>,
{
    T::from_str(value).map_err(|e| invalid(table, e))
}

fn parse_timestamp(table: &'static str, value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| invalid(table, format!("timestamp '{}': {}", value, e)))
}

fn encode_list<T: Serialize>(table: &'static str, items: &[T]) -> StoreResult<String> {
    serde_json::to_string(items).map_err(|e| invalid(table, e))
}

fn decode_list<T: DeserializeOwned>(table: &'static str, raw: &str) -> StoreResult<Vec<T>> {
    serde_json::from_str(raw).map_err(|e| invalid(table, format!("list '{}': {}", raw, e)))
}

const MEDIA_COLUMNS: &str = "id, title, media_type, weekly_category, description, teacher,
     file_name, file_size, mime_type, uploaded_at, download_count";

type MediaRow = (
    i64,
    String,
    String,
    Option<String>,
    String,
    String,
    String,
    i64,
    String,
    String,
    i64,
);

fn media_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MediaRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
    ))
}

fn media_item(raw: MediaRow) -> StoreResult<MediaItem> {
    let (id, title, media_type, weekly, description, teacher, file_name, size, mime, uploaded, count) =
        raw;
    Ok(MediaItem {
        id: Some(id),
        title,
        media_type: parse_field("media", &media_type)?,
        weekly_category: weekly
            .as_deref()
            .map(|c| parse_field::<WeeklyCategory>("media", c))
            .transpose()?,
        description,
        teacher,
        file_name,
        file_size: size.max(0) as u64,
        mime_type: mime,
        uploaded_at: parse_timestamp("media", &uploaded)?,
        download_count: count.max(0) as u32,
    })
}

impl Repository for SqliteRepository {
    // ─── Schedule configuration ──────────────────────────────────────────────

    fn get_override(&self, date: NaiveDate) -> StoreResult<Option<DayOverride>> {
        let stored: Option<DayOverride> = self.get_json(OVERRIDE_KEY)?;
        Ok(stored.filter(|o| o.date == date))
    }

    fn put_override(&self, day_override: &DayOverride) -> StoreResult<()> {
        self.put_json(OVERRIDE_KEY, day_override)
    }

    fn clear_override(&self) -> StoreResult<()> {
        self.delete_meta(OVERRIDE_KEY)
    }

    fn get_delays(&self) -> StoreResult<Option<DelayConfig>> {
        self.get_json(DELAYS_KEY)
    }

    fn put_delays(&self, delays: &DelayConfig) -> StoreResult<()> {
        self.put_json(DELAYS_KEY, delays)
    }

    // ─── Notifications ───────────────────────────────────────────────────────

    fn add_notification(&self, n: &Notification) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO notifications (title, content, category, priority, posted_at, read)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                n.title,
                n.content,
                n.category.as_str(),
                n.priority.as_str(),
                n.posted_at.to_rfc3339(),
                n.read as i32,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_notifications(&self) -> StoreResult<Vec<Notification>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, category, priority, posted_at, read
             FROM notifications ORDER BY posted_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i32>(6)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, title, content, category, priority, posted_at, read) = r?;
            result.push(Notification {
                id: Some(id),
                title,
                content,
                category: parse_field::<NotificationCategory>("notifications", &category)?,
                priority: parse_field::<Priority>("notifications", &priority)?,
                posted_at: parse_timestamp("notifications", &posted_at)?,
                read: read != 0,
            });
        }
        Ok(result)
    }

    fn mark_notification_read(&self, id: i64) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("UPDATE notifications SET read = 1 WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // ─── Subscriptions ───────────────────────────────────────────────────────

    fn add_subscription(&self, s: &Subscription) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO subscriptions (name, email, phone, categories, subscribed_at, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                s.name,
                s.email,
                s.phone,
                encode_list("subscriptions", &s.categories)?,
                s.subscribed_at.to_rfc3339(),
                s.active as i32,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_subscriptions(&self) -> StoreResult<Vec<Subscription>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, phone, categories, subscribed_at, active
             FROM subscriptions ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i32>(6)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, name, email, phone, categories, subscribed_at, active) = r?;
            result.push(Subscription {
                id: Some(id),
                name,
                email,
                phone,
                categories: decode_list("subscriptions", &categories)?,
                subscribed_at: parse_timestamp("subscriptions", &subscribed_at)?,
                active: active != 0,
            });
        }
        Ok(result)
    }

    // ─── Media ───────────────────────────────────────────────────────────────

    fn add_media(&self, upload: &MediaUpload) -> StoreResult<i64> {
        let m = &upload.item;
        self.conn.execute(
            "INSERT INTO media (title, media_type, weekly_category, description, teacher,
                                file_name, file_size, mime_type, data, uploaded_at, download_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                m.title,
                m.media_type.as_str(),
                m.weekly_category.map(|c| c.as_str()),
                m.description,
                m.teacher,
                m.file_name,
                upload.data.len() as i64,
                m.mime_type,
                upload.data,
                m.uploaded_at.to_rfc3339(),
                m.download_count as i64,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_media(&self, media_type: Option<MediaType>) -> StoreResult<Vec<MediaItem>> {
        let sql = format!(
            "SELECT {} FROM media
             WHERE ?1 IS NULL OR media_type = ?1
             ORDER BY uploaded_at DESC, id DESC",
            MEDIA_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![media_type.map(|t| t.as_str())], media_row)?;

        let mut result = Vec::new();
        for r in rows {
            result.push(media_item(r?)?);
        }
        Ok(result)
    }

    fn get_media(&self, id: i64) -> StoreResult<Option<MediaUpload>> {
        let sql = format!("SELECT {}, data FROM media WHERE id = ?1", MEDIA_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![id], |row| {
                Ok((media_row(row)?, row.get::<_, Vec<u8>>(11)?))
            })
            .optional()?;

        match row {
            None => Ok(None),
            Some((raw, data)) => Ok(Some(MediaUpload {
                item: media_item(raw)?,
                data,
            })),
        }
    }

    fn record_download(&self, id: i64) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE media SET download_count = download_count + 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }

    // ─── Questions ───────────────────────────────────────────────────────────

    fn add_question(&self, q: &Question) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO questions (subject, content, category, teacher, name, email, phone, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                q.subject,
                q.content,
                q.category.map(|c| c.as_str()),
                q.teacher,
                q.name,
                q.email,
                q.phone,
                q.submitted_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_questions(&self) -> StoreResult<Vec<Question>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject, content, category, teacher, name, email, phone, submitted_at
             FROM questions ORDER BY submitted_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, subject, content, category, teacher, name, email, phone, submitted_at) = r?;
            let category = match category {
                Some(c) => Some(parse_field::<QuestionCategory>("questions", &c)?),
                None => None,
            };
            result.push(Question {
                id: Some(id),
                subject,
                content,
                category,
                teacher,
                name,
                email,
                phone,
                submitted_at: parse_timestamp("questions", &submitted_at)?,
            });
        }
        Ok(result)
    }

    // ─── Enrollments ─────────────────────────────────────────────────────────

    fn add_enrollment(&self, e: &Enrollment) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO enrollments (programs, name, email, phone, level, year, message, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                encode_list::<Program>("enrollments", &e.programs)?,
                e.name,
                e.email,
                e.phone,
                e.level.as_str(),
                e.year,
                e.message,
                e.submitted_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_enrollments(&self) -> StoreResult<Vec<Enrollment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, programs, name, email, phone, level, year, message, submitted_at
             FROM enrollments ORDER BY submitted_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, programs, name, email, phone, level, year, message, submitted_at) = r?;
            result.push(Enrollment {
                id: Some(id),
                programs: decode_list("enrollments", &programs)?,
                name,
                email,
                phone,
                level: parse_field::<AcademicLevel>("enrollments", &level)?,
                year,
                message,
                submitted_at: parse_timestamp("enrollments", &submitted_at)?,
            });
        }
        Ok(result)
    }

    fn data_version(&self) -> StoreResult<i64> {
        Ok(self
            .conn
            .query_row("PRAGMA data_version", [], |row| row.get(0))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyPrayerTimes, PrayerDelay, PrayerType};
    use chrono::{Duration, TimeZone};

    fn repo() -> SqliteRepository {
        SqliteRepository::in_memory().unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn notice(title: &str, minutes_ago: i64) -> Notification {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        Notification {
            id: None,
            title: title.to_string(),
            content: format!("{} details", title),
            category: NotificationCategory::Events,
            priority: Priority::High,
            posted_at: now - Duration::minutes(minutes_ago),
            read: false,
        }
    }

    fn upload(title: &str, media_type: MediaType, data: &[u8]) -> MediaUpload {
        MediaUpload {
            item: MediaItem {
                id: None,
                title: title.to_string(),
                media_type,
                weekly_category: (media_type == MediaType::Weekly).then_some(WeeklyCategory::Tafsir),
                description: String::new(),
                teacher: "Imam Fahad".to_string(),
                file_name: format!("{}.mp3", title),
                file_size: 0,
                mime_type: "audio/mpeg".to_string(),
                uploaded_at: Utc::now(),
                download_count: 0,
            },
            data: data.to_vec(),
        }
    }

    #[test]
    fn override_is_scoped_to_its_date() {
        let r = repo();
        let o = DayOverride::new(date(), DailyPrayerTimes::builtin_default());
        r.put_override(&o).unwrap();
        assert_eq!(r.get_override(date()).unwrap(), Some(o));
        assert_eq!(r.get_override(date().succ_opt().unwrap()).unwrap(), None);

        r.clear_override().unwrap();
        assert_eq!(r.get_override(date()).unwrap(), None);
    }

    #[test]
    fn delays_round_trip_and_report_malformed() {
        let r = repo();
        assert!(r.get_delays().unwrap().is_none());

        let mut d = DelayConfig::empty();
        d.set(PrayerType::Isha, PrayerDelay::new(3, 7));
        r.put_delays(&d).unwrap();
        assert_eq!(r.get_delays().unwrap(), Some(d));

        r.set_meta(DELAYS_KEY, "not json").unwrap();
        match r.get_delays() {
            Err(StoreError::Malformed { key, .. }) => assert_eq!(key, DELAYS_KEY),
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn notifications_newest_first_and_mark_read() {
        let r = repo();
        let old = r.add_notification(&notice("Old", 120)).unwrap();
        r.add_notification(&notice("New", 5)).unwrap();

        let list = r.list_notifications().unwrap();
        assert_eq!(list[0].title, "New");
        assert_eq!(list[1].priority, Priority::High);

        assert!(r.mark_notification_read(old).unwrap());
        assert!(!r.mark_notification_read(9999).unwrap());
        let list = r.list_notifications().unwrap();
        assert!(list.iter().find(|n| n.id == Some(old)).unwrap().read);
    }

    #[test]
    fn media_filter_and_download_count() {
        let r = repo();
        let audio = r.add_media(&upload("lecture", MediaType::Audio, b"abc")).unwrap();
        r.add_media(&upload("week-1", MediaType::Weekly, b"de")).unwrap();

        assert_eq!(r.list_media(None).unwrap().len(), 2);
        let weekly = r.list_media(Some(MediaType::Weekly)).unwrap();
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].weekly_category, Some(WeeklyCategory::Tafsir));
        assert_eq!(weekly[0].file_size, 2);

        r.record_download(audio).unwrap();
        let fetched = r.get_media(audio).unwrap().unwrap();
        assert_eq!(fetched.data, b"abc");
        assert_eq!(fetched.item.download_count, 1);
        assert!(r.get_media(audio + 100).unwrap().is_none());
    }

    #[test]
    fn subscriptions_keep_categories() {
        let r = repo();
        r.add_subscription(&Subscription {
            id: None,
            name: "Amina".to_string(),
            email: "amina@example.com".to_string(),
            phone: None,
            categories: vec![NotificationCategory::Salah, NotificationCategory::Friday],
            subscribed_at: Utc::now(),
            active: true,
        })
        .unwrap();
        let subs = r.list_subscriptions().unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(
            subs[0].categories,
            vec![NotificationCategory::Salah, NotificationCategory::Friday]
        );
    }

    #[test]
    fn enrollments_and_questions_are_stored() {
        let r = repo();
        r.add_enrollment(&Enrollment {
            id: None,
            programs: vec![Program::Fiqh, Program::Tafsir],
            name: "Yusuf".to_string(),
            email: "yusuf@example.com".to_string(),
            phone: "+256700000000".to_string(),
            level: AcademicLevel::Postgraduate,
            year: Some("2".to_string()),
            message: None,
            submitted_at: Utc::now(),
        })
        .unwrap();
        r.add_question(&Question {
            id: None,
            subject: "Witr".to_string(),
            content: "How many rakaat?".to_string(),
            category: Some(QuestionCategory::Fiqh),
            teacher: "all".to_string(),
            name: None,
            email: "q@example.com".to_string(),
            phone: None,
            submitted_at: Utc::now(),
        })
        .unwrap();

        let e = r.list_enrollments().unwrap();
        assert_eq!(e[0].programs, vec![Program::Fiqh, Program::Tafsir]);
        assert_eq!(e[0].level, AcademicLevel::Postgraduate);
        let q = r.list_questions().unwrap();
        assert_eq!(q[0].category, Some(QuestionCategory::Fiqh));
    }

    #[test]
    fn data_version_moves_when_another_handle_commits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kiuma.db");
        let reader = SqliteRepository::open(&path).unwrap();
        let writer = SqliteRepository::open(&path).unwrap();

        let before = reader.data_version().unwrap();
        assert_eq!(reader.data_version().unwrap(), before);
        writer
            .put_delays(&DelayConfig::uniform(PrayerDelay::new(5, 5)))
            .unwrap();
        assert_ne!(reader.data_version().unwrap(), before);
    }

    #[test]
    fn corrupt_row_is_an_invalid_record() {
        let r = repo();
        r.conn
            .execute(
                "INSERT INTO enrollments (programs, name, email, phone, level, submitted_at)
                 VALUES ('[\"knitting\"]', 'x', 'x@y.z', '1', 'elder', '2026-10-19T00:00:00Z')",
                [],
            )
            .unwrap();
        assert!(matches!(
            r.list_enrollments(),
            Err(StoreError::InvalidRecord { table: "enrollments", .. })
        ));
    }
}
