use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::models::DailyPrayerTimes;

fn default_location_name() -> String {
    "Kampala".to_string()
}
fn default_latitude() -> f64 {
    0.3476
}
fn default_longitude() -> f64 {
    32.5825
}
fn default_timezone_offset() -> i32 {
    180
}
fn default_api_method() -> u8 {
    2
}
fn default_calc_method() -> String {
    "MuslimWorldLeague".to_string()
}
fn default_madhab() -> String {
    "Shafi".to_string()
}
fn default_hijri_offset() -> i32 {
    0
}
fn default_fallback_times() -> DailyPrayerTimes {
    DailyPrayerTimes::builtin_default()
}
fn default_base_url() -> String {
    "https://api.aladhan.com/v1".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_passphrase() -> String {
    "kiuma2025".to_string()
}
fn default_tick_rate_ms() -> u64 {
    1000
}
fn default_office_email() -> String {
    "info@kiuma.ac.ug".to_string()
}

/// Where the day's five prayer times come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSource {
    /// Aladhan web API
    #[default]
    Remote,
    /// Local astronomical calculation
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_location_name")]
    pub name: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: i32, // minutes from UTC
    #[serde(default)]
    pub source: TimeSource,
    /// Aladhan calculation method id (2 = ISNA).
    #[serde(default = "default_api_method")]
    pub api_method: u8,
    #[serde(default = "default_calc_method")]
    pub calc_method: String,
    #[serde(default = "default_madhab")]
    pub madhab: String,
    /// Days to add/subtract from the Hijri date for local moon sighting.
    #[serde(default = "default_hijri_offset")]
    pub hijri_offset: i32,
    /// Used when neither an override nor the provider yields times.
    #[serde(default = "default_fallback_times")]
    pub fallback_times: DailyPrayerTimes,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: default_location_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone_offset: default_timezone_offset(),
            source: TimeSource::default(),
            api_method: default_api_method(),
            calc_method: default_calc_method(),
            madhab: default_madhab(),
            hijri_offset: default_hijri_offset(),
            fallback_times: default_fallback_times(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_passphrase")]
    pub passphrase: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            passphrase: default_passphrase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Contact {
    fn new(name: &str, email: &str, note: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            note: note.map(str::to_string),
        }
    }
}

fn default_teachers() -> BTreeMap<String, Contact> {
    [
        ("all", Contact::new("All Teachers", "teachers@kiuma.ac.ug", None)),
        (
            "imam-fahad",
            Contact::new("Imam Fahad", "imam.fahad@kiuma.ac.ug", Some("Quran, Tafsir, Arabic")),
        ),
        (
            "imam-abdurrahman",
            Contact::new(
                "Imam Abdurrahman",
                "imam.abdurrahman@kiuma.ac.ug",
                Some("Hadith, Tawheed"),
            ),
        ),
        (
            "sheikh-abdulswabur",
            Contact::new(
                "Sheikh Abdulswabur",
                "sheikh.abdulswabur@kiuma.ac.ug",
                Some("Hadith Explanation"),
            ),
        ),
        (
            "prof-twaib",
            Contact::new("Prof. Twaib", "prof.twaib@kiuma.ac.ug", Some("Fiqh, Swalah")),
        ),
        (
            "dr-jega",
            Contact::new("Dr. Jega", "dr.jega@kiuma.ac.ug", Some("Arbauna Nawawi")),
        ),
        ("other", Contact::new("Other Scholar", "scholars@kiuma.ac.ug", None)),
    ]
    .into_iter()
    .map(|(k, c)| (k.to_string(), c))
    .collect()
}

fn default_departments() -> BTreeMap<String, Contact> {
    [
        ("islamic-studies", "Islamic Studies Department", "islamic.studies@kiuma.ac.ug"),
        ("quran-memorization", "Quran Memorization Department", "quran.memorization@kiuma.ac.ug"),
        ("hadith-studies", "Hadith Studies Department", "hadith.studies@kiuma.ac.ug"),
        ("fiqh", "Fiqh Department", "fiqh@kiuma.ac.ug"),
        ("tafsir", "Tafsir Department", "tafsir@kiuma.ac.ug"),
        ("mentorship", "Student Mentorship Department", "mentorship@kiuma.ac.ug"),
    ]
    .into_iter()
    .map(|(k, name, email)| (k.to_string(), Contact::new(name, email, None)))
    .collect()
}

/// Entries given in config.toml are merged over the built-in directories,
/// so a single teacher can be corrected without restating the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsConfig {
    #[serde(default = "default_office_email")]
    pub office_email: String,
    #[serde(default)]
    pub teachers: BTreeMap<String, Contact>,
    #[serde(default)]
    pub departments: BTreeMap<String, Contact>,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            office_email: default_office_email(),
            teachers: BTreeMap::new(),
            departments: BTreeMap::new(),
        }
    }
}

impl ContactsConfig {
    pub fn teacher_directory(&self) -> BTreeMap<String, Contact> {
        let mut all = default_teachers();
        all.extend(self.teachers.clone());
        all
    }

    pub fn department_directory(&self) -> BTreeMap<String, Contact> {
        let mut all = default_departments();
        all.extend(self.departments.clone());
        all
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub contacts: ContactsConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "kiuma").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("kiuma.db"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            log::debug!("no config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Reading {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Parsing config.toml")
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.to_toml()?).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Serializing config")
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrayerType;

    #[test]
    fn empty_file_gives_kampala_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.location.name, "Kampala");
        assert_eq!(config.location.source, TimeSource::Remote);
        assert_eq!(config.admin.passphrase, "kiuma2025");
        assert_eq!(
            config.location.fallback_times.get(PrayerType::Maghrib),
            Some("18:45")
        );
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [location]
            name = "Jinja"
            source = "offline"

            [contacts.teachers.imam-fahad]
            name = "Imam Fahad"
            email = "fahad@example.org"
            "#,
        )
        .unwrap();
        assert_eq!(config.location.name, "Jinja");
        assert_eq!(config.location.source, TimeSource::Offline);
        assert_eq!(config.location.api_method, 2);

        let teachers = config.contacts.teacher_directory();
        assert_eq!(teachers["imam-fahad"].email, "fahad@example.org");
        assert_eq!(teachers["dr-jega"].email, "dr.jega@kiuma.ac.ug");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        let back = AppConfig::from_toml(&text).unwrap();
        assert_eq!(back.location.latitude, config.location.latitude);
        assert_eq!(back.board.tick_rate_ms, 1000);
    }
}
