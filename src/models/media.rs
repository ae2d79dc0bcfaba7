use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Weekly,
    Audio,
    Video,
    Books,
    Documents,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Weekly => "weekly",
            MediaType::Audio => "audio",
            MediaType::Video => "video",
            MediaType::Books => "books",
            MediaType::Documents => "documents",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaType::Weekly => "Weekly Teaching",
            MediaType::Audio => "Audio",
            MediaType::Video => "Video",
            MediaType::Books => "Book",
            MediaType::Documents => "Document",
        }
    }
}

impl FromStr for MediaType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(MediaType::Weekly),
            "audio" => Ok(MediaType::Audio),
            "video" => Ok(MediaType::Video),
            "books" | "book" => Ok(MediaType::Books),
            "documents" | "document" => Ok(MediaType::Documents),
            _ => Err(anyhow::anyhow!("Unknown media type: {}", s)),
        }
    }
}

/// The recurring classes weekly teachings are filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeeklyCategory {
    QuranYasaruna,
    HadithMemorisation,
    HadithExplanation,
    Tawheed,
    FiqhSwalah,
    ArbaunaNawawi,
    Tafsir,
    ArabicClasses,
}

impl WeeklyCategory {
    pub const ALL: [WeeklyCategory; 8] = [
        WeeklyCategory::QuranYasaruna,
        WeeklyCategory::HadithMemorisation,
        WeeklyCategory::HadithExplanation,
        WeeklyCategory::Tawheed,
        WeeklyCategory::FiqhSwalah,
        WeeklyCategory::ArbaunaNawawi,
        WeeklyCategory::Tafsir,
        WeeklyCategory::ArabicClasses,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeeklyCategory::QuranYasaruna => "quran-yasaruna",
            WeeklyCategory::HadithMemorisation => "hadith-memorisation",
            WeeklyCategory::HadithExplanation => "hadith-explanation",
            WeeklyCategory::Tawheed => "tawheed",
            WeeklyCategory::FiqhSwalah => "fiqh-swalah",
            WeeklyCategory::ArbaunaNawawi => "arbauna-nawawi",
            WeeklyCategory::Tafsir => "tafsir",
            WeeklyCategory::ArabicClasses => "arabic-classes",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WeeklyCategory::QuranYasaruna => "Monday - Thursday: Quran and Yasaruna",
            WeeklyCategory::HadithMemorisation => "Tuesday: Hadith Memorisation",
            WeeklyCategory::HadithExplanation => "Friday: Hadith Explanation",
            WeeklyCategory::Tawheed => "Saturday: Kitaabu Tawheed",
            WeeklyCategory::FiqhSwalah => "Sunday: Fiqh Swalah",
            WeeklyCategory::ArbaunaNawawi => "Sunday: Arbauna Nawawi",
            WeeklyCategory::Tafsir => "Sunday: Tafsir",
            WeeklyCategory::ArabicClasses => "Saturday & Sunday: Arabic Classes",
        }
    }
}

impl FromStr for WeeklyCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeeklyCategory::ALL
            .iter()
            .find(|c| c.as_str() == s.to_lowercase())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Unknown weekly category: {}", s))
    }
}

/// Listing view of an uploaded file. The bytes are only loaded on download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: Option<i64>,
    pub title: String,
    pub media_type: MediaType,
    pub weekly_category: Option<WeeklyCategory>,
    pub description: String,
    pub teacher: String,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub download_count: u32,
}

#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub item: MediaItem,
    pub data: Vec<u8>,
}
