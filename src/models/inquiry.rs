use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Aqeedah,
    Fiqh,
    Quran,
    Hadith,
    Sunnah,
    Worship,
    Ethics,
    Family,
    Contemporary,
    Other,
}

impl QuestionCategory {
    pub const ALL: [QuestionCategory; 10] = [
        QuestionCategory::Aqeedah,
        QuestionCategory::Fiqh,
        QuestionCategory::Quran,
        QuestionCategory::Hadith,
        QuestionCategory::Sunnah,
        QuestionCategory::Worship,
        QuestionCategory::Ethics,
        QuestionCategory::Family,
        QuestionCategory::Contemporary,
        QuestionCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Aqeedah => "aqeedah",
            QuestionCategory::Fiqh => "fiqh",
            QuestionCategory::Quran => "quran",
            QuestionCategory::Hadith => "hadith",
            QuestionCategory::Sunnah => "sunnah",
            QuestionCategory::Worship => "worship",
            QuestionCategory::Ethics => "ethics",
            QuestionCategory::Family => "family",
            QuestionCategory::Contemporary => "contemporary",
            QuestionCategory::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuestionCategory::Aqeedah => "Aqeedah (Beliefs)",
            QuestionCategory::Fiqh => "Fiqh (Jurisprudence)",
            QuestionCategory::Quran => "Quran & Tafsir",
            QuestionCategory::Hadith => "Hadith",
            QuestionCategory::Sunnah => "Sunnah & Practices",
            QuestionCategory::Worship => "Worship (Ibadah)",
            QuestionCategory::Ethics => "Ethics & Character (Akhlaq)",
            QuestionCategory::Family => "Family & Social Issues",
            QuestionCategory::Contemporary => "Contemporary Issues",
            QuestionCategory::Other => "Other",
        }
    }
}

impl FromStr for QuestionCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionCategory::ALL
            .iter()
            .find(|c| c.as_str() == s.to_lowercase())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Unknown question category: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Program {
    IslamicStudies,
    QuranMemorization,
    HadithStudies,
    Fiqh,
    Tafsir,
    Mentorship,
}

impl Program {
    pub const ALL: [Program; 6] = [
        Program::IslamicStudies,
        Program::QuranMemorization,
        Program::HadithStudies,
        Program::Fiqh,
        Program::Tafsir,
        Program::Mentorship,
    ];

    /// Also the key of the department that runs the programme.
    pub fn as_str(&self) -> &'static str {
        match self {
            Program::IslamicStudies => "islamic-studies",
            Program::QuranMemorization => "quran-memorization",
            Program::HadithStudies => "hadith-studies",
            Program::Fiqh => "fiqh",
            Program::Tafsir => "tafsir",
            Program::Mentorship => "mentorship",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Program::IslamicStudies => "Islamic Studies",
            Program::QuranMemorization => "Quran Memorization",
            Program::HadithStudies => "Hadith Studies",
            Program::Fiqh => "Fiqh (Islamic Jurisprudence)",
            Program::Tafsir => "Tafsir (Quranic Exegesis)",
            Program::Mentorship => "Student Mentorship",
        }
    }
}

impl FromStr for Program {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Program::ALL
            .iter()
            .find(|p| p.as_str() == s.to_lowercase())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Unknown program: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcademicLevel {
    Undergraduate,
    Postgraduate,
    UniversityStaff,
    Elder,
    Other,
}

impl AcademicLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcademicLevel::Undergraduate => "undergraduate",
            AcademicLevel::Postgraduate => "postgraduate",
            AcademicLevel::UniversityStaff => "university-staff",
            AcademicLevel::Elder => "elder",
            AcademicLevel::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AcademicLevel::Undergraduate => "Undergraduate",
            AcademicLevel::Postgraduate => "Postgraduate",
            AcademicLevel::UniversityStaff => "University Staff",
            AcademicLevel::Elder => "Elder",
            AcademicLevel::Other => "Other",
        }
    }
}

impl FromStr for AcademicLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "undergraduate" => Ok(AcademicLevel::Undergraduate),
            "postgraduate" => Ok(AcademicLevel::Postgraduate),
            "university-staff" | "staff" => Ok(AcademicLevel::UniversityStaff),
            "elder" => Ok(AcademicLevel::Elder),
            "other" => Ok(AcademicLevel::Other),
            _ => Err(anyhow::anyhow!("Unknown academic level: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Option<i64>,
    pub subject: String,
    pub content: String,
    pub category: Option<QuestionCategory>,
    /// Key into the teacher directory.
    pub teacher: String,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Option<i64>,
    pub programs: Vec<Program>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub level: AcademicLevel,
    pub year: Option<String>,
    pub message: Option<String>,
    pub submitted_at: DateTime<Utc>,
}
