use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "kiuma",
    version,
    author,
    about = "KIUMA prayer board, notices and community desk for the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's prayer, adhan and iqaama times
    Times,
    /// Show the next adhan or iqaama and the time remaining
    Next,
    /// Show today's Hijri date
    Hijri,
    /// Show the Ramadan countdown
    Ramadan,
    /// Administrator tools (password required)
    Admin {
        /// Admin password; prompted for when omitted
        #[arg(long, short)]
        password: Option<String>,
        #[command(subcommand)]
        action: AdminCommands,
    },
    /// Read the notice board
    Notifications {
        #[command(subcommand)]
        action: Option<NotificationCommands>,
    },
    /// Browse and download teachings and documents
    Media {
        #[command(subcommand)]
        action: MediaCommands,
    },
    /// Subscribe to notifications
    Subscribe {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        /// salah, events, updates, blog, courses, ramadan, friday (comma separated)
        #[arg(long = "category", value_delimiter = ',')]
        categories: Vec<String>,
    },
    /// Ask a teacher a question about the Deen
    Ask {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        question: String,
        /// aqeedah, fiqh, quran, hadith, sunnah, worship, ethics, family, contemporary, other
        #[arg(long)]
        category: Option<String>,
        /// Teacher key, e.g. imam-fahad (default: all teachers)
        #[arg(long)]
        teacher: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Request enrollment in one or more programs
    Enroll {
        /// islamic-studies, quran-memorization, hadith-studies, fiqh, tafsir, mentorship
        #[arg(long = "program", value_delimiter = ',')]
        programs: Vec<String>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        /// undergraduate, postgraduate, university-staff, elder, other
        #[arg(long)]
        level: String,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        message: Option<String>,
    },
    /// Write to the KIUMA office
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        message: String,
    },
    /// Inspect the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Set today's adhan and iqaama times (24-hour, Fajr to Isha)
    SetTimes {
        /// Five adhan times, e.g. 05:15,12:35,15:20,18:40,19:50
        #[arg(long, value_delimiter = ',', required = true)]
        adhan: Vec<String>,
        /// Five iqaama times
        #[arg(long, value_delimiter = ',', required = true)]
        iqaama: Vec<String>,
    },
    /// Set today's five prayer times (24-hour, Fajr to Isha)
    SetPrayers {
        #[arg(num_args = 5, required = true)]
        times: Vec<String>,
    },
    /// Change the adhan and iqaama delays for one or more prayers
    SetDelays {
        /// Prayer names, comma separated, or "all"
        #[arg(long, value_delimiter = ',', required = true)]
        prayer: Vec<String>,
        /// Minutes the adhan comes before the prayer time
        #[arg(long)]
        adhan: u32,
        /// Minutes the iqaama comes after the adhan
        #[arg(long)]
        iqaama: u32,
    },
    /// Drop today's override and fetch times again
    ClearOverride,
    /// Post a notice
    Notify {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long, default_value = "updates")]
        category: String,
        /// normal, high or urgent
        #[arg(long, default_value = "normal")]
        priority: String,
    },
    /// Upload a media file
    Upload {
        path: PathBuf,
        #[arg(long)]
        title: String,
        /// weekly, audio, video, books, documents
        #[arg(long = "type")]
        media_type: String,
        /// Required for weekly teachings, e.g. tafsir
        #[arg(long)]
        weekly_category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        teacher: Option<String>,
    },
    /// List notification subscribers
    Subscribers,
    /// List questions sent to teachers
    Questions,
    /// List enrollment requests
    Enrollments,
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommands {
    /// List notices, newest first
    List,
    /// Mark a notice as read
    Read {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum MediaCommands {
    /// List media, optionally by type
    List {
        /// all, weekly, audio, video, books, documents
        #[arg(long = "type", default_value = "all")]
        media_type: String,
    },
    /// Save a media file to disk
    Download {
        id: i64,
        /// Target directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the config file location
    Path,
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}
