pub mod inquiry;
pub mod media;
pub mod notification;
pub mod prayer;
pub mod schedule;

pub use inquiry::{AcademicLevel, Enrollment, Program, Question, QuestionCategory};
pub use media::{MediaItem, MediaType, MediaUpload, WeeklyCategory};
pub use notification::{Notification, NotificationCategory, Priority, Subscription};
pub use prayer::{Phase, PrayerType};
pub use schedule::{
    DailyPrayerTimes, DayOverride, DelayConfig, DerivedSchedule, NextEvent, PrayerDelay,
    ScheduledPrayer,
};
