use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Phase, PrayerType};

/// Prayer times used when nothing better is available (Kampala).
pub const DEFAULT_TIMES: [(PrayerType, &str); 5] = [
    (PrayerType::Fajr, "05:30"),
    (PrayerType::Dhuhr, "12:45"),
    (PrayerType::Asr, "15:30"),
    (PrayerType::Maghrib, "18:45"),
    (PrayerType::Isha, "20:00"),
];

/// Textual clock time per prayer, as delivered by a provider or typed by
/// an administrator. Values are parsed lazily so that one bad entry does
/// not invalidate the rest of the day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyPrayerTimes(BTreeMap<PrayerType, String>);

impl DailyPrayerTimes {
    pub fn builtin_default() -> Self {
        DEFAULT_TIMES
            .iter()
            .map(|(p, t)| (*p, t.to_string()))
            .collect()
    }

    pub fn get(&self, prayer: PrayerType) -> Option<&str> {
        self.0.get(&prayer).map(String::as_str)
    }

    pub fn is_complete(&self) -> bool {
        PrayerType::ALL.iter().all(|p| self.0.contains_key(p))
    }
}

impl FromIterator<(PrayerType, String)> for DailyPrayerTimes {
    fn from_iter<I: IntoIterator<Item = (PrayerType, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerDelay {
    /// Minutes the adhan is called before the prayer time.
    #[serde(alias = "adhan")]
    pub call_offset: u32,
    /// Minutes between adhan and iqaama.
    #[serde(alias = "iqaama")]
    pub congregation_offset: u32,
}

impl PrayerDelay {
    pub const fn new(call_offset: u32, congregation_offset: u32) -> Self {
        Self {
            call_offset,
            congregation_offset,
        }
    }

    pub fn builtin(prayer: PrayerType) -> Self {
        match prayer {
            PrayerType::Maghrib => Self::new(5, 2),
            _ => Self::new(10, 5),
        }
    }
}

/// Per-prayer delay offsets. Prayers without an entry use the built-in
/// default for that prayer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DelayConfig(BTreeMap<PrayerType, PrayerDelay>);

impl Default for DelayConfig {
    fn default() -> Self {
        Self(
            PrayerType::ALL
                .iter()
                .map(|p| (*p, PrayerDelay::builtin(*p)))
                .collect(),
        )
    }
}

impl DelayConfig {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn uniform(delay: PrayerDelay) -> Self {
        Self(PrayerType::ALL.iter().map(|p| (*p, delay)).collect())
    }

    pub fn delay_for(&self, prayer: PrayerType) -> PrayerDelay {
        self.0
            .get(&prayer)
            .copied()
            .unwrap_or_else(|| PrayerDelay::builtin(prayer))
    }

    pub fn set(&mut self, prayer: PrayerType, delay: PrayerDelay) {
        self.0.insert(prayer, delay);
    }

    /// Entries of `other` win over entries of `self`.
    pub fn merged_with(&self, other: &DelayConfig) -> DelayConfig {
        let mut merged = self.0.clone();
        merged.extend(other.0.iter().map(|(p, d)| (*p, *d)));
        DelayConfig(merged)
    }
}

/// An administrator's replacement for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOverride {
    pub date: NaiveDate,
    pub times: DailyPrayerTimes,
    #[serde(default)]
    pub delays: Option<DelayConfig>,
    #[serde(default)]
    pub call_times: Option<DailyPrayerTimes>,
    #[serde(default)]
    pub congregation_times: Option<DailyPrayerTimes>,
}

impl DayOverride {
    pub fn new(date: NaiveDate, times: DailyPrayerTimes) -> Self {
        Self {
            date,
            times,
            delays: None,
            call_times: None,
            congregation_times: None,
        }
    }

    /// Both explicit maps present: the schedule is taken verbatim.
    pub fn explicit_schedule(&self) -> Option<(&DailyPrayerTimes, &DailyPrayerTimes)> {
        match (&self.call_times, &self.congregation_times) {
            (Some(call), Some(congregation)) => Some((call, congregation)),
            _ => None,
        }
    }
}

/// Call and congregation minute-of-day for one prayer. `None` marks a value
/// that could not be parsed; such slots never produce a next event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledPrayer {
    pub prayer: PrayerType,
    pub prayer_minute: Option<u16>,
    pub call: Option<u16>,
    pub congregation: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedSchedule {
    pub slots: Vec<ScheduledPrayer>,
}

impl DerivedSchedule {
    pub fn slot(&self, prayer: PrayerType) -> Option<&ScheduledPrayer> {
        self.slots.iter().find(|s| s.prayer == prayer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextEvent {
    pub prayer: PrayerType,
    pub phase: Phase,
    pub minute: Option<u16>,
    /// Nothing qualified today; the event is tomorrow's first call.
    pub tomorrow: bool,
}
