use anyhow::{Result, anyhow};
use chrono::{FixedOffset, NaiveDate};
use salah::prelude::*;

use crate::calendar::hijri::to_hijri;
use crate::config::LocationConfig;
use crate::models::{DailyPrayerTimes, PrayerType};
use crate::prayer_times::{ProvidedDay, TimesProvider};

/// Offline provider: astronomical calculation for the configured location.
pub struct PrayerCalculator {
    pub lat: f64,
    pub lng: f64,
    pub method_str: String,
    pub madhab_str: String,
    pub tz_offset_minutes: i32,
}

impl PrayerCalculator {
    pub fn new(
        lat: f64,
        lng: f64,
        method: &str,
        madhab: &str,
        tz_offset_minutes: i32,
    ) -> Result<Self> {
        // Validate method + madhab early
        parse_method(method)?;
        parse_madhab(madhab)?;
        Ok(Self {
            lat,
            lng,
            method_str: method.to_string(),
            madhab_str: madhab.to_string(),
            tz_offset_minutes,
        })
    }

    pub fn from_location(location: &LocationConfig) -> Result<Self> {
        Self::new(
            location.latitude,
            location.longitude,
            &location.calc_method,
            &location.madhab,
            location.timezone_offset,
        )
    }

    pub fn compute_times(&self, date: NaiveDate) -> Result<DailyPrayerTimes> {
        let coords = Coordinates::new(self.lat, self.lng);
        let method = parse_method(&self.method_str)?;
        let madhab = parse_madhab(&self.madhab_str)?;
        let params = Configuration::with(method, madhab);

        let times = PrayerSchedule::new()
            .on(date)
            .for_location(coords)
            .with_configuration(params)
            .calculate()
            .map_err(|e| anyhow!("Prayer calculation failed: {}", e))?;

        let offset = FixedOffset::east_opt(self.tz_offset_minutes * 60)
            .ok_or_else(|| anyhow!("Invalid timezone offset: {}", self.tz_offset_minutes))?;

        let local = |prayer: Prayer| -> String {
            times
                .time(prayer)
                .with_timezone(&offset)
                .format("%H:%M")
                .to_string()
        };

        Ok([
            (PrayerType::Fajr, local(Prayer::Fajr)),
            (PrayerType::Dhuhr, local(Prayer::Dhuhr)),
            (PrayerType::Asr, local(Prayer::Asr)),
            (PrayerType::Maghrib, local(Prayer::Maghrib)),
            (PrayerType::Isha, local(Prayer::Isha)),
        ]
        .into_iter()
        .collect())
    }
}

impl TimesProvider for PrayerCalculator {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn fetch_day(&self, date: NaiveDate) -> Result<ProvidedDay> {
        let times = self.compute_times(date)?;
        Ok(ProvidedDay {
            times,
            hijri: to_hijri(date).ok(),
        })
    }
}

/// Lower-case and drop separators so "Umm al-Qura" and "UmmAlQura" agree.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn parse_method(s: &str) -> Result<Method> {
    let method = match normalize(s).as_str() {
        "muslimworldleague" | "mwl" => Method::MuslimWorldLeague,
        "egyptian" | "egypt" => Method::Egyptian,
        "karachi" => Method::Karachi,
        "ummalqura" | "makkah" => Method::UmmAlQura,
        "dubai" | "gulf" => Method::Dubai,
        "moonsightingcommittee" | "moonsighting" => Method::MoonsightingCommittee,
        "northamerica" | "isna" => Method::NorthAmerica,
        "kuwait" => Method::Kuwait,
        "qatar" => Method::Qatar,
        "singapore" => Method::Singapore,
        "tehran" => Method::Tehran,
        "turkey" => Method::Turkey,
        "other" => Method::Other,
        _ => return Err(anyhow!("Unknown calculation method: '{}'", s)),
    };
    Ok(method)
}

fn parse_madhab(s: &str) -> Result<Madhab> {
    match normalize(s).as_str() {
        "hanafi" => Ok(Madhab::Hanafi),
        "shafi" | "shafii" | "standard" => Ok(Madhab::Shafi),
        _ => Err(anyhow!("Unknown madhab: '{}'", s)),
    }
}
