use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::calendar::hijri::{RAMADAN_MONTH, hijri_to_gregorian, to_hijri};
use crate::network::aladhan::{AladhanClient, CalendarDay};

pub const RAMADAN_LENGTH_DAYS: i64 = 30;
/// Further away than this, only an approximate day count is shown.
pub const COUNTDOWN_WINDOW_DAYS: i64 = 60;
/// Days in a lunar year, used to roll a passed start forward.
const LUNAR_YEAR_DAYS: i64 = 354;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartSource {
    Remote,
    Offline,
    Approximate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamadanStart {
    pub date: NaiveDate,
    pub source: StartSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamadanStatus {
    /// Inside the month; `day` is 1-based.
    Active { day: i64 },
    /// More than [`COUNTDOWN_WINDOW_DAYS`] away.
    Distant { days: i64, year: i32 },
    Countdown {
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        year: i32,
    },
}

impl RamadanStatus {
    pub fn headline(&self) -> &'static str {
        match self {
            RamadanStatus::Active { .. } => "Ramadan Mubarak!",
            RamadanStatus::Distant { .. } => "Ramadan (Possibly)",
            RamadanStatus::Countdown { .. } => "Ramadan Countdown",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            RamadanStatus::Active { day } => format!(
                "Day {} - may this blessed month bring you peace and blessings.",
                day
            ),
            RamadanStatus::Distant { days, .. } => format!(
                "Approximately {} days away. Exact dates follow the moon sighting.",
                days
            ),
            RamadanStatus::Countdown {
                days,
                hours,
                minutes,
                seconds,
                year,
            } => format!(
                "{}d {:02}h {:02}m {:02}s until Ramadan {}",
                days, hours, minutes, seconds, year
            ),
        }
    }
}

/// Where `now` stands relative to a Ramadan beginning on `start`.
/// A start whose month is already over is rolled forward by lunar years
/// until its month has not yet ended.
pub fn ramadan_status(start: NaiveDate, now: NaiveDateTime) -> RamadanStatus {
    let mut start = start;
    while (now.date() - start).num_days() >= RAMADAN_LENGTH_DAYS {
        start += Duration::days(LUNAR_YEAR_DAYS);
    }
    let elapsed = (now.date() - start).num_days();
    if elapsed >= 0 {
        return RamadanStatus::Active { day: elapsed + 1 };
    }

    let remaining = (start.and_time(NaiveTime::MIN) - now).num_seconds();
    let days = remaining / 86_400;
    if days > COUNTDOWN_WINDOW_DAYS {
        return RamadanStatus::Distant {
            days,
            year: start.year(),
        };
    }

    RamadanStatus::Countdown {
        days,
        hours: remaining % 86_400 / 3600,
        minutes: remaining % 3600 / 60,
        seconds: remaining % 60,
        year: start.year(),
    }
}

fn pick_first_day(days: &[CalendarDay]) -> Option<NaiveDate> {
    days.iter()
        .find(|d| d.hijri.day == 1 && d.hijri.month == RAMADAN_MONTH)
        .or_else(|| days.first())
        .map(|d| d.gregorian)
}

fn start_for_year(client: Option<&AladhanClient>, hijri_year: usize) -> Option<RamadanStart> {
    if let Some(client) = client {
        match client.gregorian_for_hijri_month(hijri_year, RAMADAN_MONTH) {
            Ok(days) => match pick_first_day(&days) {
                Some(date) => {
                    return Some(RamadanStart {
                        date,
                        source: StartSource::Remote,
                    });
                }
                None => log::warn!("empty Ramadan calendar for {} AH", hijri_year),
            },
            Err(e) => log::warn!("Ramadan calendar lookup for {} AH failed: {}", hijri_year, e),
        }
    }

    match hijri_to_gregorian(hijri_year, RAMADAN_MONTH, 1) {
        Ok(date) => Some(RamadanStart {
            date,
            source: StartSource::Offline,
        }),
        Err(e) => {
            log::warn!("offline Ramadan conversion for {} AH failed: {}", hijri_year, e);
            None
        }
    }
}

fn current_hijri_year(client: Option<&AladhanClient>, today: NaiveDate) -> usize {
    if let Some(client) = client {
        match client.gregorian_to_hijri(today) {
            Ok(info) => return info.year,
            Err(e) => log::warn!("hijri year lookup failed: {}", e),
        }
    }
    match to_hijri(today) {
        Ok(info) => info.year,
        Err(_) => ((today.year() - 622) as f64 * 1.0307).floor() as usize,
    }
}

/// First day of the current or next Ramadan. Never fails: the last resort
/// is 10 March of the current year.
pub fn resolve_ramadan_start(client: Option<&AladhanClient>, today: NaiveDate) -> RamadanStart {
    let year = current_hijri_year(client, today);
    resolve_with(today, year, |y| start_for_year(client, y))
}

fn resolve_with(
    today: NaiveDate,
    hijri_year: usize,
    lookup: impl Fn(usize) -> Option<RamadanStart>,
) -> RamadanStart {
    let mut first_found = None;
    for year in [hijri_year, hijri_year + 1] {
        if let Some(start) = lookup(year) {
            if today < start.date + Duration::days(RAMADAN_LENGTH_DAYS) {
                return start;
            }
            first_found.get_or_insert(start);
        }
    }

    first_found.unwrap_or_else(|| RamadanStart {
        date: NaiveDate::from_ymd_opt(today.year(), 3, 10).unwrap_or(today),
        source: StartSource::Approximate,
    })
}
