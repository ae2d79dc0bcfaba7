use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use hijri_date::HijriDate;

use crate::network::aladhan::{AladhanClient, AladhanError, CalendarDay};

/// Islamic month names in English (index 0 = Muharram = month 1)
const HIJRI_MONTH_NAMES: &[&str] = &[
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

pub const RAMADAN_MONTH: usize = 9;

pub fn hijri_month_name(month: usize) -> &'static str {
    if (1..=12).contains(&month) {
        HIJRI_MONTH_NAMES[month - 1]
    } else {
        "Unknown"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HijriInfo {
    pub day: usize,
    pub month: usize,
    pub year: usize,
    pub month_name: String,
    pub month_name_ar: Option<String>,
    pub day_name: String,
}

impl HijriInfo {
    pub fn formatted(&self) -> String {
        format!("{} {} {} AH", self.day, self.month_name, self.year)
    }
}

/// What the board shows for the Hijri date, including the degraded case.
#[derive(Debug, Clone, PartialEq)]
pub enum HijriDisplay {
    Known(HijriInfo),
    Unavailable,
}

impl HijriDisplay {
    pub fn formatted(&self) -> String {
        match self {
            HijriDisplay::Known(info) => info.formatted(),
            HijriDisplay::Unavailable => "-- Calculating... ---- AH".to_string(),
        }
    }

    pub fn info(&self) -> Option<&HijriInfo> {
        match self {
            HijriDisplay::Known(info) => Some(info),
            HijriDisplay::Unavailable => None,
        }
    }
}

pub fn to_hijri(date: NaiveDate) -> Result<HijriInfo> {
    let hd = HijriDate::from_gr(
        date.year() as usize,
        date.month() as usize,
        date.day() as usize,
    )
    .map_err(|e| anyhow::anyhow!("Hijri conversion error: {}", e))?;

    let month = hd.month();
    Ok(HijriInfo {
        day: hd.day(),
        month,
        year: hd.year(),
        month_name: hijri_month_name(month).to_string(),
        month_name_ar: None,
        day_name: hd.day_name_en(),
    })
}

/// Gregorian date of the given Hijri day, computed locally.
pub fn hijri_to_gregorian(year: usize, month: usize, day: usize) -> Result<NaiveDate> {
    let hd = HijriDate::from_hijri(year, month, day)
        .map_err(|e| anyhow::anyhow!("Hijri conversion error: {}", e))?;
    NaiveDate::from_ymd_opt(hd.year_gr() as i32, hd.month_gr() as u32, hd.day_gr() as u32)
        .ok_or_else(|| anyhow::anyhow!("Hijri {}/{}/{} has no Gregorian date", day, month, year))
}

/// Resolve the Hijri date for `date`, shifted by `offset_days` for local
/// moon sighting. Tries the day endpoint, then the month calendar, then the
/// local conversion; never fails.
pub fn resolve_hijri(client: Option<&AladhanClient>, date: NaiveDate, offset_days: i32) -> HijriDisplay {
    resolve_with(
        date,
        offset_days,
        |d| client.map(|c| c.gregorian_to_hijri(d)),
        |year, month| client.map(|c| c.hijri_for_gregorian_month(year, month)),
        to_hijri,
    )
}

/// The lookups return `None` when no remote source is configured.
fn resolve_with(
    date: NaiveDate,
    offset_days: i32,
    day_lookup: impl Fn(NaiveDate) -> Option<Result<HijriInfo, AladhanError>>,
    month_lookup: impl Fn(i32, u32) -> Option<Result<Vec<CalendarDay>, AladhanError>>,
    offline: impl Fn(NaiveDate) -> Result<HijriInfo>,
) -> HijriDisplay {
    let adjusted = date + Duration::days(offset_days as i64);

    match day_lookup(adjusted) {
        Some(Ok(info)) => return HijriDisplay::Known(info),
        Some(Err(e)) => log::warn!("hijri lookup for {} failed: {}", adjusted, e),
        None => {}
    }

    match month_lookup(adjusted.year(), adjusted.month()) {
        Some(Ok(days)) => {
            if let Some(day) = days.into_iter().find(|d| d.gregorian == adjusted) {
                return HijriDisplay::Known(day.hijri);
            }
            log::warn!("hijri month calendar has no entry for {}", adjusted);
        }
        Some(Err(e)) => log::warn!("hijri month calendar lookup failed: {}", e),
        None => {}
    }

    match offline(adjusted) {
        Ok(info) => HijriDisplay::Known(info),
        Err(e) => {
            log::warn!("offline hijri conversion failed: {}", e);
            HijriDisplay::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(day: usize, name: &str) -> HijriInfo {
        HijriInfo {
            day,
            month: RAMADAN_MONTH,
            year: 1447,
            month_name: name.to_string(),
            month_name_ar: None,
            day_name: "Monday".to_string(),
        }
    }

    fn failed() -> AladhanError {
        AladhanError::Invalid("unreachable".to_string())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 20).unwrap()
    }

    #[test]
    fn month_names_are_one_based() {
        assert_eq!(hijri_month_name(1), "Muharram");
        assert_eq!(hijri_month_name(RAMADAN_MONTH), "Ramadan");
        assert_eq!(hijri_month_name(0), "Unknown");
        assert_eq!(hijri_month_name(13), "Unknown");
    }

    #[test]
    fn offline_resolution_when_no_client() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        match resolve_hijri(None, date, 0) {
            HijriDisplay::Known(info) => {
                assert!(info.year >= 1446);
                assert!((1..=12).contains(&info.month));
            }
            HijriDisplay::Unavailable => panic!("local conversion should succeed"),
        }
    }

    #[test]
    fn day_endpoint_wins_when_it_answers() {
        let shown = resolve_with(
            date(),
            0,
            |_| Some(Ok(info(3, "day endpoint"))),
            |_, _| panic!("month calendar must not be consulted"),
            |_| panic!("offline conversion must not be consulted"),
        );
        assert_eq!(shown, HijriDisplay::Known(info(3, "day endpoint")));
    }

    #[test]
    fn month_calendar_covers_a_failed_day_lookup() {
        let shown = resolve_with(
            date(),
            0,
            |_| Some(Err(failed())),
            |year, month| {
                assert_eq!((year, month), (2026, 2));
                Some(Ok(vec![
                    CalendarDay {
                        gregorian: date() - Duration::days(1),
                        hijri: info(2, "month calendar"),
                    },
                    CalendarDay {
                        gregorian: date(),
                        hijri: info(3, "month calendar"),
                    },
                ]))
            },
            |_| panic!("offline conversion must not be consulted"),
        );
        assert_eq!(shown, HijriDisplay::Known(info(3, "month calendar")));
    }

    #[test]
    fn offline_conversion_after_both_remote_lookups_fail() {
        let shown = resolve_with(
            date(),
            0,
            |_| Some(Err(failed())),
            // The calendar answers but lacks the day
            |_, _| Some(Ok(Vec::new())),
            |_| Ok(info(3, "offline")),
        );
        assert_eq!(shown, HijriDisplay::Known(info(3, "offline")));

        let without_remote = resolve_with(date(), 0, |_| None, |_, _| None, |_| Ok(info(3, "offline")));
        assert_eq!(without_remote, HijriDisplay::Known(info(3, "offline")));
    }

    #[test]
    fn placeholder_when_every_source_fails() {
        let shown = resolve_with(
            date(),
            0,
            |_| Some(Err(failed())),
            |_, _| Some(Err(failed())),
            |_| Err(anyhow::anyhow!("out of range")),
        );
        assert_eq!(shown, HijriDisplay::Unavailable);
        assert_eq!(shown.formatted(), "-- Calculating... ---- AH");
    }

    #[test]
    fn offset_shifts_every_lookup() {
        let shifted = date() + Duration::days(1);
        let shown = resolve_with(
            date(),
            1,
            |d| {
                assert_eq!(d, shifted);
                Some(Err(failed()))
            },
            |_, _| {
                Some(Ok(vec![CalendarDay {
                    gregorian: shifted,
                    hijri: info(4, "shifted"),
                }]))
            },
            |_| panic!("offline conversion must not be consulted"),
        );
        assert_eq!(shown, HijriDisplay::Known(info(4, "shifted")));

        assert_eq!(
            resolve_hijri(None, date(), -1),
            HijriDisplay::Known(to_hijri(date() - Duration::days(1)).unwrap())
        );
    }

    #[test]
    fn unavailable_renders_placeholder() {
        assert_eq!(HijriDisplay::Unavailable.formatted(), "-- Calculating... ---- AH");
    }
}
