use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::calendar::hijri::{HijriInfo, hijri_month_name};
use crate::config::settings::ApiConfig;
use crate::config::LocationConfig;
use crate::models::{DailyPrayerTimes, PrayerType};
use crate::network::USER_AGENT;
use crate::prayer_times::{ProvidedDay, TimesProvider};

/// Possible errors when querying the Aladhan API.
#[derive(Error, Debug)]
pub enum AladhanError {
    /// Network failure, timeout or a non-success HTTP status.
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The body was not the JSON shape we expect.
    #[error("failed to parse API response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The API answered, but with an error code in its envelope.
    #[error("API returned code {code}: {status}")]
    Status { code: u16, status: String },

    /// A field was present but held something we cannot use.
    #[error("unusable value in API response: {0}")]
    Invalid(String),
}

/// Every Aladhan response is wrapped as `{code, status, data}`.
#[derive(Deserialize, Debug)]
struct Envelope {
    code: u16,
    #[serde(default)]
    status: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize, Debug)]
struct TimingsData {
    timings: Timings,
    date: DateBlock,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Timings {
    fajr: String,
    dhuhr: String,
    asr: String,
    maghrib: String,
    isha: String,
}

#[derive(Deserialize, Debug)]
struct DateBlock {
    hijri: ApiHijri,
    gregorian: ApiGregorian,
}

#[derive(Deserialize, Debug)]
struct ApiName {
    en: String,
}

#[derive(Deserialize, Debug)]
struct ApiMonth {
    number: usize,
    #[serde(default)]
    ar: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiHijri {
    day: String,
    weekday: ApiName,
    month: ApiMonth,
    year: String,
}

#[derive(Deserialize, Debug)]
struct ApiGregorian {
    /// `DD-MM-YYYY`
    date: String,
}

#[derive(Deserialize, Debug)]
struct ConversionData {
    hijri: ApiHijri,
    gregorian: ApiGregorian,
}

/// One day of a month calendar, in both calendars.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    pub gregorian: NaiveDate,
    pub hijri: HijriInfo,
}

fn unwrap_envelope<T: DeserializeOwned>(body: &str) -> Result<T, AladhanError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if envelope.code != 200 {
        return Err(AladhanError::Status {
            code: envelope.code,
            status: envelope.status,
        });
    }
    Ok(serde_json::from_value(envelope.data)?)
}

fn parse_api_date(s: &str) -> Result<NaiveDate, AladhanError> {
    NaiveDate::parse_from_str(s, "%d-%m-%Y")
        .map_err(|_| AladhanError::Invalid(format!("date '{}'", s)))
}

fn parse_number(field: &str, s: &str) -> Result<usize, AladhanError> {
    s.trim()
        .parse()
        .map_err(|_| AladhanError::Invalid(format!("{} '{}'", field, s)))
}

impl TryFrom<ApiHijri> for HijriInfo {
    type Error = AladhanError;

    fn try_from(h: ApiHijri) -> Result<Self, Self::Error> {
        let day = parse_number("hijri day", &h.day)?;
        let year = parse_number("hijri year", &h.year)?;
        if !(1..=30).contains(&day) || !(1..=12).contains(&h.month.number) {
            return Err(AladhanError::Invalid(format!(
                "hijri date {}/{}/{}",
                day, h.month.number, year
            )));
        }
        Ok(HijriInfo {
            day,
            month: h.month.number,
            year,
            month_name: hijri_month_name(h.month.number).to_string(),
            month_name_ar: h.month.ar,
            day_name: h.weekday.en,
        })
    }
}

fn parse_timings(body: &str) -> Result<ProvidedDay, AladhanError> {
    let data: TimingsData = unwrap_envelope(body)?;
    let t = data.timings;
    let times: DailyPrayerTimes = [
        (PrayerType::Fajr, t.fajr),
        (PrayerType::Dhuhr, t.dhuhr),
        (PrayerType::Asr, t.asr),
        (PrayerType::Maghrib, t.maghrib),
        (PrayerType::Isha, t.isha),
    ]
    .into_iter()
    .collect();

    // Calendar metadata is a bonus; bad metadata must not cost us the times.
    let hijri = match HijriInfo::try_from(data.date.hijri) {
        Ok(h) => Some(h),
        Err(e) => {
            log::debug!("ignoring hijri metadata for {}: {}", data.date.gregorian.date, e);
            None
        }
    };

    Ok(ProvidedDay { times, hijri })
}

fn parse_conversion(body: &str) -> Result<HijriInfo, AladhanError> {
    let data: ConversionData = unwrap_envelope(body)?;
    log::debug!("converted {} to hijri", data.gregorian.date);
    HijriInfo::try_from(data.hijri)
}

fn parse_calendar(body: &str) -> Result<Vec<CalendarDay>, AladhanError> {
    let days: Vec<ConversionData> = unwrap_envelope(body)?;
    days.into_iter()
        .map(|d| {
            Ok(CalendarDay {
                gregorian: parse_api_date(&d.gregorian.date)?,
                hijri: HijriInfo::try_from(d.hijri)?,
            })
        })
        .collect()
}

/// Blocking client for the prayer-times and calendar endpoints of
/// [aladhan.com](https://aladhan.com/prayer-times-api).
pub struct AladhanClient {
    http: reqwest::blocking::Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
    method: u8,
}

impl AladhanClient {
    pub fn new(api: &ApiConfig, location: &LocationConfig) -> Result<Self, AladhanError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            latitude: location.latitude,
            longitude: location.longitude,
            method: location.api_method,
        })
    }

    fn get(&self, path: &str) -> Result<String, AladhanError> {
        let url = format!("{}/{}", self.base_url, path);
        log::debug!("GET {}", url);
        let body = self.http.get(&url).send()?.error_for_status()?.text()?;
        Ok(body)
    }

    /// The five prayer times for `date` at the configured coordinates.
    pub fn timings(&self, date: NaiveDate) -> Result<ProvidedDay, AladhanError> {
        let path = format!(
            "timings/{}?latitude={}&longitude={}&method={}",
            date.format("%d-%m-%Y"),
            self.latitude,
            self.longitude,
            self.method
        );
        parse_timings(&self.get(&path)?)
    }

    pub fn gregorian_to_hijri(&self, date: NaiveDate) -> Result<HijriInfo, AladhanError> {
        parse_conversion(&self.get(&format!("gToH/{}", date.format("%d-%m-%Y")))?)
    }

    /// Every day of a Gregorian month with its Hijri date.
    pub fn hijri_for_gregorian_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<CalendarDay>, AladhanError> {
        parse_calendar(&self.get(&format!("gToHCalendar/{}/{}", month, year))?)
    }

    /// Every day of a Hijri month with its Gregorian date.
    pub fn gregorian_for_hijri_month(
        &self,
        hijri_year: usize,
        hijri_month: usize,
    ) -> Result<Vec<CalendarDay>, AladhanError> {
        parse_calendar(&self.get(&format!("hToGCalendar/{}/{}", hijri_month, hijri_year))?)
    }
}

impl TimesProvider for AladhanClient {
    fn name(&self) -> &'static str {
        "aladhan"
    }

    fn fetch_day(&self, date: NaiveDate) -> anyhow::Result<ProvidedDay> {
        Ok(self.timings(date)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMINGS: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "05:09", "Sunrise": "06:21", "Dhuhr": "12:27",
                "Asr": "15:37", "Sunset": "18:32", "Maghrib": "18:32",
                "Isha": "19:40", "Imsak": "04:59", "Midnight": "00:27"
            },
            "date": {
                "readable": "19 Oct 2026",
                "hijri": {
                    "date": "08-05-1448", "day": "08",
                    "weekday": {"en": "Al Athnayn", "ar": "الاثنين"},
                    "month": {"number": 5, "en": "Jumādá al-ūlá", "ar": "جُمادى الأولى"},
                    "year": "1448"
                },
                "gregorian": {
                    "date": "19-10-2026", "day": "19",
                    "weekday": {"en": "Monday"},
                    "month": {"number": 10, "en": "October"},
                    "year": "2026"
                }
            }
        }
    }"#;

    #[test]
    fn parses_timings_and_hijri_metadata() {
        let day = parse_timings(TIMINGS).unwrap();
        assert_eq!(day.times.get(PrayerType::Fajr), Some("05:09"));
        assert_eq!(day.times.get(PrayerType::Isha), Some("19:40"));
        assert!(day.times.is_complete());

        let hijri = day.hijri.unwrap();
        assert_eq!((hijri.day, hijri.month, hijri.year), (8, 5, 1448));
        assert_eq!(hijri.month_name, "Jumada al-Awwal");
        assert_eq!(hijri.month_name_ar.as_deref(), Some("جُمادى الأولى"));
    }

    #[test]
    fn error_code_in_envelope_is_reported() {
        let body = r#"{"code": 400, "status": "BAD_REQUEST", "data": "Invalid date"}"#;
        match parse_timings(body) {
            Err(AladhanError::Status { code, status }) => {
                assert_eq!(code, 400);
                assert_eq!(status, "BAD_REQUEST");
            }
            other => panic!("expected status error, got {:?}", other.map(|d| d.times)),
        }
    }

    #[test]
    fn missing_prayer_is_a_parse_error() {
        let body = r#"{"code": 200, "data": {"timings": {"Fajr": "05:00"}, "date": {}}}"#;
        assert!(matches!(parse_timings(body), Err(AladhanError::Parse(_))));
    }

    #[test]
    fn parses_month_calendar() {
        let body = r#"{"code": 200, "status": "OK", "data": [
            {"hijri": {"day": "01", "weekday": {"en": "Al Arba'a"}, "month": {"number": 9}, "year": "1447"},
             "gregorian": {"date": "18-02-2026"}},
            {"hijri": {"day": "02", "weekday": {"en": "Al Khamees"}, "month": {"number": 9}, "year": "1447"},
             "gregorian": {"date": "19-02-2026"}}
        ]}"#;
        let days = parse_calendar(body).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].gregorian, NaiveDate::from_ymd_opt(2026, 2, 18).unwrap());
        assert_eq!(days[0].hijri.day, 1);
        assert_eq!(days[1].hijri.month_name, "Ramadan");
    }

    #[test]
    fn rejects_out_of_range_hijri() {
        let body = r#"{"code": 200, "data": {
            "hijri": {"day": "40", "weekday": {"en": "x"}, "month": {"number": 9}, "year": "1447"},
            "gregorian": {"date": "18-02-2026"}}}"#;
        assert!(matches!(parse_conversion(body), Err(AladhanError::Invalid(_))));
    }
}
