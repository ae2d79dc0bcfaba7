use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::calendar::hijri::HijriInfo;
use crate::db::repository::Repository;
use crate::models::{
    DailyPrayerTimes, DayOverride, DelayConfig, DerivedSchedule, NextEvent, Phase, PrayerType,
    ScheduledPrayer,
};
use crate::prayer_times::TimesProvider;
use crate::prayer_times::clock::{MINUTES_PER_DAY, format_24h, parse_minutes, wrap_minutes};

const SECONDS_PER_DAY: i64 = MINUTES_PER_DAY * 60;

/// Compute call and congregation times for all five prayers.
///
/// A missing or unreadable prayer time is replaced from `fallback`, then
/// from the built-in default, so every slot of the result is populated.
pub fn derive_schedule(
    times: &DailyPrayerTimes,
    delays: &DelayConfig,
    fallback: &DailyPrayerTimes,
) -> DerivedSchedule {
    let builtin = DailyPrayerTimes::builtin_default();

    let slots = PrayerType::ALL
        .iter()
        .map(|&prayer| {
            let prayer_minute = times
                .get(prayer)
                .and_then(parse_minutes)
                .or_else(|| {
                    log::warn!(
                        "unusable {} time {:?}, using fallback",
                        prayer,
                        times.get(prayer)
                    );
                    fallback.get(prayer).and_then(parse_minutes)
                })
                .or_else(|| builtin.get(prayer).and_then(parse_minutes))
                .unwrap_or(0);

            let delay = delays.delay_for(prayer);
            let raw_call = prayer_minute as i64 - delay.call_offset as i64;
            let call = wrap_minutes(raw_call);
            let raw_congregation = call as i64 + delay.congregation_offset as i64;
            let congregation = wrap_minutes(raw_congregation);

            // Minutes are tracked without a day component; a wrap lands the
            // value on the wrong side of midnight for the same date.
            if raw_call < 0 || raw_congregation >= MINUTES_PER_DAY {
                log::warn!(
                    "{} schedule wraps past midnight (prayer {}, adhan {}, iqaama {})",
                    prayer,
                    format_24h(prayer_minute),
                    format_24h(call),
                    format_24h(congregation)
                );
            }

            ScheduledPrayer {
                prayer,
                prayer_minute: Some(prayer_minute),
                call: Some(call),
                congregation: Some(congregation),
            }
        })
        .collect();

    DerivedSchedule { slots }
}

/// Build a schedule from explicitly entered call and congregation times.
/// Unreadable entries stay `None` and are skipped by [`next_event`].
pub fn explicit_schedule(
    times: &DailyPrayerTimes,
    call_times: &DailyPrayerTimes,
    congregation_times: &DailyPrayerTimes,
) -> DerivedSchedule {
    let slots = PrayerType::ALL
        .iter()
        .map(|&prayer| ScheduledPrayer {
            prayer,
            prayer_minute: times.get(prayer).and_then(parse_minutes),
            call: call_times.get(prayer).and_then(parse_minutes),
            congregation: congregation_times.get(prayer).and_then(parse_minutes),
        })
        .collect();
    DerivedSchedule { slots }
}

/// The first call or congregation strictly after `now_minutes`, scanning
/// prayers in canonical order. Past the last event of the day, tomorrow's
/// Fajr adhan.
pub fn next_event(schedule: &DerivedSchedule, now_minutes: u16) -> NextEvent {
    for prayer in PrayerType::ALL {
        let Some(slot) = schedule.slot(prayer) else {
            continue;
        };
        if slot.call.is_some_and(|m| m > now_minutes) {
            return NextEvent {
                prayer,
                phase: Phase::Call,
                minute: slot.call,
                tomorrow: false,
            };
        }
        if slot.congregation.is_some_and(|m| m > now_minutes) {
            return NextEvent {
                prayer,
                phase: Phase::Congregation,
                minute: slot.congregation,
                tomorrow: false,
            };
        }
    }

    NextEvent {
        prayer: PrayerType::Fajr,
        phase: Phase::Call,
        minute: schedule.slot(PrayerType::Fajr).and_then(|s| s.call),
        tomorrow: true,
    }
}

/// Seconds from `now` until `event`, or `None` if the event has no time.
pub fn seconds_until(event: &NextEvent, now: NaiveTime) -> Option<i64> {
    let target = event.minute? as i64 * 60;
    let mut diff = target - now.num_seconds_from_midnight() as i64;
    if event.tomorrow || diff <= 0 {
        diff += SECONDS_PER_DAY;
    }
    Some(diff)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleSource {
    /// Administrator override for the day.
    Override,
    /// Named provider (remote API or offline calculation).
    Provider(&'static str),
    /// Built-in or configured fallback times.
    Fallback,
}

impl ScheduleSource {
    pub fn label(&self) -> &'static str {
        match self {
            ScheduleSource::Override => "admin override",
            ScheduleSource::Provider(name) => *name,
            ScheduleSource::Fallback => "default times",
        }
    }
}

/// Holds one day's prayer times and everything derived from them.
///
/// Built once per calendar day; administrator edits are applied through
/// `&mut self` and re-derive immediately.
pub struct ScheduleDeriver {
    date: NaiveDate,
    times: DailyPrayerTimes,
    stored_delays: DelayConfig,
    override_delays: Option<DelayConfig>,
    schedule: DerivedSchedule,
    source: ScheduleSource,
    explicit: bool,
    hijri: Option<HijriInfo>,
    fallback: DailyPrayerTimes,
}

impl ScheduleDeriver {
    /// Resolve `date` through override, provider and fallback, in that order.
    /// Storage and provider failures are logged and never returned.
    pub fn load(
        repo: &dyn Repository,
        provider: Option<&dyn TimesProvider>,
        fallback: DailyPrayerTimes,
        date: NaiveDate,
    ) -> Self {
        let mut deriver = Self {
            date,
            times: fallback.clone(),
            stored_delays: DelayConfig::default(),
            override_delays: None,
            schedule: DerivedSchedule { slots: Vec::new() },
            source: ScheduleSource::Fallback,
            explicit: false,
            hijri: None,
            fallback,
        };
        deriver.rebuild(repo, provider, date);
        deriver
    }

    fn rebuild(&mut self, repo: &dyn Repository, provider: Option<&dyn TimesProvider>, date: NaiveDate) {
        self.date = date;
        self.hijri = None;
        self.override_delays = None;
        self.explicit = false;
        self.stored_delays = load_stored_delays(repo);

        match repo.get_override(date) {
            Ok(Some(day_override)) => {
                log::info!("using administrator override for {}", date);
                self.adopt_override(day_override);
                return;
            }
            Ok(None) => {}
            Err(e) => log::warn!("ignoring stored prayer-time override: {}", e),
        }

        let provided = provider.map(|p| (p.name(), p.fetch_day(date)));
        match provided {
            Some((name, Ok(day))) => {
                log::info!("prayer times for {} from {}", date, name);
                if !day.times.is_complete() {
                    log::warn!("{} returned an incomplete day for {}; gaps use default times", name, date);
                }
                self.times = day.times;
                self.hijri = day.hijri;
                self.source = ScheduleSource::Provider(name);
            }
            Some((name, Err(e))) => {
                log::warn!("{} failed for {}: {:#}; using default times", name, date, e);
                self.times = self.fallback.clone();
                self.source = ScheduleSource::Fallback;
            }
            None => {
                self.times = self.fallback.clone();
                self.source = ScheduleSource::Fallback;
            }
        }
        self.rederive();
    }

    fn adopt_override(&mut self, day_override: DayOverride) {
        self.source = ScheduleSource::Override;
        self.override_delays = day_override.delays.clone();
        if let Some((call, congregation)) = day_override.explicit_schedule() {
            self.schedule = explicit_schedule(&day_override.times, call, congregation);
            self.explicit = true;
            self.times = day_override.times;
        } else {
            self.times = day_override.times;
            self.explicit = false;
            self.rederive();
        }
    }

    fn rederive(&mut self) {
        if self.explicit {
            return;
        }
        self.schedule = derive_schedule(&self.times, &self.delays(), &self.fallback);
    }

    /// Rebuild when the calendar date has moved on. Returns whether it did.
    pub fn refresh_if_stale(
        &mut self,
        repo: &dyn Repository,
        provider: Option<&dyn TimesProvider>,
        today: NaiveDate,
    ) -> bool {
        if today == self.date {
            return false;
        }
        log::info!("day changed ({} -> {}), refreshing schedule", self.date, today);
        self.rebuild(repo, provider, today);
        true
    }

    /// Rebuild the current day from scratch, e.g. after an override is cleared.
    pub fn reload(&mut self, repo: &dyn Repository, provider: Option<&dyn TimesProvider>) {
        let date = self.date;
        self.rebuild(repo, provider, date);
    }

    /// Adopt an override that has just been stored.
    pub fn apply_override(&mut self, day_override: DayOverride) {
        self.adopt_override(day_override);
    }

    /// Adopt a delay configuration that has just been stored.
    pub fn apply_delays(&mut self, stored: &DelayConfig) {
        self.stored_delays = DelayConfig::default().merged_with(stored);
        self.rederive();
    }

    /// Effective delays: override entries, then stored, then built-in.
    pub fn delays(&self) -> DelayConfig {
        match &self.override_delays {
            Some(o) => self.stored_delays.merged_with(o),
            None => self.stored_delays.clone(),
        }
    }

    pub fn next_event(&self, now: NaiveTime) -> NextEvent {
        next_event(&self.schedule, (now.hour() * 60 + now.minute()) as u16)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn times(&self) -> &DailyPrayerTimes {
        &self.times
    }

    pub fn schedule(&self) -> &DerivedSchedule {
        &self.schedule
    }

    pub fn source(&self) -> ScheduleSource {
        self.source
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub fn hijri(&self) -> Option<&HijriInfo> {
        self.hijri.as_ref()
    }
}

fn load_stored_delays(repo: &dyn Repository) -> DelayConfig {
    match repo.get_delays() {
        Ok(Some(stored)) => DelayConfig::default().merged_with(&stored),
        Ok(None) => DelayConfig::default(),
        Err(e) => {
            log::warn!("ignoring stored delay configuration: {}", e);
            DelayConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::SqliteRepository;
    use crate::models::PrayerDelay;
    use crate::prayer_times::ProvidedDay;
    use crate::prayer_times::clock::format_12h;

    fn derive(times: &DailyPrayerTimes, delays: &DelayConfig) -> DerivedSchedule {
        derive_schedule(times, delays, &DailyPrayerTimes::builtin_default())
    }

    struct FixedProvider(DailyPrayerTimes);

    impl TimesProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn fetch_day(&self, _date: NaiveDate) -> anyhow::Result<ProvidedDay> {
            Ok(ProvidedDay {
                times: self.0.clone(),
                hijri: None,
            })
        }
    }

    struct DownProvider;

    impl TimesProvider for DownProvider {
        fn name(&self) -> &'static str {
            "down"
        }

        fn fetch_day(&self, _date: NaiveDate) -> anyhow::Result<ProvidedDay> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn slot(prayer: PrayerType, call: u16, congregation: u16) -> ScheduledPrayer {
        ScheduledPrayer {
            prayer,
            prayer_minute: None,
            call: Some(call),
            congregation: Some(congregation),
        }
    }

    fn times(entries: &[(PrayerType, &str)]) -> DailyPrayerTimes {
        entries.iter().map(|(p, t)| (*p, t.to_string())).collect()
    }

    #[test]
    fn call_and_congregation_follow_offsets() {
        let t = times(&[(PrayerType::Dhuhr, "12:45")]);
        let mut delays = DelayConfig::empty();
        delays.set(PrayerType::Dhuhr, PrayerDelay::new(10, 5));
        let schedule = derive(&t, &delays);
        let dhuhr = schedule.slot(PrayerType::Dhuhr).unwrap();
        assert_eq!(dhuhr.prayer_minute, Some(765));
        assert_eq!(dhuhr.call, Some(755));
        assert_eq!(dhuhr.congregation, Some(760));
        assert_eq!(format_12h(dhuhr.call.unwrap()), "12:35 PM");
    }

    #[test]
    fn call_wraps_backwards_over_midnight() {
        let t = times(&[(PrayerType::Isha, "00:05")]);
        let mut delays = DelayConfig::empty();
        delays.set(PrayerType::Isha, PrayerDelay::new(10, 20));
        let schedule = derive(&t, &delays);
        let isha = schedule.slot(PrayerType::Isha).unwrap();
        assert_eq!(isha.call, Some(1435));
        assert_eq!(isha.congregation, Some(15));
    }

    #[test]
    fn zero_offsets_leave_prayer_time_unchanged() {
        let t = DailyPrayerTimes::builtin_default();
        let schedule = derive(&t, &DelayConfig::uniform(PrayerDelay::new(0, 0)));
        for s in &schedule.slots {
            assert_eq!(s.call, s.prayer_minute);
            assert_eq!(s.congregation, s.prayer_minute);
        }
    }

    #[test]
    fn unreadable_time_falls_back_to_default() {
        let t = times(&[(PrayerType::Fajr, "dawn-ish"), (PrayerType::Asr, "15:40")]);
        let schedule = derive(&t, &DelayConfig::default());
        // 05:30 default minus 10
        assert_eq!(schedule.slot(PrayerType::Fajr).unwrap().call, Some(320));
        // provided value kept
        assert_eq!(schedule.slot(PrayerType::Asr).unwrap().call, Some(930));
        // absent value also defaulted (18:45 - 5)
        assert_eq!(schedule.slot(PrayerType::Maghrib).unwrap().call, Some(1120));
    }

    #[test]
    fn next_event_moves_from_congregation_to_next_call() {
        let schedule = DerivedSchedule {
            slots: vec![
                slot(PrayerType::Fajr, 300, 305),
                slot(PrayerType::Dhuhr, 750, 755),
                slot(PrayerType::Asr, 920, 925),
                slot(PrayerType::Maghrib, 1120, 1122),
                slot(PrayerType::Isha, 1190, 1195),
            ],
        };
        let event = next_event(&schedule, 310);
        assert_eq!(
            event,
            NextEvent {
                prayer: PrayerType::Dhuhr,
                phase: Phase::Call,
                minute: Some(750),
                tomorrow: false
            }
        );

        let between = next_event(&schedule, 302);
        assert_eq!(between.prayer, PrayerType::Fajr);
        assert_eq!(between.phase, Phase::Congregation);

        // strictly later: equal is not next
        assert_eq!(next_event(&schedule, 750).phase, Phase::Congregation);
    }

    #[test]
    fn next_event_rolls_over_to_fajr() {
        let schedule = derive(&DailyPrayerTimes::builtin_default(), &DelayConfig::default());
        let event = next_event(&schedule, 1439);
        assert_eq!(event.prayer, PrayerType::Fajr);
        assert_eq!(event.phase, Phase::Call);
        assert_eq!(event.minute, Some(320));
        assert!(event.tomorrow);
    }

    #[test]
    fn next_event_skips_unparsed_slots() {
        let schedule = DerivedSchedule {
            slots: vec![
                ScheduledPrayer {
                    prayer: PrayerType::Fajr,
                    prayer_minute: None,
                    call: None,
                    congregation: None,
                },
                slot(PrayerType::Dhuhr, 750, 755),
            ],
        };
        assert_eq!(next_event(&schedule, 100).prayer, PrayerType::Dhuhr);

        let rolled = next_event(&schedule, 800);
        assert!(rolled.tomorrow);
        assert_eq!(rolled.minute, None);
    }

    #[test]
    fn countdown_crosses_midnight_for_tomorrow() {
        let event = NextEvent {
            prayer: PrayerType::Fajr,
            phase: Phase::Call,
            minute: Some(320),
            tomorrow: true,
        };
        let now = NaiveTime::from_hms_opt(23, 0, 0).unwrap();
        assert_eq!(seconds_until(&event, now), Some(3600 + 320 * 60));

        let today = NextEvent { tomorrow: false, minute: Some(750), ..event };
        let noonish = NaiveTime::from_hms_opt(12, 29, 30).unwrap();
        assert_eq!(seconds_until(&today, noonish), Some(30));
    }

    #[test]
    fn provider_times_are_used() {
        let repo = SqliteRepository::in_memory().unwrap();
        let provider = FixedProvider(times(&[
            (PrayerType::Fajr, "05:09"),
            (PrayerType::Dhuhr, "12:27"),
            (PrayerType::Asr, "15:37"),
            (PrayerType::Maghrib, "18:32"),
            (PrayerType::Isha, "19:40"),
        ]));
        let deriver = ScheduleDeriver::load(
            &repo,
            Some(&provider),
            DailyPrayerTimes::builtin_default(),
            day(),
        );
        assert_eq!(deriver.source(), ScheduleSource::Provider("fixed"));
        assert_eq!(deriver.schedule().slot(PrayerType::Fajr).unwrap().call, Some(299));
    }

    #[test]
    fn provider_failure_uses_fallback() {
        let repo = SqliteRepository::in_memory().unwrap();
        let deriver = ScheduleDeriver::load(
            &repo,
            Some(&DownProvider),
            DailyPrayerTimes::builtin_default(),
            day(),
        );
        assert_eq!(deriver.source(), ScheduleSource::Fallback);
        assert_eq!(deriver.times().get(PrayerType::Isha), Some("20:00"));
    }

    #[test]
    fn malformed_stored_config_falls_back_without_panicking() {
        let repo = SqliteRepository::in_memory().unwrap();
        repo.set_meta(crate::db::repository::DELAYS_KEY, "{not json").unwrap();
        repo.set_meta(crate::db::repository::OVERRIDE_KEY, "[1, 2").unwrap();

        let deriver = ScheduleDeriver::load(
            &repo,
            Some(&DownProvider),
            DailyPrayerTimes::builtin_default(),
            day(),
        );
        assert_eq!(deriver.source(), ScheduleSource::Fallback);
        assert_eq!(deriver.delays(), DelayConfig::default());
        assert_eq!(
            deriver.schedule(),
            &derive(&DailyPrayerTimes::builtin_default(), &DelayConfig::default())
        );
    }

    #[test]
    fn override_for_today_wins_and_expires_next_day() {
        let repo = SqliteRepository::in_memory().unwrap();
        let mut o = DayOverride::new(day(), times(&[(PrayerType::Fajr, "04:50")]));
        let mut patch = DelayConfig::empty();
        patch.set(PrayerType::Fajr, PrayerDelay::new(0, 30));
        o.delays = Some(patch);
        repo.put_override(&o).unwrap();

        let mut deriver = ScheduleDeriver::load(
            &repo,
            Some(&DownProvider),
            DailyPrayerTimes::builtin_default(),
            day(),
        );
        assert_eq!(deriver.source(), ScheduleSource::Override);
        let fajr = *deriver.schedule().slot(PrayerType::Fajr).unwrap();
        assert_eq!((fajr.call, fajr.congregation), (Some(290), Some(320)));

        let tomorrow = day().succ_opt().unwrap();
        assert!(deriver.refresh_if_stale(&repo, Some(&DownProvider), tomorrow));
        assert_eq!(deriver.source(), ScheduleSource::Fallback);
        assert!(!deriver.refresh_if_stale(&repo, Some(&DownProvider), tomorrow));
    }

    #[test]
    fn explicit_override_ignores_delay_changes() {
        let repo = SqliteRepository::in_memory().unwrap();
        let mut o = DayOverride::new(day(), DailyPrayerTimes::builtin_default());
        o.call_times = Some(times(&[(PrayerType::Fajr, "05:15")]));
        o.congregation_times = Some(times(&[(PrayerType::Fajr, "05:40")]));

        let mut deriver =
            ScheduleDeriver::load(&repo, None, DailyPrayerTimes::builtin_default(), day());
        deriver.apply_override(o);
        assert!(deriver.is_explicit());

        deriver.apply_delays(&DelayConfig::uniform(PrayerDelay::new(0, 0)));
        let fajr = deriver.schedule().slot(PrayerType::Fajr).unwrap();
        assert_eq!((fajr.call, fajr.congregation), (Some(315), Some(340)));
        assert_eq!(deriver.schedule().slot(PrayerType::Dhuhr).unwrap().call, None);
    }

    #[test]
    fn applied_delays_rederive_immediately() {
        let repo = SqliteRepository::in_memory().unwrap();
        let mut deriver =
            ScheduleDeriver::load(&repo, None, DailyPrayerTimes::builtin_default(), day());
        let mut stored = DelayConfig::empty();
        stored.set(PrayerType::Asr, PrayerDelay::new(0, 15));
        deriver.apply_delays(&stored);
        let asr = deriver.schedule().slot(PrayerType::Asr).unwrap();
        assert_eq!((asr.call, asr.congregation), (Some(930), Some(945)));
        // others keep built-in defaults
        assert_eq!(deriver.schedule().slot(PrayerType::Fajr).unwrap().call, Some(320));
    }
}
