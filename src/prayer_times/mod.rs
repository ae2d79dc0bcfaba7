pub mod calculator;
pub mod clock;
pub mod deriver;

use chrono::NaiveDate;

use crate::calendar::hijri::HijriInfo;
use crate::config::{AppConfig, TimeSource};
use crate::models::DailyPrayerTimes;
use crate::network::AladhanClient;

pub use calculator::PrayerCalculator;
pub use deriver::ScheduleDeriver;

/// One day's prayer times as delivered by a provider, with calendar
/// metadata when the provider has it.
#[derive(Debug, Clone)]
pub struct ProvidedDay {
    pub times: DailyPrayerTimes,
    pub hijri: Option<HijriInfo>,
}

/// A source of the day's five prayer times.
pub trait TimesProvider {
    fn name(&self) -> &'static str;

    fn fetch_day(&self, date: NaiveDate) -> anyhow::Result<ProvidedDay>;
}

/// The time sources selected by `[location] source`.
pub struct Providers {
    remote: Option<AladhanClient>,
    offline: Option<PrayerCalculator>,
}

impl Providers {
    pub fn from_config(config: &AppConfig) -> Self {
        match config.location.source {
            TimeSource::Remote => {
                let remote = AladhanClient::new(&config.api, &config.location)
                    .map_err(|e| log::warn!("remote prayer times unavailable: {}", e))
                    .ok();
                Self {
                    remote,
                    offline: None,
                }
            }
            TimeSource::Offline => {
                let offline = PrayerCalculator::from_location(&config.location)
                    .map_err(|e| log::warn!("offline calculation unavailable: {:#}", e))
                    .ok();
                Self {
                    remote: None,
                    offline,
                }
            }
        }
    }

    pub fn times(&self) -> Option<&dyn TimesProvider> {
        match (&self.remote, &self.offline) {
            (Some(remote), _) => Some(remote as &dyn TimesProvider),
            (None, Some(offline)) => Some(offline as &dyn TimesProvider),
            (None, None) => None,
        }
    }

    /// Client for the calendar endpoints; `None` means convert locally.
    pub fn calendar(&self) -> Option<&AladhanClient> {
        self.remote.as_ref()
    }

    /// Today's schedule, resolved through override, provider and fallback.
    pub fn load_schedule(
        &self,
        repo: &dyn crate::db::Repository,
        config: &AppConfig,
        date: NaiveDate,
    ) -> ScheduleDeriver {
        ScheduleDeriver::load(repo, self.times(), config.location.fallback_times.clone(), date)
    }
}
