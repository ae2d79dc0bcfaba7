use chrono::{NaiveTime, Timelike};

pub const MINUTES_PER_DAY: i64 = 1440;

/// Parse a clock reading into minutes since midnight.
///
/// Accepts 24-hour `HH:MM` (optionally followed by a zone annotation such
/// as `05:12 (EAT)`) and 12-hour `h:MM AM`/`h:MM PM`.
pub fn parse_minutes(text: &str) -> Option<u16> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let upper = text.to_uppercase();
    let time = if upper.ends_with("AM") || upper.ends_with("PM") {
        NaiveTime::parse_from_str(&upper, "%I:%M %p")
            .or_else(|_| NaiveTime::parse_from_str(&upper, "%I:%M%p"))
            .ok()?
    } else {
        let clock = text.split_whitespace().next()?;
        NaiveTime::parse_from_str(clock, "%H:%M").ok()?
    };

    Some(minutes_of(time))
}

pub fn minutes_of(time: NaiveTime) -> u16 {
    (time.hour() * 60 + time.minute()) as u16
}

/// Wrap any signed minute count onto the 0..1440 clock face.
pub fn wrap_minutes(minutes: i64) -> u16 {
    minutes.rem_euclid(MINUTES_PER_DAY) as u16
}

/// `h:MM AM/PM`, no leading zero on the hour.
pub fn format_12h(minutes: u16) -> String {
    let hour = minutes / 60;
    let minute = minutes % 60;
    let period = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hour12, minute, period)
}

/// `HH:MM`
pub fn format_24h(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn format_opt_12h(minutes: Option<u16>) -> String {
    minutes
        .map(format_12h)
        .unwrap_or_else(|| "--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_24h_with_zone_suffix() {
        assert_eq!(parse_minutes("05:12 (EAT)"), Some(312));
        assert_eq!(parse_minutes("18:45"), Some(1125));
        assert_eq!(parse_minutes("00:00"), Some(0));
    }

    #[test]
    fn parses_12h() {
        assert_eq!(parse_minutes("5:30 AM"), Some(330));
        assert_eq!(parse_minutes("12:05 AM"), Some(5));
        assert_eq!(parse_minutes("12:45 PM"), Some(765));
        assert_eq!(parse_minutes("8:00 pm"), Some(1200));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_minutes(""), None);
        assert_eq!(parse_minutes("soon"), None);
        assert_eq!(parse_minutes("25:00"), None);
        assert_eq!(parse_minutes("13:10 PM"), None);
    }

    #[test]
    fn twelve_hour_text_round_trips_whole_day() {
        for m in 0..1440u16 {
            assert_eq!(parse_minutes(&format_12h(m)), Some(m), "minute {}", m);
        }
    }

    #[test]
    fn formats_noon_and_midnight() {
        assert_eq!(format_12h(0), "12:00 AM");
        assert_eq!(format_12h(720), "12:00 PM");
        assert_eq!(format_12h(1435), "11:55 PM");
        assert_eq!(format_24h(65), "01:05");
    }

    #[test]
    fn wraps_backwards_across_midnight() {
        assert_eq!(wrap_minutes(5 - 10), 1435);
        assert_eq!(wrap_minutes(1439 + 2), 1);
    }
}
