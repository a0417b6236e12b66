use crate::engine::ports::Clock;
use chrono::{FixedOffset, Local, Utc};

/// Wall clock in either the local zone or a fixed UTC offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    pub fn new(offset: Option<FixedOffset>) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> String {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset).format("%Y-%m-%d").to_string(),
            None => Local::now().format("%Y-%m-%d").to_string(),
        }
    }
}

/// Parses `+HH:MM`, `-HH:MM` or `Z`.
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_offsets() {
        assert_eq!(parse_utc_offset("+07:00"), FixedOffset::east_opt(7 * 3600));
        assert_eq!(parse_utc_offset("-03:30"), FixedOffset::east_opt(-(3 * 3600 + 1800)));
        assert_eq!(parse_utc_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("7"), None);
        assert_eq!(parse_utc_offset("+25:00"), None);
        assert_eq!(parse_utc_offset("+-3:00"), None);
        assert_eq!(parse_utc_offset("+07:00 "), FixedOffset::east_opt(7 * 3600));
    }

    #[test]
    fn today_is_an_iso_date() {
        let today = SystemClock::new(parse_utc_offset("+00:00")).today();
        assert_eq!(today.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
    }
}
