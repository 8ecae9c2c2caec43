use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};

pub const DEFAULT_FORMAT: &str = "%H:%M:%S";

/// Header clock, redrawn once a second by the live view.
#[derive(Debug, Clone)]
pub struct Clock {
    format: String,
}

impl Clock {
    /// Clock with a strftime `format`. An invalid format falls back to
    /// [`DEFAULT_FORMAT`].
    pub fn new(format: impl Into<String>) -> Self {
        let format = format.into();
        if is_valid_format(&format) {
            Self { format }
        } else {
            Self {
                format: DEFAULT_FORMAT.to_string(),
            }
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn now(&self) -> String {
        self.render(&Local::now())
    }

    pub fn render<Tz: TimeZone>(&self, time: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut out = String::new();
        if write!(out, "{}", time.format(&self.format)).is_err() {
            out.clear();
            let _ = write!(out, "{}", time.format(DEFAULT_FORMAT));
        }
        out
    }
}

/// Whether every strftime specifier in `format` is recognized.
pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn renders_with_format() {
        let t = Utc.with_ymd_and_hms(2026, 3, 4, 9, 5, 7).unwrap();
        assert_eq!(Clock::default().render(&t), "09:05:07");
        assert_eq!(Clock::new("%I:%M %p").render(&t), "09:05 AM");
    }

    #[test]
    fn invalid_format_falls_back() {
        let t = Utc.with_ymd_and_hms(2026, 3, 4, 9, 5, 7).unwrap();
        for bad in ["%Q", "%H:%M:%"] {
            let clock = Clock::new(bad);
            assert_eq!(clock.format(), DEFAULT_FORMAT, "{bad}");
            assert_eq!(clock.render(&t), "09:05:07");
            assert_eq!(clock.now().len(), 8);
        }
        assert!(is_valid_format("%H:%M:%S"));
        assert!(!is_valid_format("%Q"));
    }
}
