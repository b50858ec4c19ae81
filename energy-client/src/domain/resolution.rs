use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Weekday names indexed by SQLite's `%w` (0 = Sunday).
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Time-bucketing granularity for aggregation.
///
/// The single-letter aliases are the selector codes of the original
/// dashboard form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    #[serde(alias = "H")]
    Hour,
    DayHours,
    #[serde(alias = "w")]
    Weekday,
    #[serde(alias = "D")]
    Day,
    #[serde(alias = "W")]
    Week,
    #[serde(alias = "M")]
    Month,
    #[serde(alias = "Y")]
    Year,
}

impl Resolution {
    pub const ALL: [Resolution; 7] = [
        Resolution::Hour,
        Resolution::DayHours,
        Resolution::Weekday,
        Resolution::Day,
        Resolution::Week,
        Resolution::Month,
        Resolution::Year,
    ];

    /// `strftime` pattern that derives the bucket key from a stored timestamp.
    pub fn bucket_format(self) -> &'static str {
        match self {
            Resolution::Hour => "%Y-%m-%d %H",
            Resolution::DayHours => "%H",
            Resolution::Weekday => "%w",
            Resolution::Day => "%Y-%m-%d",
            Resolution::Week => "%Y-%W",
            Resolution::Month => "%Y-%m",
            Resolution::Year => "%Y",
        }
    }

    /// Recurring resolutions fold every day (or week) onto one cycle and are
    /// never restricted to a window.
    pub fn recurring_pattern(self) -> Option<RecurringPattern> {
        match self {
            Resolution::DayHours => Some(RecurringPattern::HourOfDay),
            Resolution::Weekday => Some(RecurringPattern::DayOfWeek),
            _ => None,
        }
    }

    pub fn is_recurring(self) -> bool {
        self.recurring_pattern().is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Hour => "hour",
            Resolution::DayHours => "day_hours",
            Resolution::Weekday => "weekday",
            Resolution::Day => "day",
            Resolution::Week => "week",
            Resolution::Month => "month",
            Resolution::Year => "year",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" | "H" => Ok(Resolution::Hour),
            "day_hours" => Ok(Resolution::DayHours),
            "weekday" | "w" => Ok(Resolution::Weekday),
            "day" | "D" => Ok(Resolution::Day),
            "week" | "W" => Ok(Resolution::Week),
            "month" | "M" => Ok(Resolution::Month),
            "year" | "Y" => Ok(Resolution::Year),
            other => Err(format!("unknown resolution '{other}'")),
        }
    }
}

/// Grouping of the recurring-pattern average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurringPattern {
    HourOfDay,
    DayOfWeek,
}

impl RecurringPattern {
    pub fn bucket_format(self) -> &'static str {
        match self {
            RecurringPattern::HourOfDay => "%H",
            RecurringPattern::DayOfWeek => "%w",
        }
    }

    /// Multiplier applied to the per-slot average. A day-of-week slot
    /// averages hourly readings, so ×24 gives a per-day figure comparable
    /// with the hour-of-day view.
    pub fn scale(self) -> f64 {
        match self {
            RecurringPattern::HourOfDay => 1.0,
            RecurringPattern::DayOfWeek => 24.0,
        }
    }
}

/// Maps a `%w` bucket key to its weekday name; other keys pass through.
pub fn weekday_label(key: &str) -> String {
    key.parse::<usize>()
        .ok()
        .and_then(|idx| WEEKDAY_NAMES.get(idx))
        .map(|name| (*name).to_string())
        .unwrap_or_else(|| key.to_string())
}
