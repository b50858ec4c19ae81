use serde::{Deserialize, Serialize};
use time::{Date, Duration, PrimitiveDateTime, Time};

/// Inclusive `[begin, end]` range restricting windowed aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub begin: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
}

impl Window {
    pub fn new(begin: PrimitiveDateTime, end: PrimitiveDateTime) -> Self {
        Self { begin, end }
    }

    /// `[today - days, today]`, covering the whole of both boundary days.
    pub fn trailing_days(today: Date, days: u32) -> Self {
        let first = today - Duration::days(i64::from(days));
        Self {
            begin: PrimitiveDateTime::new(first, Time::MIDNIGHT),
            end: PrimitiveDateTime::new(today, end_of_day()),
        }
    }

    pub fn whole_days(&self) -> i64 {
        (self.end - self.begin).whole_days()
    }
}

fn end_of_day() -> Time {
    Time::from_hms(23, 59, 59).unwrap_or(Time::MIDNIGHT)
}

/// How far back the dashboard looks when no explicit window is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LookbackRepr", into = "LookbackRepr")]
pub enum Lookback {
    Days(u32),
    Everything,
}

impl Lookback {
    /// Resolves to a concrete window, or `None` for the whole dataset.
    pub fn window(self, today: Date) -> Option<Window> {
        match self {
            Lookback::Days(days) => Some(Window::trailing_days(today, days)),
            Lookback::Everything => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LookbackRepr {
    Days(u32),
    Keyword(String),
}

impl TryFrom<LookbackRepr> for Lookback {
    type Error = String;

    fn try_from(repr: LookbackRepr) -> Result<Self, Self::Error> {
        match repr {
            LookbackRepr::Days(0) => Err("lookback must be at least one day".to_string()),
            LookbackRepr::Days(days) => Ok(Lookback::Days(days)),
            LookbackRepr::Keyword(k) => match k.as_str() {
                "lD" => Ok(Lookback::Days(1)),
                "lM" => Ok(Lookback::Days(30)),
                "lY" => Ok(Lookback::Days(365)),
                "A" => Ok(Lookback::Everything),
                _ if k.eq_ignore_ascii_case("everything") => Ok(Lookback::Everything),
                _ => Err(format!("unknown lookback '{k}'")),
            },
        }
    }
}

impl From<Lookback> for LookbackRepr {
    fn from(l: Lookback) -> Self {
        match l {
            Lookback::Days(days) => LookbackRepr::Days(days),
            Lookback::Everything => LookbackRepr::Keyword("everything".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn trailing_window_covers_boundary_days() {
        let w = Window::trailing_days(date!(2021-01-31), 30);
        assert_eq!(w.begin, datetime!(2021-01-01 00:00:00));
        assert_eq!(w.end, datetime!(2021-01-31 23:59:59));
        assert_eq!(w.whole_days(), 30);
    }

    #[test]
    fn everything_has_no_window() {
        assert_eq!(Lookback::Everything.window(date!(2021-01-31)), None);
        assert!(Lookback::Days(1).window(date!(2021-01-31)).is_some());
    }

    #[test]
    fn lookback_serde() {
        let l: Lookback = serde_json::from_str("365").unwrap();
        assert_eq!(l, Lookback::Days(365));
        let l: Lookback = serde_json::from_str("\"everything\"").unwrap();
        assert_eq!(l, Lookback::Everything);
        assert!(serde_json::from_str::<Lookback>("0").is_err());
        for (code, expected) in [
            ("lD", Lookback::Days(1)),
            ("lM", Lookback::Days(30)),
            ("lY", Lookback::Days(365)),
            ("A", Lookback::Everything),
        ] {
            let l: Lookback = serde_json::from_str(&format!("\"{code}\"")).unwrap();
            assert_eq!(l, expected, "{code}");
        }
        assert!(serde_json::from_str::<Lookback>("\"forever\"").is_err());
        assert_eq!(serde_json::to_string(&Lookback::Everything).unwrap(), "\"everything\"");
    }
}
