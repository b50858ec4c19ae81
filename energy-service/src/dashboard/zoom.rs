//! Resolution selection from chart zoom events.
//!
//! A zoom event is the relayout payload the chart emits after the user
//! drags a range or double-clicks to reset. The event carries the whole
//! visible range, so nothing is remembered between events.

use energy_client::domain::{Resolution, Window};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{macros::format_description, Date, PrimitiveDateTime, Time};

/// Resolution after an autosize/reset event.
pub const RESET_RESOLUTION: Resolution = Resolution::Month;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanBound {
    Above(i64),
    AtMost(i64),
}

impl SpanBound {
    pub fn matches(self, span_days: i64) -> bool {
        match self {
            SpanBound::Above(limit) => span_days > limit,
            SpanBound::AtMost(limit) => span_days <= limit,
        }
    }
}

/// Evaluated top to bottom; every matching rule overwrites the previous
/// pick, so the last satisfied rule decides. The first two bounds overlap
/// in coverage (together they match every span) and must stay in this
/// order.
pub const ZOOM_RULES: [(SpanBound, Resolution); 4] = [
    (SpanBound::Above(390), Resolution::Year),
    (SpanBound::AtMost(390), Resolution::Month),
    (SpanBound::AtMost(69), Resolution::Day),
    (SpanBound::AtMost(7), Resolution::Hour),
];

pub fn resolution_for_span(span_days: i64) -> Resolution {
    ZOOM_RULES
        .iter()
        .fold(RESET_RESOLUTION, |picked, (bound, resolution)| {
            if bound.matches(span_days) {
                *resolution
            } else {
                picked
            }
        })
}

/// Raw relayout payload, e.g. `{"xaxis.range[0]": "...", "xaxis.range[1]": "..."}`
/// or `{"xaxis.autorange": true}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelayoutEvent(pub Map<String, Value>);

#[derive(Debug, Clone, PartialEq)]
pub enum ZoomIntent {
    Range(Window),
    Reset,
    Unrecognized,
}

impl RelayoutEvent {
    pub fn intent(&self) -> ZoomIntent {
        if let Some((start, end)) = self.range_bounds() {
            return match (parse_zoom_bound(start), parse_zoom_bound(end)) {
                (Some(a), Some(b)) if a <= b => ZoomIntent::Range(Window::new(a, b)),
                (Some(a), Some(b)) => ZoomIntent::Range(Window::new(b, a)),
                _ => {
                    tracing::warn!(start, end, "ignoring zoom event with unparseable range");
                    ZoomIntent::Unrecognized
                }
            };
        }

        let flag = |key: &str| self.0.get(key).and_then(Value::as_bool).unwrap_or(false);
        if flag("xaxis.autorange") || flag("autosize") {
            return ZoomIntent::Reset;
        }

        ZoomIntent::Unrecognized
    }

    fn range_bounds(&self) -> Option<(&str, &str)> {
        let split = (self.0.get("xaxis.range[0]"), self.0.get("xaxis.range[1]"));
        if let (Some(Value::String(a)), Some(Value::String(b))) = split {
            return Some((a.as_str(), b.as_str()));
        }

        match self.0.get("xaxis.range").and_then(Value::as_array).map(Vec::as_slice) {
            Some([Value::String(a), Value::String(b)]) => Some((a.as_str(), b.as_str())),
            _ => None,
        }
    }
}

/// Accepts `YYYY-MM-DD` optionally followed by ` HH` or `THH`; anything
/// after the hour (minutes, fractions) is ignored.
pub fn parse_zoom_bound(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();
    let date = Date::parse(raw.get(..10)?, format_description!("[year]-[month]-[day]")).ok()?;

    let hour = match raw.get(10..) {
        None | Some("") => 0,
        Some(rest) => {
            let rest = rest.strip_prefix(' ').or_else(|| rest.strip_prefix('T'))?;
            let digits: String = rest.chars().take_while(char::is_ascii_digit).take(2).collect();
            digits.parse::<u8>().ok()?
        }
    };

    Some(PrimitiveDateTime::new(date, Time::from_hms(hour, 0, 0).ok()?))
}
