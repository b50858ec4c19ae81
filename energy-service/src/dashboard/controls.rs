use std::collections::BTreeSet;

use energy_client::domain::{Lookback, Resolution};
use serde::{Deserialize, Serialize};

/// Toggles from the "additional options" checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayOption {
    #[serde(alias = "t")]
    ShowTemperature,
}

/// Full state of the dashboard form. Every request carries all of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub resolution: Resolution,
    pub lookback: Lookback,
    #[serde(default)]
    pub options: BTreeSet<DisplayOption>,
}

impl Controls {
    /// First page load: daily bars over the trailing window, temperature on.
    pub fn startup(default_lookback_days: u32) -> Self {
        Self {
            resolution: Resolution::Day,
            lookback: Lookback::Days(default_lookback_days),
            options: BTreeSet::from([DisplayOption::ShowTemperature]),
        }
    }

    /// Temperature is only overlaid on hourly and daily bars.
    pub fn overlays_temperature(&self, resolution: Resolution) -> bool {
        self.options.contains(&DisplayOption::ShowTemperature)
            && matches!(resolution, Resolution::Hour | Resolution::Day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_is_daily_thirty_days_with_temperature() {
        let c = Controls::startup(30);
        assert_eq!(c.resolution, Resolution::Day);
        assert_eq!(c.lookback, Lookback::Days(30));
        assert!(c.overlays_temperature(Resolution::Day));
    }

    #[test]
    fn temperature_only_for_hour_and_day() {
        let c = Controls::startup(30);
        for r in Resolution::ALL {
            let expected = matches!(r, Resolution::Hour | Resolution::Day);
            assert_eq!(c.overlays_temperature(r), expected, "{r}");
        }

        let mut off = c.clone();
        off.options.clear();
        assert!(!off.overlays_temperature(Resolution::Hour));
    }

    #[test]
    fn deserializes_form_payload() {
        let c: Controls = serde_json::from_str(
            r#"{"resolution": "H", "lookback": "everything", "options": ["t"]}"#,
        )
        .unwrap();
        assert_eq!(c.resolution, Resolution::Hour);
        assert_eq!(c.lookback, Lookback::Everything);
        assert!(c.options.contains(&DisplayOption::ShowTemperature));

        let c: Controls = serde_json::from_str(r#"{"resolution": "week", "lookback": 365}"#).unwrap();
        assert!(c.options.is_empty());
    }
}
