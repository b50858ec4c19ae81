//! Chart description handed to the browser-side renderer.
//!
//! The shape follows Plotly's figure JSON (`data` + `layout`) so the page
//! can pass it straight to `Plotly.react`.

use energy_client::{db::Bucket, domain::Resolution};
use serde::Serialize;

pub const CHART_TITLE: &str = "Your energy consumption";
pub const CONSUMPTION_UNIT: &str = "kWh";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Bar,
    Scatter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub x: Vec<String>,
    pub y: Vec<f64>,
    #[serde(rename = "type")]
    pub kind: TraceKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
}

impl Trace {
    fn from_buckets(buckets: Vec<Bucket>, kind: TraceKind, name: &str) -> Self {
        let (x, y) = buckets.into_iter().map(|b| (b.label, b.value)).unzip();
        Self {
            x,
            y,
            kind,
            name: name.to_string(),
            mode: match kind {
                TraceKind::Scatter => Some("lines"),
                TraceKind::Bar => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl From<&str> for Title {
    fn from(text: &str) -> Self {
        Self { text: text.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    Date,
    Category,
    Linear,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
    #[serde(rename = "type")]
    pub kind: AxisType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[String; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
    pub fixedrange: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub dragmode: &'static str,
    pub showlegend: bool,
}

fn axis_title(resolution: Resolution) -> &'static str {
    match resolution {
        Resolution::Hour => "Hour",
        Resolution::DayHours => "Hour of day",
        Resolution::Weekday => "Weekday",
        Resolution::Day => "Day",
        Resolution::Week => "Week",
        Resolution::Month => "Month",
        Resolution::Year => "Year",
    }
}

/// Week keys (`2021-05`) and recurring slots are not calendar dates.
fn axis_type(resolution: Resolution) -> AxisType {
    match resolution {
        Resolution::Hour | Resolution::Day | Resolution::Month | Resolution::Year => AxisType::Date,
        Resolution::Week | Resolution::Weekday | Resolution::DayHours => AxisType::Category,
    }
}

impl Figure {
    /// Consumption bars, with the temperature line overlaid when given.
    ///
    /// `x_range` pins the visible range after a zoom.
    pub fn consumption(
        resolution: Resolution,
        consumption: Vec<Bucket>,
        temperature: Option<Vec<Bucket>>,
        x_range: Option<[String; 2]>,
    ) -> Self {
        let bar_name = if resolution.is_recurring() {
            "Average consumption"
        } else {
            "Consumption"
        };

        let mut data = vec![Trace::from_buckets(consumption, TraceKind::Bar, bar_name)];
        if let Some(temperature) = temperature {
            data.push(Trace::from_buckets(temperature, TraceKind::Scatter, "Temperature"));
        }

        let kind = axis_type(resolution);
        let layout = Layout {
            title: CHART_TITLE.into(),
            xaxis: Axis {
                title: axis_title(resolution).into(),
                kind,
                range: x_range,
                rangeslider: (kind == AxisType::Date).then_some(RangeSlider { visible: true }),
                fixedrange: false,
            },
            yaxis: Axis {
                title: CONSUMPTION_UNIT.into(),
                kind: AxisType::Linear,
                range: None,
                rangeslider: None,
                fixedrange: true,
            },
            dragmode: "zoom",
            showlegend: data.len() > 1,
        };

        Self { data, layout }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn buckets(points: &[(&str, f64)]) -> Vec<Bucket> {
        points
            .iter()
            .map(|(label, value)| Bucket {
                label: label.to_string(),
                value: *value,
            })
            .collect()
    }

    #[test]
    fn daily_figure_with_temperature() {
        let fig = Figure::consumption(
            Resolution::Day,
            buckets(&[("2021-01-01", 12.5), ("2021-01-02", 10.0)]),
            Some(buckets(&[("2021-01-01", -40.0)])),
            None,
        );

        let v = serde_json::to_value(&fig).unwrap();
        assert_eq!(v["data"][0]["type"], "bar");
        assert_eq!(v["data"][0]["x"], json!(["2021-01-01", "2021-01-02"]));
        assert_eq!(v["data"][0]["y"], json!([12.5, 10.0]));
        assert!(v["data"][0].get("mode").is_none());
        assert_eq!(v["data"][1]["type"], "scatter");
        assert_eq!(v["data"][1]["mode"], "lines");
        assert_eq!(v["layout"]["title"]["text"], CHART_TITLE);
        assert_eq!(v["layout"]["xaxis"]["type"], "date");
        assert_eq!(v["layout"]["xaxis"]["title"]["text"], "Day");
        assert_eq!(v["layout"]["xaxis"]["rangeslider"]["visible"], true);
        assert_eq!(v["layout"]["yaxis"]["title"]["text"], "kWh");
        assert_eq!(v["layout"]["dragmode"], "zoom");
        assert_eq!(v["layout"]["showlegend"], true);
        assert!(v["layout"]["xaxis"].get("range").is_none());
    }

    #[test]
    fn weekday_figure_is_categorical() {
        let fig = Figure::consumption(Resolution::Weekday, buckets(&[("Sunday", 72.0)]), None, None);
        assert_eq!(fig.data.len(), 1);
        assert_eq!(fig.data[0].name, "Average consumption");
        assert_eq!(fig.layout.xaxis.kind, AxisType::Category);
        assert!(fig.layout.xaxis.rangeslider.is_none());
        assert!(!fig.layout.showlegend);
    }

    #[test]
    fn zoom_range_is_pinned() {
        let range = ["2021-01-01 00:00:00".to_string(), "2021-01-08 00:00:00".to_string()];
        let fig = Figure::consumption(Resolution::Hour, Vec::new(), None, Some(range.clone()));
        assert_eq!(fig.layout.xaxis.range, Some(range));
        assert!(fig.data[0].x.is_empty());
    }
}
