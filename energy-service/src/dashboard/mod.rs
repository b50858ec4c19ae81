//! Chart rendering over the readings store.
//!
//! Each call re-reads the store; the only inputs are the form controls and,
//! for zoom events, the relayout payload.

pub mod controls;
pub mod figure;
pub mod zoom;

use std::time::Instant;

use energy_client::{
    db::consumption_queries::{consumption_sum, recurring_average, temperature_sum},
    domain::{reading::format_timestamp, Resolution, Window},
    Store, StoreError,
};
use time::{Date, OffsetDateTime};

pub use controls::{Controls, DisplayOption};
pub use figure::Figure;
pub use zoom::{resolution_for_span, RelayoutEvent, ZoomIntent, RESET_RESOLUTION};

use crate::config::DashboardConfig;

pub struct Dashboard {
    store: Store,
    config: DashboardConfig,
}

impl Dashboard {
    pub fn new(store: Store, config: DashboardConfig) -> Self {
        Self { store, config }
    }

    pub fn startup_controls(&self) -> Controls {
        Controls::startup(self.config.default_lookback_days)
    }

    /// Figure for the current form state over its lookback window.
    pub async fn figure(&self, controls: &Controls, today: Date) -> Result<Figure, StoreError> {
        let window = controls.lookback.window(today);
        self.render(controls, controls.resolution, window.as_ref(), false).await
    }

    /// Re-derives the resolution from a zoom event.
    ///
    /// `Ok(None)` means the event carried nothing to act on and the chart
    /// should stay as it is.
    pub async fn relayout(
        &self,
        controls: &Controls,
        event: &RelayoutEvent,
        today: Date,
    ) -> Result<Option<Figure>, StoreError> {
        match event.intent() {
            ZoomIntent::Range(window) => {
                let resolution = resolution_for_span(window.whole_days());
                tracing::debug!(span_days = window.whole_days(), %resolution, "zoom");
                self.render(controls, resolution, Some(&window), true).await.map(Some)
            }
            ZoomIntent::Reset => {
                let window = controls.lookback.window(today);
                self.render(controls, RESET_RESOLUTION, window.as_ref(), false)
                    .await
                    .map(Some)
            }
            ZoomIntent::Unrecognized => Ok(None),
        }
    }

    async fn render(
        &self,
        controls: &Controls,
        resolution: Resolution,
        window: Option<&Window>,
        pin_range: bool,
    ) -> Result<Figure, StoreError> {
        let started = Instant::now();

        let consumption = match resolution.recurring_pattern() {
            Some(pattern) => recurring_average(&self.store, pattern).await?,
            None => consumption_sum(&self.store, resolution, window).await?,
        };
        let temperature = if controls.overlays_temperature(resolution) {
            Some(temperature_sum(&self.store, window).await?)
        } else {
            None
        };

        metrics::histogram!("dashboard_query_seconds").record(started.elapsed().as_secs_f64());
        metrics::counter!("dashboard_figures_rendered_total", "resolution" => resolution.as_str()).increment(1);

        let x_range = match window {
            Some(w) if pin_range => Some([format_timestamp(w.begin)?, format_timestamp(w.end)?]),
            _ => None,
        };

        Ok(Figure::consumption(resolution, consumption, temperature, x_range))
    }
}

/// Today's date in the local zone the exports are recorded in, falling
/// back to UTC when the offset cannot be determined.
pub fn local_today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
