use crate::pipeline::{Envelope, PipelineError, Transform};
use energy_client::domain::Reading;

/// Replaces non-finite numbers (`inf`, `NaN` spelled out in the export)
/// with zero, the same fallback a malformed cell gets.
///
/// Never rejects a reading.
pub fn normalize_reading(mut env: Envelope<Reading>) -> Envelope<Reading> {
    let r = &mut env.payload;
    let mut replaced = 0u64;

    if !r.consumption.is_finite() {
        r.consumption = 0.0;
        replaced += 1;
    }
    if !r.temperature.is_finite() {
        r.temperature = 0.0;
        replaced += 1;
    }

    if replaced > 0 {
        metrics::counter!("reading_non_finite_values_total").increment(replaced);
        tracing::debug!(timestamp = %r.timestamp, "replaced non-finite values with 0");
    }

    env
}

#[derive(Clone, Default)]
pub struct ReadingNormalization;

#[async_trait::async_trait]
impl Transform<Reading, Reading> for ReadingNormalization {
    async fn apply(&self, input: Envelope<Reading>) -> Result<Envelope<Reading>, PipelineError> {
        Ok(normalize_reading(input))
    }
}
