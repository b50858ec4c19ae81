use energy_client::{domain::Reading, Store};
use futures::StreamExt;

use crate::pipeline::{Envelope, PipelineError, Sink};

/// Replaces the `Energy` table with everything the stream yields.
///
/// The write happens only after the stream is exhausted without error, so an
/// import is all-or-nothing: a bad row anywhere leaves the stored table
/// untouched.
pub struct EnergyTableSink {
    store: Store,
    batch_size: usize,
}

impl EnergyTableSink {
    pub fn new(store: Store, batch_size: usize) -> Self {
        Self { store, batch_size }
    }
}

#[async_trait::async_trait]
impl Sink<Reading> for EnergyTableSink {
    async fn run<S>(&self, mut input: S) -> Result<u64, PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<Reading>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut readings: Vec<Reading> = Vec::new();

        while let Some(item) = input.next().await {
            match item {
                Ok(env) => readings.push(env.payload),
                Err(e) => {
                    tracing::error!(error = %e, parsed = readings.len(), "aborting import, store left unchanged");
                    metrics::counter!("energy_import_aborted_total").increment(1);
                    return Err(e);
                }
            }
        }

        let written = self
            .store
            .replace_readings(&readings, self.batch_size)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "energy table replace failed");
                PipelineError::Sink(e.to_string())
            })?;

        metrics::counter!("energy_rows_written_total").increment(written);
        tracing::info!(rows = written, store = %self.store.path().display(), "energy table replaced");
        Ok(written)
    }
}
