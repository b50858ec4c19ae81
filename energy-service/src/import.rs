use std::{path::Path, sync::Arc};

use energy_client::{domain::Reading, Store};

use crate::{
    pipeline::{Pipeline, PipelineError},
    sinks::EnergyTableSink,
    sources::ConsumptionCsvFileSource,
    transform::ReadingNormalization,
};

/// Parses one consumption export and replaces the stored table with it.
///
/// Returns the number of readings written.
pub async fn import_consumption_file(path: &Path, store: Store, batch_size: usize) -> Result<u64, PipelineError> {
    tracing::info!(file = %path.display(), store = %store.path().display(), "importing consumption export");

    let pipeline: Pipeline<_, Reading, _> = Pipeline {
        source: ConsumptionCsvFileSource::new(path),
        transforms: vec![Arc::new(ReadingNormalization)],
        sink: EnergyTableSink::new(store, batch_size),
    };

    pipeline.run().await
}
