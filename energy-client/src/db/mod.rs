pub mod consumption_queries;
pub mod store;

pub use consumption_queries::Bucket;
pub use store::{Store, ENERGY_TABLE};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("failed to open store at {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("store query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}
