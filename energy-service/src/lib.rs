pub mod api;
pub mod config;
pub mod dashboard;
pub mod import;
pub mod metrics_server;
pub mod observability;
pub mod pipeline;
pub mod sinks;
pub mod sources;
pub mod transform;

pub use dashboard::Dashboard;
pub use pipeline::{Envelope, Pipeline};
