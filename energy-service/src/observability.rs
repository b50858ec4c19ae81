use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. `RUST_LOG` directives extend the
/// `energy_service=info` default.
pub fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("energy_service=info".parse().unwrap_or_else(|_| "info".parse().unwrap()))
        .add_directive("energy_client=info".parse().unwrap_or_else(|_| "info".parse().unwrap()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
