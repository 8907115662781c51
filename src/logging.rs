use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when RUST_LOG is not set
const DEFAULT_DIRECTIVE: &str = "ospi_reconcile=info";

/// Initialize console logging. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
