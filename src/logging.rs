use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
///
/// Output goes to stderr so JSON written to stdout stays parseable. Calling
/// this more than once is a no-op.
pub fn init_logging(default_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    if json {
        builder.json().try_init().ok();
    } else {
        builder.try_init().ok();
    }

    tracing::debug!(json, "logging initialised");
}
