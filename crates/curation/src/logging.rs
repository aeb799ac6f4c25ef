use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` overrides the default `info` level.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
