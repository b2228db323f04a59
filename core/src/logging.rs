use tracing_subscriber::EnvFilter;

/// Installs the global subscriber for a connector binary.
///
/// Output goes to stderr: stdout carries the host transport. The filter comes
/// from `RUST_LOG` and defaults to `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
