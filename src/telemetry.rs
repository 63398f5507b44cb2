use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber, writing to stderr and filtered by `RUST_LOG`.
///
/// Standard output stays reserved for payloads.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
