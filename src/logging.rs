use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber. `RUST_LOG` takes precedence over `filter`.
/// Calling it again after a subscriber is set has no effect.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
