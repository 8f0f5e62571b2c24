use env_logger::{Builder, Env};

/// Installs `env_logger` with an `info` default; `RUST_LOG` overrides.
///
/// Safe to call more than once: later calls are no-ops.
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
