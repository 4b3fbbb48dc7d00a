//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Default filter for a verbosity count (`-v`, `-vv`).
pub fn derive_default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `verbosity`.
///
/// Calling it twice is harmless; the second install is ignored.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(derive_default_filter(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_default_filter() {
        assert_eq!(derive_default_filter(0), "info");
        assert_eq!(derive_default_filter(1), "debug");
        assert_eq!(derive_default_filter(5), "trace");
    }
}
