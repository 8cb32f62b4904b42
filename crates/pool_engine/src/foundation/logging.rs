//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system with a fallback level
///
/// `RUST_LOG` still takes precedence when set. Unknown level names fall back
/// to `info`. Calling this more than once is harmless; later calls are ignored.
pub fn init_with_level(level: &str) {
    let filter = parse_level(level);
    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .try_init();
}

/// Parse a level name such as `"debug"` into a filter
pub fn parse_level(level: &str) -> log::LevelFilter {
    level.parse().unwrap_or(log::LevelFilter::Info)
}
