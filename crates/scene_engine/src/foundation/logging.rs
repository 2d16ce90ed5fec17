//! Logging setup shared by the engine and its applications

pub use log::{debug, error, info, trace, warn, LevelFilter};

/// Initialize logging from `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    init_with_level(LevelFilter::Info);
}

/// Initialize logging with an explicit default level. `RUST_LOG` still wins.
pub fn init_with_level(level: LevelFilter) {
    let result = env_logger::Builder::from_default_env()
        .filter_level(level)
        .parse_default_env()
        .try_init();
    if result.is_err() {
        log::debug!("Logger already initialized");
    }
}
