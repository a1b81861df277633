//! Logger initialization for binaries and tests.

use log::SetLoggerError;

/// Initialize the process-wide logger.
///
/// Respects `RUST_LOG`; defaults to `info` when unset. Safe to call more
/// than once; subsequent calls return an error that callers may ignore.
pub fn init() -> Result<(), SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init()
}
