#![deny(missing_docs)]
//! Shared logging utilities for the importer workspace.
//!
//! This crate provides the `importer_*` logging macros used across the codebase,
//! the album context that prefixes every line emitted while an album is being
//! processed, and a minimal test initializer for the global logger.

use std::sync::atomic::{AtomicUsize, Ordering};

#[doc(hidden)]
pub use log;

static ALBUM_INDEX: AtomicUsize = AtomicUsize::new(0);
static ALBUM_TOTAL: AtomicUsize = AtomicUsize::new(0);

/// Sets the album currently being processed (1-based) and the batch size.
/// The batch loop calls this once per album.
pub fn set_album_context(index: usize, total: usize) {
    ALBUM_TOTAL.store(total, Ordering::Relaxed);
    ALBUM_INDEX.store(index, Ordering::Relaxed);
}

/// Clears the album context once the batch is over.
pub fn clear_album_context() {
    ALBUM_INDEX.store(0, Ordering::Relaxed);
    ALBUM_TOTAL.store(0, Ordering::Relaxed);
}

/// Retrieves the current album context as `(index, total)`.
/// Returns `None` outside of a batch.
pub fn album_context() -> Option<(usize, usize)> {
    match ALBUM_INDEX.load(Ordering::Relaxed) {
        0 => None,
        index => Some((index, ALBUM_TOTAL.load(Ordering::Relaxed))),
    }
}

/// Prefix prepended by the logging macros, e.g. `[album 2/5] `.
#[doc(hidden)]
pub fn album_prefix() -> String {
    match album_context() {
        Some((index, total)) => format!("[album {index}/{total}] "),
        None => String::new(),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! importer_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("{}{}", $crate::album_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! importer_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("{}{}", $crate::album_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! importer_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("{}{}", $crate::album_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! importer_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("{}{}", $crate::album_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! importer_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("{}{}", $crate::album_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
