//! terminal logging for the printing entry points
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

/// "debug", "info", "warn", "error", or "off"/"none" to disable; None for anything else
pub fn level_filter(loglevel: &str) -> Option<LevelFilter> {
    match loglevel {
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" | "none" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// Installs a terminal logger at the given level. Returns false when logging
/// is disabled, the level is unknown or a logger is already installed.
pub fn init_term_logger(loglevel: &str) -> bool {
    match level_filter(loglevel) {
        None | Some(LevelFilter::Off) => false,
        Some(level) => CombinedLogger::init(vec![TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )])
        .is_ok(),
    }
}
