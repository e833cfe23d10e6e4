use simplelog::*;

/// Maps a configuration string to a level filter. "off" and "none" disable logging.
pub fn parse_log_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "off" | "none" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Installs a terminal logger at `level`. Returns false if a logger was already installed
/// (the existing one is kept) or logging is switched off.
pub fn init_logger(level: LevelFilter) -> bool {
    if level == LevelFilter::Off {
        return false;
    }
    let logger_instance = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
    match logger_instance {
        Ok(()) => {
            log::info!("logging started with loglevel: {}", level);
            true
        }
        Err(_) => false,
    }
}
