use log::LevelFilter;

/// Initialize logging for the command-line filler.
///
/// Logs at `Info` by default or `Debug` when `debug_enabled` is set; `RUST_LOG`, if present,
/// overrides both. Safe to call more than once (later calls are ignored).
pub fn init_logger(debug_enabled: bool) {
    let level = if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    if builder.try_init().is_ok() {
        log::debug!("Logger initialized at {level:?} level");
    }
}
