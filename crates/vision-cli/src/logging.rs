use std::io::Write;

/// Filter directives: an explicit level (flag or `RUST_LOG`) wins over `--debug`.
pub fn log_filter(debug: bool, log_level: Option<&str>) -> String {
    match log_level.map(str::trim).filter(|level| !level.is_empty()) {
        Some(level) => level.to_string(),
        None if debug => "debug".to_string(),
        None => "info".to_string(),
    }
}

/// Log to stderr so streamed answers on stdout stay clean.
pub fn init_logging(debug: bool, log_level: Option<&str>) {
    env_logger::Builder::new()
        .parse_filters(&log_filter(debug, log_level))
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
