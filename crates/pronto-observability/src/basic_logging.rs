use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are shown at `LOG_LEVEL`.
const OWN_CRATES: [&str; 5] = [
    "pronto_cli",
    "pronto_ops",
    "pronto_db",
    "pronto_config",
    "pronto_core",
];

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_filter(log_level: &str) -> String {
    let mut directives: Vec<String> = OWN_CRATES
        .iter()
        .map(|krate| format!("{}={}", krate, log_level))
        .collect();
    directives.push("sqlx=warn".to_string());
    directives.join(",")
}

/// Initialize console logging on stderr.
///
/// - **Log Level**: `LOG_LEVEL` environment variable (default: "info")
/// - **Filtering**: `RUST_LOG` overrides everything; `sqlx` is held at warn
/// - **Format**: compact, with targets, ANSI colors only when stderr is a terminal
///
/// Calling it twice is harmless; the second call leaves the first subscriber in place.
pub fn init_console_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&log_level)));

    let console_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
