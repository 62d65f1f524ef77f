use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Filter directives in this variable replace the `--log-level` default.
pub const LOG_ENV: &str = "JAUSPRIMS_LOG";

/// Crates whose events follow `--log-level`; other targets stay at warn.
const TARGETS: [&str; 4] = [
    "jausprims",
    "jausprims_types",
    "jausprims_frame",
    "jausprims_registry",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn default_directives(level: LogLevel) -> String {
    let global = match level {
        LogLevel::Error => "error",
        _ => "warn",
    };
    let mut directives = vec![global.to_string()];
    directives.extend(
        TARGETS
            .iter()
            .map(|target| format!("{target}={}", level.as_str())),
    );
    directives.join(",")
}

/// Route `tracing` events from the codec crates to stderr.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true);

    // A subscriber may already be installed when embedded in tests.
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_scope_level_to_codec_crates() {
        assert_eq!(
            default_directives(LogLevel::Debug),
            "warn,jausprims=debug,jausprims_types=debug,jausprims_frame=debug,jausprims_registry=debug"
        );
        assert!(default_directives(LogLevel::Error).starts_with("error,jausprims=error"));
    }

    #[test]
    fn directives_parse() {
        for level in [LogLevel::Error, LogLevel::Info, LogLevel::Trace] {
            EnvFilter::try_new(default_directives(level)).unwrap();
        }
    }
}
