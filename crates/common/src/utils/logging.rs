use std::io;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,tower_http=info,axum=info";

/// Log output shape, selected by `logging.format` in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// `"json"` selects JSON lines, anything else the compact human format.
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

fn env_filter() -> EnvFilter {
    // RUST_LOG 优先，例如 RUST_LOG=info,service::inventory=debug 查看分配细节
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber writing to stdout.
/// Calling it twice is harmless: the second install is ignored.
pub fn init_logging(format: &str) {
    let builder = fmt().with_env_filter(env_filter()).with_target(false).with_writer(io::stdout);
    let _ = match LogFormat::parse(format) {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Compact);
    }

    #[test]
    fn init_twice_is_noop() {
        init_logging("compact");
        init_logging("json");
    }
}
