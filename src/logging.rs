use tracing_subscriber::EnvFilter;

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info,schedule_assistant=info",
        2 => "info,schedule_assistant=debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Logs go to stderr so answers on stdout stay
/// clean; `RUST_LOG` overrides the verbosity flag.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_filter(0), "warn");
        assert!(default_filter(2).contains("debug"));
        assert_eq!(default_filter(9), "trace");
    }
}
