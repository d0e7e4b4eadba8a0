//! Tracing setup shared by the binaries.

use tracing_subscriber::{EnvFilter, prelude::*};

const WORKSPACE_TARGETS: &[&str] = &["server", "services", "db", "utils"];

/// Builds the filter directive string for `level`, keeping third-party crates at `warn`.
pub fn filter_directives(level: &str) -> String {
    let mut directives = String::from("warn");
    for target in WORKSPACE_TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

/// Installs the global subscriber. `RUST_LOG` picks the level for workspace crates.
pub fn init_tracing() -> Result<(), tracing_subscriber::filter::ParseError> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_new(filter_directives(&log_level))?;

    // A second init (tests, embedding) is not an error worth surfacing.
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .try_init();
    Ok(())
}
