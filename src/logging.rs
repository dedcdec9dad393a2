use tracing_subscriber::EnvFilter;

/// All workspace crate targets that should receive log output.
const CRATE_TARGETS: &[&str] = &[
    "otb_engine",
    "otb_plan",
    "otb_math",
    "demand_forecast",
    "markdown_engine",
    "replenishment",
];

/// Initialize tracing based on CLI verbosity level.
///
/// Mapping:
/// - 0 (none) -> warn
/// - 1 (-v)   -> info
/// - 2 (-vv)  -> debug
/// - 3+ (-vvv)-> trace
///
/// `RUST_LOG` env var overrides the CLI flag if set. Calling this again after
/// a subscriber is installed has no effect.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn default_filter(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_every_crate() {
        let filter = default_filter(2);
        for target in CRATE_TARGETS {
            assert!(filter.contains(&format!("{target}=debug")));
        }
        assert!(default_filter(7).starts_with("otb_engine=trace"));
    }
}
