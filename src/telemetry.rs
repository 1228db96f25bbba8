use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "authcore=debug,sqlx=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn json_logs() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
}

/// Installs the process-wide subscriber. For hosts only; library code never calls this.
pub fn init_tracing() {
    if json_logs() {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter()).init();
    }
}
