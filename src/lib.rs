pub mod client; // REST client for the four backend services
pub mod config;
pub mod format; // Dates, badges, tones
pub mod i18n;
pub mod mock; // In-memory backend for tests and demos
pub mod models;
pub mod portal; // Guard, fetch/submit cycle, notices
pub mod routes;
pub mod session;
pub mod views;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the built-in filter.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter(verbose)));
    // A second install (tests, embedding) is not an error worth surfacing.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    tracing::debug!("{} v{}", config::APP_NAME, config::APP_VERSION);
}
