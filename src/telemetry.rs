//! Telemetry initialization: tracing subscriber with env-driven filtering.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies to this crate
/// with quieter defaults for the HTTP and query layers.
pub fn init_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "itinera_backend={default_level},tower_http=info,sqlx::query=warn"
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
