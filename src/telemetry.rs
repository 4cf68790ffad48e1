use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

use crate::config::LogFormat;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the default `info` level.
pub fn init(format: LogFormat) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(false);
            let subscriber = Registry::default().with(env_filter).with(fmt_layer);
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer().json().with_current_span(true);
            let subscriber = Registry::default().with(env_filter).with(fmt_layer);
            tracing::subscriber::set_global_default(subscriber)
        }
    }
}
