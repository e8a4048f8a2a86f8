use crate::settings::{TracingFormat, TracingSettings};
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, prelude::*, Layer};

pub fn init_logs(settings: &TracingSettings) -> Result<(), anyhow::Error> {
    // If tracing is disabled, there is nothing to initialize
    if !settings.enabled {
        return Ok(());
    }

    let filter = || {
        tracing_subscriber::EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy()
    };
    let stdout: Box<dyn Layer<_> + Sync + Send + 'static> = match settings.format {
        TracingFormat::Default => tracing_subscriber::fmt::layer()
            .with_filter(filter())
            .boxed(),
        TracingFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_filter(filter())
            .boxed(),
    };

    tracing_subscriber::registry()
        // output logs (tracing) to stdout with log level taken from env (default is INFO)
        .with(stdout)
        .try_init()?;

    Ok(())
}
