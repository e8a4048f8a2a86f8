use anyhow::Context;
use stainless_service::{init_logs, run, Settings};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let settings = Settings::new().context("failed to parse config")?;
    init_logs(&settings.tracing).context("failed to initialize logs")?;
    run(settings).await
}
