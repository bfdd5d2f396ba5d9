//! Binary entrypoint for the MedGuard API server.
use medguard_api::run;
use medguard_core::Settings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;

    // RUST_LOG has already been folded into log_filter
    let filter = EnvFilter::try_new(&settings.log_filter)?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    run(settings).await
}
