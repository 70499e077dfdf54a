use quire_client::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quire=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    quire_client::run_shell(config).await
}
