use anyhow::Context;
use building_scanner::Config;
use building_scanner::server;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    let scanner = config.build_scanner()?;

    server::run(&config, scanner)
        .await
        .with_context(|| format!("failed to serve on {}:{}", config.host, config.port))
}
