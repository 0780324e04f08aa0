use auspost_verifier::config::Config;
use log::error;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    if let Err(e) = run().await {
        error!("Error: {:?}", e);
        std::process::exit(1);
    }
}

async fn run() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let config = Config::load()?;
    auspost_verifier::serve(config).await
}
