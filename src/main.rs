use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use courses::config::Config;
use courses::supervisor;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    init_tracing();

    info!("Starting course catalog Telegram bot");

    // Missing token aborts before any task starts
    let config = Config::from_env()?;

    supervisor::run(config).await
}
