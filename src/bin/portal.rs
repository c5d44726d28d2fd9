use clap::Parser;
use student_portal::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so PORTAL_* settings apply to cargo run
    let _ = dotenvy::dotenv();

    let config = student_portal::config::config();

    // stdout carries command output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Running in {:?} mode against {}", config.environment, config.backend.base_url);

    let cli = Cli::parse();

    if let Err(e) = student_portal::cli::run(cli).await {
        match std::env::var("PORTAL_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
