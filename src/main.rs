use std::process::ExitCode;

use pagehttpd::config::Config;
use pagehttpd::server::Server;
use tracing_subscriber::EnvFilter;

fn usage() -> ExitCode {
    eprintln!("Usage: pagehttpd <port>");
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [port] = args.as_slice() else {
        return Ok(usage());
    };
    let Ok(port) = port.parse::<u16>() else {
        eprintln!("Invalid port number: {}", port);
        return Ok(usage());
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load(port)?;
    let server = Server::bind(&cfg).await?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(ExitCode::SUCCESS)
}
