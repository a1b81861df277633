use std::path::PathBuf;

use bookshop::config::AppConfig;
use bookshop::server::BookshopHttpServer;
use clap::Parser;
use log::info;

/// Command line options for the HTTP server binary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Port for the HTTP server; overrides the configured bind address port
    #[arg(long)]
    port: Option<u16>,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Main entry point for the bookshop HTTP server.
///
/// Loads configuration, validates the signing secret, and serves the
/// storefront and the JSON API behind the security gate.
///
/// # Command-Line Arguments
///
/// * `--port <PORT>` - Override the configured bind address port
/// * `--config <PATH>` - Path to a TOML configuration file
///
/// # Environment Variables
///
/// * `BOOKSHOP_JWT_SECRET` - HMAC signing secret (at least 32 bytes)
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    bookshop::logging::init().ok();
    info!("Starting Bookshop HTTP Server...");

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        let host = config
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| config.bind_address.clone());
        config.bind_address = format!("{}:{}", host, port);
    }
    info!("Config loaded successfully");

    let server = BookshopHttpServer::new(&config)?;
    server.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["test"]);
        assert!(cli.port.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn custom_port_and_config() {
        let cli = Cli::parse_from(["test", "--port", "8000", "--config", "bookshop.toml"]);
        assert_eq!(cli.port, Some(8000));
        assert_eq!(cli.config.unwrap().to_str().unwrap(), "bookshop.toml");
    }
}
