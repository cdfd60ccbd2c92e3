use mock_server::ServerConfig;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let listener = TcpListener::bind(config.addr()).await?;
    mock_server::run(listener).await
}
