use lit_af_server::config::ServerConfig;
use lit_af_server::error::ServerError;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    info!(endpoint = %config.endpoint, "启动服务器");

    lit_af_server::run(config).await
}
