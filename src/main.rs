use hangman_server::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化全局配置
    Config::init()?;
    let config = Config::get();

    // 初始化日志
    tracing_subscriber::registry()
        .with(EnvFilter::new(config.log_filter()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("配置加载成功: {:?}", config);

    let server = HangmanServer::from_config(config).await?;
    server
        .start_http_server(config.http_addr()?, &config.cors)
        .await?;

    Ok(())
}
