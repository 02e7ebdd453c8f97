use anyhow::Result;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::net::SocketAddr;

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// 令牌存储，未配置时使用进程内存储
    pub redis: Option<RedisConfig>,
    pub log: LogConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CorsConfig {
    pub allow_all_origins: Option<bool>,
    pub allowed_origins: Option<Vec<String>>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config"))
            .add_source(config::Environment::with_prefix("HANGMAN").separator("__"))
            .build()?;

        Ok(config.try_deserialize::<Config>()?)
    }

    /// 从TOML字符串加载配置
    pub fn from_toml(toml: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize::<Config>()?)
    }

    /// 初始化全局配置
    pub fn init() -> Result<()> {
        let config = Self::load()?;
        CONFIG
            .set(config)
            .map_err(|_| anyhow::anyhow!("配置已经初始化"))?;
        Ok(())
    }

    /// 获取全局配置实例
    pub fn get() -> &'static Config {
        CONFIG
            .get()
            .expect("配置未初始化，请先调用 Config::init()")
    }

    pub fn http_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("无效的服务器地址 {}: {}", addr, e))
    }

    pub fn log_filter(&self) -> String {
        format!("hangman_server={}", self.log.level)
    }
}
