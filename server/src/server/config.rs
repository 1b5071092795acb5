use config::{Config, ConfigError};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub connection: DbConnection,
    pub http: HttpListener,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize)]
pub struct DbConnection {
    pub url: String,
    pub credentials: DbCredentials,
}

#[derive(Debug, Deserialize)]
pub struct DbCredentials {
    pub user: String,
    pub pw: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpListener {
    pub listen: SocketAddress,
    pub tls_key: String,
    pub tls_cert: String,
}

#[derive(Debug, Deserialize)]
pub struct SocketAddress {
    pub domain: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JwtConfig {
    pub public_key: String,
    pub issuer: String,
}

pub fn load_config() -> Result<ServerConfig, ConfigError> {
    let path = Path::new("config").join("config.toml");

    let mut config = Config::default();
    config
        // Add in `./config/config.toml`
        .merge(config::File::from(path))?
        // Add in settings from the environment (with a prefix of APP)
        // Eg.. `APP_CONNECTION_URL=... ./target/academic-server` would set the connection url
        .merge(config::Environment::with_prefix("APP").separator("_"))?;

    config.try_into()
}
