use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub api_base: String,
    pub secret_key: String,
    pub webhook_secret: String,
    pub success_url: String,
    pub cancel_url: String,
    pub currency: String,
    pub timeout_seconds: u64,
    /// Bounded attempts at opening a checkout session during placement.
    #[serde(default = "default_session_attempts")]
    pub session_attempts: u32,
}

fn default_session_attempts() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Flat order tax in basis points (200 = 2%).
    #[serde(default = "default_tax_basis_points")]
    pub tax_basis_points: i64,
}

fn default_tax_basis_points() -> i64 {
    200
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `VERDANT__SERVER__PORT=8080`
            .add_source(config::Environment::with_prefix("VERDANT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
