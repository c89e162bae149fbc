use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::leave::BalancePolicy;

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Upstream HRM backend
    pub upstream_base_url: String,
    pub upstream_api_key: Option<String>,
    pub upstream_timeout_secs: u64,

    pub balance_policy: BalancePolicy,

    // Open editing sessions
    pub form_idle_ttl_secs: u64,
    pub max_open_forms: u64,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn or_default<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{key} has an invalid value {raw:?}: {e}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            rate_protected_per_min: or_default("RATE_PROTECTED_PER_MIN", "1000")?,

            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
            upstream_api_key: env::var("UPSTREAM_API_KEY").ok().filter(|k| !k.is_empty()),
            upstream_timeout_secs: or_default("UPSTREAM_TIMEOUT_SECS", "30")?, // same as the web client

            balance_policy: or_default("INSUFFICIENT_BALANCE_POLICY", "block")?,

            form_idle_ttl_secs: or_default("FORM_IDLE_TTL_SECS", "1800")?, // 30 min
            max_open_forms: or_default("MAX_OPEN_FORMS", "10000")?,
        })
    }
}
