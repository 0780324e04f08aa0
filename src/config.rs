use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use color_eyre::eyre::{eyre, WrapErr};
use log::{info, warn};

const DEFAULT_ELASTIC_INDEX: &str = "address-verifier-activity";

pub struct Config {
    pub port: u16,
    pub allowed_origin: String,
    pub aus_post_base_url: String,
    pub aus_post_token: String,
    pub elastic_node: String,
    pub elastic_index: String,
    pub elastic_api_key: String,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn load() -> color_eyre::Result<Self> {
        Ok(
            Self {
                port: try_load("PORT", "3000")?,
                allowed_origin: try_load("CORS_ALLOW_ORIGIN", "*")?,
                aus_post_base_url: required("AUS_POST_BASE_URL")?,
                aus_post_token: read_secret("AUS_POST_TOKEN")?,
                elastic_node: required("ELASTIC_NODE")?,
                elastic_index: try_load("ELASTIC_INDEX", DEFAULT_ELASTIC_INDEX)?,
                elastic_api_key: read_secret("ELASTIC_API_KEY")?,
                upstream_timeout: Duration::from_secs(try_load("UPSTREAM_TIMEOUT_SECS", "10")?),
            }
        )
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> color_eyre::Result<T>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| eyre!("invalid {key} value: {e}"))
}

fn required(key: &str) -> color_eyre::Result<String> {
    var(key).ok_or_else(|| eyre!("`{key}` environment variable must be set"))
}

/// secrets come from the environment, else from a mounted `/run/secrets/<NAME>` file
fn read_secret(secret_name: &str) -> color_eyre::Result<String> {
    if let Some(value) = var(secret_name) {
        return Ok(value.trim().to_string());
    }
    warn!("{secret_name} not in environment, reading secret file");

    let path = format!("/run/secrets/{secret_name}");
    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .wrap_err_with(|| format!("`{secret_name}` must be set in the environment or at {path}"))
}
