use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_RECORDS_BASE_URL: &str =
    "https://m2fa6mzwo4.execute-api.ca-central-1.amazonaws.com/multi_tenant";
const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com";
const DEFAULT_USER_AGENT: &str = "tenantdesk/0.1 (vendor-admin)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a usable
/// development config. The maps key stays `None` unless set.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("TENANTDESK_ENV", "development"))?;
    let log_level = or_default("TENANTDESK_LOG_LEVEL", "info");

    let records_base_url = or_default("TENANTDESK_RECORDS_BASE_URL", DEFAULT_RECORDS_BASE_URL);
    if !records_base_url.starts_with("http://") && !records_base_url.starts_with("https://") {
        return Err(ConfigError::InvalidEnvVar {
            var: "TENANTDESK_RECORDS_BASE_URL".to_string(),
            reason: "must be an http(s) URL".to_string(),
        });
    }

    let maps_api_key = lookup("TENANTDESK_MAPS_API_KEY")
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty());
    let maps_base_url = or_default("TENANTDESK_MAPS_BASE_URL", DEFAULT_MAPS_BASE_URL);

    let request_timeout_secs = parse_u64("TENANTDESK_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TENANTDESK_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("TENANTDESK_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("TENANTDESK_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("TENANTDESK_RETRY_BACKOFF_BASE_MS", "500")?;
    let reconcile_delay_ms = parse_u64("TENANTDESK_RECONCILE_DELAY_MS", "1000")?;
    let container_max_attempts = parse_u32("TENANTDESK_CONTAINER_MAX_ATTEMPTS", "10")?;
    let container_interval_ms = parse_u64("TENANTDESK_CONTAINER_INTERVAL_MS", "200")?;

    Ok(AppConfig {
        env,
        log_level,
        records_base_url,
        maps_api_key,
        maps_base_url,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        reconcile_delay_ms,
        container_max_attempts,
        container_interval_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TENANTDESK_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
