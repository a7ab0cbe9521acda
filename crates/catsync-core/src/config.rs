use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::app_config::{AppConfig, KeyCollisionPolicy, SourceColumns};
use crate::ConfigError;

/// Values shipped in the sample `.env`; treated as "not configured".
const PLACEHOLDER_SHOP: &str = "your-shop-name";
const PLACEHOLDER_TOKEN: &str = "your-access-token";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing, still hold their
/// placeholder values, or are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str, placeholder: &str| -> Result<String, ConfigError> {
        let value = lookup(var)
            .map(|v| v.trim().to_owned())
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))?;
        if value == placeholder {
            return Err(ConfigError::PlaceholderValue {
                var: var.to_string(),
                value,
            });
        }
        Ok(value)
    };

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

    let shop = require("SHOPIFY_SHOP", PLACEHOLDER_SHOP)?;
    let access_token = require("SHOPIFY_TOKEN", PLACEHOLDER_TOKEN)?;
    let api_version = or_default("SHOPIFY_API_VERSION", "2024-10");
    let admin_base_url = lookup("SHOPIFY_ADMIN_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());

    let csv_path = PathBuf::from(or_default(
        "CSV_PATH",
        "Product Master Sheet - First Three Series.csv",
    ));

    let defaults = SourceColumns::default();
    let columns = SourceColumns {
        item_code: or_default("ITEM_CODE_COLUMN", &defaults.item_code),
        series: or_default("SERIES_COLUMN", &defaults.series),
        product_name: or_default("PRODUCT_NAME_COLUMN", &defaults.product_name),
        cost: or_default("COST_COLUMN", &defaults.cost),
    };

    let option_name = or_default("OPTION_NAME", "Code");
    let namespace = or_default("NAMESPACE", "procut");
    let min_price = parse_min_price(&or_default("CATSYNC_MIN_PRICE", "0.01"))?;
    let key_collision = parse_key_collision(&or_default("CATSYNC_KEY_COLLISION", "last-write-wins"))?;
    let log_level = or_default("CATSYNC_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("CATSYNC_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("CATSYNC_MAX_RETRIES", "1")?;
    let retry_backoff_base_ms = parse_u64("CATSYNC_RETRY_BACKOFF_BASE_MS", "2000")?;
    let min_request_interval_ms = parse_u64("CATSYNC_MIN_REQUEST_INTERVAL_MS", "250")?;

    Ok(AppConfig {
        shop,
        access_token,
        api_version,
        admin_base_url,
        csv_path,
        columns,
        option_name,
        namespace,
        min_price,
        key_collision,
        log_level,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        min_request_interval_ms,
    })
}

/// The price floor must itself be a valid, positive price.
fn parse_min_price(raw: &str) -> Result<Decimal, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "CATSYNC_MIN_PRICE".to_string(),
        reason,
    };
    let value = Decimal::from_str(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if value <= Decimal::ZERO {
        return Err(invalid(format!("must be greater than zero, got {value}")));
    }
    Ok(value)
}

fn parse_key_collision(raw: &str) -> Result<KeyCollisionPolicy, ConfigError> {
    match raw.trim() {
        "last-write-wins" => Ok(KeyCollisionPolicy::LastWriteWins),
        "reject" => Ok(KeyCollisionPolicy::Reject),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CATSYNC_KEY_COLLISION".to_string(),
            reason: format!("expected \"last-write-wins\" or \"reject\", got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
