use std::path::PathBuf;

use rust_decimal::Decimal;

/// What to do when two metadata columns normalize to the same metafield key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCollisionPolicy {
    /// Later columns silently overwrite earlier ones.
    LastWriteWins,
    /// Refuse to start when the header row contains a collision.
    Reject,
}

impl std::fmt::Display for KeyCollisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyCollisionPolicy::LastWriteWins => write!(f, "last-write-wins"),
            KeyCollisionPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Names of the source-table columns with a fixed role. Every other column
/// is a metafield candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumns {
    pub item_code: String,
    pub series: String,
    pub product_name: String,
    pub cost: String,
}

impl SourceColumns {
    /// Returns `true` if `column` is consumed by the sync itself and must not
    /// become a metafield.
    #[must_use]
    pub fn is_reserved(&self, column: &str) -> bool {
        column == self.item_code
            || column == self.series
            || column == self.product_name
            || column == self.cost
    }
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            item_code: "Product Code".to_owned(),
            series: "Product Series Code".to_owned(),
            product_name: "Product Name".to_owned(),
            cost: "Euros".to_owned(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub shop: String,
    pub access_token: String,
    pub api_version: String,
    pub admin_base_url: Option<String>,
    pub csv_path: PathBuf,
    pub columns: SourceColumns,
    pub option_name: String,
    pub namespace: String,
    pub min_price: Decimal,
    pub key_collision: KeyCollisionPolicy,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub min_request_interval_ms: u64,
}

impl AppConfig {
    /// Base URL of the shop's admin host, honouring `SHOPIFY_ADMIN_BASE_URL`.
    #[must_use]
    pub fn admin_base_url(&self) -> String {
        self.admin_base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.myshopify.com", self.shop))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("shop", &self.shop)
            .field("access_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .field("admin_base_url", &self.admin_base_url)
            .field("csv_path", &self.csv_path)
            .field("columns", &self.columns)
            .field("option_name", &self.option_name)
            .field("namespace", &self.namespace)
            .field("min_price", &self.min_price)
            .field("key_collision", &self.key_collision)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("min_request_interval_ms", &self.min_request_interval_ms)
            .finish()
    }
}
