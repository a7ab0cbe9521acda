pub mod app_config;
pub mod config;
pub mod definitions;
pub mod error;
pub mod fields;
pub mod pricing;
pub mod rows;
pub mod series;

pub use app_config::{AppConfig, KeyCollisionPolicy, SourceColumns};
pub use config::{load_app_config, load_app_config_from_env};
pub use definitions::{MetafieldDefinitionSpec, SINGLE_LINE_TEXT, VARIANT_METAFIELD_DEFINITIONS};
pub use error::{ConfigError, SourceError};
pub use fields::{find_key_collisions, metadata_entries, normalize_field_key, KeyCollision};
pub use pricing::{floor_price, price_from_cost, CostPrice};
pub use rows::{load_source_table, read_source_table, Row, SourceTable};
pub use series::{group_by_series, series_handle, series_key, series_title, SeriesGroup};
