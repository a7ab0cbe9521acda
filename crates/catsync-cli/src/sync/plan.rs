//! What a series sync intends to write, derived from the rows alone.

use catsync_core::{
    metadata_entries, price_from_cost, series_handle, series_title, AppConfig, CostPrice,
    SeriesGroup,
};
use catsync_shopify::MetafieldEntry;

/// One source row as a variant to create or update.
#[derive(Debug, Clone)]
pub(crate) struct VariantPlan {
    /// Trimmed item code; empty rows are skipped by the engine.
    pub sku: String,
    pub pricing: CostPrice,
    pub metafields: Vec<MetafieldEntry>,
}

#[derive(Debug, Clone)]
pub(crate) struct SeriesPlan {
    pub key: String,
    pub handle: String,
    pub title: String,
    pub variants: Vec<VariantPlan>,
}

pub(crate) fn plan_series(group: &SeriesGroup, config: &AppConfig) -> SeriesPlan {
    let columns = &config.columns;
    let variants = group
        .rows
        .iter()
        .map(|row| VariantPlan {
            sku: row.value(&columns.item_code).trim().to_owned(),
            pricing: price_from_cost(row.value(&columns.cost), config.min_price),
            metafields: metadata_entries(row, columns)
                .into_iter()
                .map(|(key, value)| MetafieldEntry { key, value })
                .collect(),
        })
        .collect();

    SeriesPlan {
        key: group.key.clone(),
        handle: series_handle(&group.key),
        title: series_title(group, columns),
        variants,
    }
}

#[cfg(test)]
mod tests {
    use catsync_core::Row;

    use super::*;
    use crate::sync::test_support::test_config;

    fn row(fields: &[(&str, &str)]) -> Row {
        fields.iter().copied().collect()
    }

    #[test]
    fn plans_each_row_with_price_and_metafields() {
        let config = test_config();
        let group = SeriesGroup {
            key: "8L.1001".to_owned(),
            rows: vec![row(&[
                ("Product Series Code", "8L.1001"),
                ("Product Code", " 8L.1001-300X3.2Z72 "),
                ("Product Name", "PCD Saw Blade"),
                ("Euros", "1,250.00"),
                ("Material", "PCD"),
                ("Z (Teeth)", "72"),
            ])],
        };

        let plan = plan_series(&group, &config);

        assert_eq!(plan.handle, "series-8l-1001");
        assert_eq!(plan.title, "PCD Saw Blade");
        assert_eq!(plan.variants.len(), 1);

        let variant = &plan.variants[0];
        assert_eq!(variant.sku, "8L.1001-300X3.2Z72");
        assert_eq!(variant.pricing.price, "1250.00");
        assert_eq!(
            variant.metafields,
            vec![
                MetafieldEntry {
                    key: "material".to_owned(),
                    value: "PCD".to_owned()
                },
                MetafieldEntry {
                    key: "z_teeth".to_owned(),
                    value: "72".to_owned()
                },
            ]
        );
    }

    #[test]
    fn blank_item_code_plans_empty_sku() {
        let config = test_config();
        let group = SeriesGroup {
            key: "AB".to_owned(),
            rows: vec![row(&[("Product Series Code", "AB"), ("Euros", "abc")])],
        };

        let plan = plan_series(&group, &config);

        assert_eq!(plan.title, "Series AB");
        assert!(plan.variants[0].sku.is_empty());
        assert_eq!(plan.variants[0].pricing.price, "0.01");
    }
}
