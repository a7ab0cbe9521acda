//! Drives one series to a consistent remote state.
//!
//! Failures of individual calls are logged and the row moves on. Only a
//! failure to obtain the series product aborts the series, which the caller
//! logs before continuing with the next one.

use std::collections::HashMap;

use anyhow::Context;
use catsync_core::{floor_price, AppConfig, SeriesGroup};
use catsync_shopify::{CatalogApi, NewProduct, NewVariant, Product, Variant};

use super::plan::{plan_series, SeriesPlan, VariantPlan};
use super::report;

/// Option value given to a freshly created product before any real variant exists.
const NEW_PRODUCT_OPTION_VALUE: &str = "Variant";

/// Option value an existing product is reset to before its variants are synced.
const RESET_OPTION_VALUE: &str = "Default";

/// Per-series counts, summed into the run totals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SeriesOutcome {
    pub created: usize,
    pub updated: usize,
    /// Rows without an item code.
    pub skipped: usize,
    /// Rows whose create or price update failed.
    pub failed: usize,
    pub metafields_written: usize,
}

/// Reconciles one series against the catalog. With `dry_run` the plan is
/// printed and no remote call is made.
///
/// # Errors
///
/// Returns an error when the product cannot be looked up, created, or
/// re-fetched after cleanup. Row-level failures are counted, not returned.
pub(crate) async fn reconcile_series<C: CatalogApi + ?Sized>(
    api: &C,
    config: &AppConfig,
    group: &SeriesGroup,
    dry_run: bool,
) -> anyhow::Result<SeriesOutcome> {
    let plan = plan_series(group, config);

    println!("\nProcessing series: {}", plan.key);
    println!("  Handle: {}", plan.handle);
    println!("  Title: {}", plan.title);

    if dry_run {
        report::print_dry_run(&plan);
        return Ok(SeriesOutcome::default());
    }

    let product = ensure_product(api, config, &plan).await?;

    let mut existing: HashMap<String, Variant> = product
        .variants
        .into_iter()
        .filter(|v| !v.sku().is_empty())
        .map(|v| (v.sku().to_owned(), v))
        .collect();
    println!("  Found {} existing variants", existing.len());

    let mut outcome = SeriesOutcome::default();
    for variant in &plan.variants {
        if variant.sku.is_empty() {
            tracing::warn!(series = %plan.key, "skipping row without item code");
            outcome.skipped += 1;
            continue;
        }

        let variant_id = if let Some(current) = existing.get(&variant.sku) {
            let id = current.id;
            if update_variant(api, config, current, variant).await {
                outcome.updated += 1;
            } else {
                outcome.failed += 1;
            }
            id
        } else {
            match create_variant(api, config, product.id, variant).await {
                Some(Synced::Created(created)) => {
                    outcome.created += 1;
                    let id = created.id;
                    existing.insert(variant.sku.clone(), created);
                    id
                }
                Some(Synced::Updated {
                    variant: current,
                    price_updated,
                }) => {
                    if price_updated {
                        outcome.updated += 1;
                    } else {
                        outcome.failed += 1;
                    }
                    let id = current.id;
                    existing.insert(variant.sku.clone(), current);
                    id
                }
                None => {
                    outcome.failed += 1;
                    continue;
                }
            }
        };

        outcome.metafields_written += write_metafields(api, config, variant_id, variant).await;
    }

    println!(
        "  Series {} done: {} created, {} updated, {} skipped, {} failed",
        plan.key, outcome.created, outcome.updated, outcome.skipped, outcome.failed
    );
    Ok(outcome)
}

/// Finds the series product by handle, creating it when absent. Existing
/// products are cleaned of placeholder variants and re-fetched.
async fn ensure_product<C: CatalogApi + ?Sized>(
    api: &C,
    config: &AppConfig,
    plan: &SeriesPlan,
) -> anyhow::Result<Product> {
    let found = api
        .find_product_by_handle(&plan.handle)
        .await
        .with_context(|| format!("failed to look up product {}", plan.handle))?;

    if let Some(product) = found {
        println!(
            "  Found existing product: {} (ID: {})",
            product.title, product.id
        );
        return prepare_existing(api, config, &plan.handle, product).await;
    }

    println!("  Creating product: {}", plan.title);
    let new_product = NewProduct {
        title: plan.title.clone(),
        handle: plan.handle.clone(),
        option_name: config.option_name.clone(),
        option_placeholder: NEW_PRODUCT_OPTION_VALUE.to_owned(),
    };

    match api.create_product(&new_product).await {
        Ok(product) => {
            println!("  Created product with ID: {}", product.id);
            Ok(remove_auto_variant(api, product).await)
        }
        Err(e) if e.is_conflict() => {
            tracing::warn!(
                handle = %plan.handle,
                error = %e,
                "product handle already taken, reusing the existing product"
            );
            let product = api
                .find_product_by_handle(&plan.handle)
                .await
                .with_context(|| format!("failed to look up product {}", plan.handle))?
                .with_context(|| {
                    format!("product {} reported as taken but not found", plan.handle)
                })?;
            prepare_existing(api, config, &plan.handle, product).await
        }
        Err(e) => Err(e).with_context(|| format!("failed to create product {}", plan.handle)),
    }
}

/// Deletes the blank-SKU variant the store adds to a new product. Failures
/// leave it in place with a warning.
async fn remove_auto_variant<C: CatalogApi + ?Sized>(api: &C, mut product: Product) -> Product {
    let variants = match api.list_variants(product.id).await {
        Ok(variants) => variants,
        Err(e) => {
            tracing::warn!(
                product_id = product.id,
                error = %e,
                "could not list variants of new product; default variant may remain"
            );
            product.variants.retain(|v| !v.sku().is_empty());
            return product;
        }
    };

    let mut kept = Vec::with_capacity(variants.len());
    for variant in variants {
        if !variant.sku().is_empty() {
            kept.push(variant);
            continue;
        }
        println!("    Deleting default variant: {}", variant.id);
        if let Err(e) = api.delete_variant(variant.id).await {
            tracing::warn!(variant_id = variant.id, error = %e, "could not delete default variant");
        }
    }
    product.variants = kept;
    product
}

/// Removes placeholder variants, resets the option schema, and re-fetches
/// the product so the SKU lookup sees current state.
async fn prepare_existing<C: CatalogApi + ?Sized>(
    api: &C,
    config: &AppConfig,
    handle: &str,
    product: Product,
) -> anyhow::Result<Product> {
    println!("  Cleaning up existing product...");

    for variant in product.variants.iter().filter(|v| v.is_placeholder()) {
        println!(
            "    Removing default variant: {} - {}",
            variant.id, variant.title
        );
        if let Err(e) = api.delete_variant(variant.id).await {
            tracing::warn!(variant_id = variant.id, error = %e, "could not delete default variant");
        }
    }

    match api
        .reset_product_options(product.id, &config.option_name, RESET_OPTION_VALUE)
        .await
    {
        Ok(()) => println!("    Updated product options for product {}", product.id),
        Err(e) => {
            tracing::warn!(product_id = product.id, error = %e, "could not reset product options");
        }
    }

    api.find_product_by_handle(handle)
        .await
        .with_context(|| format!("failed to re-fetch product {handle} after cleanup"))?
        .with_context(|| format!("product {handle} missing after cleanup"))
}

/// Updates price and, when the row has a cost, the inventory cost. Returns
/// whether the price update succeeded.
async fn update_variant<C: CatalogApi + ?Sized>(
    api: &C,
    config: &AppConfig,
    current: &Variant,
    variant: &VariantPlan,
) -> bool {
    let price = floor_price(&variant.pricing.price, config.min_price);
    println!("  Updating existing variant: {} (price={price})", variant.sku);

    if let Err(e) = api.update_variant_price(current.id, &price).await {
        tracing::error!(sku = %variant.sku, variant_id = current.id, error = %e, "failed to update variant");
        return false;
    }

    write_cost(api, current, variant).await;
    true
}

enum Synced {
    Created(Variant),
    /// Creation raced with another writer and the row fell back to an
    /// update. The variant exists either way, so metafields are still
    /// written when the price update failed.
    Updated {
        variant: Variant,
        price_updated: bool,
    },
}

async fn create_variant<C: CatalogApi + ?Sized>(
    api: &C,
    config: &AppConfig,
    product_id: i64,
    variant: &VariantPlan,
) -> Option<Synced> {
    let price = floor_price(&variant.pricing.price, config.min_price);
    println!("  Creating new variant: {} (price={price})", variant.sku);

    let new_variant = NewVariant {
        sku: variant.sku.clone(),
        price,
    };
    match api.create_variant(product_id, &new_variant).await {
        Ok(created) => {
            println!("    Successfully created variant with ID: {}", created.id);
            write_cost(api, &created, variant).await;
            Some(Synced::Created(created))
        }
        Err(e) if e.is_conflict() => {
            tracing::warn!(sku = %variant.sku, error = %e, "variant already exists, updating instead");
            let current = match api.list_variants(product_id).await {
                Ok(variants) => variants.into_iter().find(|v| v.sku() == variant.sku),
                Err(e) => {
                    tracing::error!(sku = %variant.sku, error = %e, "failed to re-list variants");
                    None
                }
            }?;
            let price_updated = update_variant(api, config, &current, variant).await;
            Some(Synced::Updated {
                variant: current,
                price_updated,
            })
        }
        Err(e) => {
            tracing::error!(sku = %variant.sku, error = %e, "failed to create variant");
            None
        }
    }
}

async fn write_cost<C: CatalogApi + ?Sized>(api: &C, target: &Variant, variant: &VariantPlan) {
    if !variant.pricing.has_cost() {
        return;
    }
    let Some(inventory_item_id) = target.inventory_item_id else {
        return;
    };
    let cost = variant.pricing.cost_string();
    match api.update_inventory_cost(inventory_item_id, &cost).await {
        Ok(()) => println!("    Updated inventory cost to {cost}"),
        Err(e) => tracing::warn!(
            sku = %variant.sku,
            inventory_item_id,
            error = %e,
            "could not update inventory cost"
        ),
    }
}

/// Writes the row's metafields and returns how many the store accepted.
async fn write_metafields<C: CatalogApi + ?Sized>(
    api: &C,
    config: &AppConfig,
    variant_id: i64,
    variant: &VariantPlan,
) -> usize {
    if variant.metafields.is_empty() {
        return 0;
    }
    println!(
        "    Setting {} metafields for variant {}",
        variant.metafields.len(),
        variant.sku
    );

    match api
        .set_variant_metafields(variant_id, &config.namespace, &variant.metafields)
        .await
    {
        Ok(outcome) => {
            for error in &outcome.user_errors {
                tracing::warn!(sku = %variant.sku, error = %error, "metafield rejected");
            }
            for written in &outcome.written {
                println!(
                    "      {}.{}: {}",
                    written.namespace, written.key, written.value
                );
            }
            outcome.written.len()
        }
        Err(e) => {
            tracing::error!(sku = %variant.sku, error = %e, "failed to set metafields");
            0
        }
    }
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
