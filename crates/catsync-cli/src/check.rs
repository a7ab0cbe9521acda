//! The `check` command: prints the metafields the store holds for variants.

use catsync_core::AppConfig;
use catsync_shopify::{AdminClient, VariantMetafields};

/// Metafields fetched per variant.
const METAFIELDS_PER_VARIANT: u32 = 50;

#[derive(Debug, Clone, clap::Args)]
pub struct CheckArgs {
    /// SKU to inspect first
    #[arg(long)]
    pub sku: Option<String>,

    /// Number of variants to list
    #[arg(long, default_value_t = 5)]
    pub first: u32,

    /// Inspect only this variant (GraphQL ID or numeric ID)
    #[arg(long, conflicts_with_all = ["sku", "first"])]
    pub variant: Option<String>,
}

/// # Errors
///
/// Returns an error if any of the lookups fails.
pub(crate) async fn run_check(
    client: &AdminClient,
    config: &AppConfig,
    args: &CheckArgs,
) -> anyhow::Result<()> {
    println!("Shopify Metafield Checker");
    println!("{}", "=".repeat(40));

    if let Some(id) = args.variant.as_deref() {
        let gid = variant_gid_from_arg(id)?;
        match client
            .variant_metafields(&gid, &config.namespace, METAFIELDS_PER_VARIANT)
            .await?
        {
            Some(variant) => print_variant(&variant, true),
            None => println!("No variant found with ID {gid}"),
        }
        return Ok(());
    }

    if let Some(sku) = args.sku.as_deref() {
        println!("1. Checking specific variant metafields...");
        let found = client
            .variants_with_metafields(1, Some(sku), &config.namespace, METAFIELDS_PER_VARIANT)
            .await?;
        match found.first() {
            Some(variant) => print_variant(variant, true),
            None => println!("No variants found with that SKU"),
        }
        println!();
    }

    println!("Checking first {} variants:", args.first);
    println!("{}", "=".repeat(50));
    let variants = client
        .variants_with_metafields(args.first, None, &config.namespace, METAFIELDS_PER_VARIANT)
        .await?;
    for variant in &variants {
        print_variant(variant, false);
    }
    Ok(())
}

/// Accepts a full global ID or a bare numeric variant ID.
fn variant_gid_from_arg(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let id = catsync_shopify::gid::numeric_id(raw)
        .ok_or_else(|| anyhow::anyhow!("'{raw}' is not a variant ID"))?;
    Ok(catsync_shopify::gid::variant_gid(id))
}

fn print_variant(variant: &VariantMetafields, detailed: bool) {
    for line in variant_lines(variant, detailed) {
        println!("{line}");
    }
}

fn variant_lines(variant: &VariantMetafields, detailed: bool) -> Vec<String> {
    let sku = variant.sku.as_deref().filter(|s| !s.is_empty()).unwrap_or("No SKU");
    let mut lines = Vec::new();

    if detailed {
        lines.push(format!("Variant: {sku} (ID: {})", variant.id));
        lines.push(format!("Found {} metafields:", variant.metafields.len()));
        if variant.metafields.is_empty() {
            lines.push("  No metafields found!".to_owned());
        }
        for mf in &variant.metafields {
            let kind = mf.value_type.as_deref().unwrap_or("unknown");
            lines.push(format!("  {}.{}: {} ({kind})", mf.namespace, mf.key, mf.value));
        }
    } else {
        lines.push(format!("\nVariant: {sku}"));
        if variant.metafields.is_empty() {
            lines.push("  No metafields found".to_owned());
        } else {
            lines.push(format!("  Metafields ({}):", variant.metafields.len()));
            for mf in &variant.metafields {
                lines.push(format!("    {}: {}", mf.key, mf.value));
            }
        }
    }
    lines
}
