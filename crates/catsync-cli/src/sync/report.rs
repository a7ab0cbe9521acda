//! Dry-run output.

use super::plan::SeriesPlan;

/// Metafields shown per variant before the rest are summarised.
const PREVIEW_METAFIELDS: usize = 3;

pub(crate) fn print_dry_run(plan: &SeriesPlan) {
    for line in dry_run_lines(plan) {
        println!("{line}");
    }
}

fn dry_run_lines(plan: &SeriesPlan) -> Vec<String> {
    let mut lines = vec![format!(
        "  [DRY] Would process {} variants",
        plan.variants.len()
    )];

    for variant in &plan.variants {
        if variant.sku.is_empty() {
            lines.push("    [DRY] Would skip a row without item code".to_owned());
            continue;
        }
        lines.push(format!(
            "    [DRY] Variant {} (cost={}, price={})",
            variant.sku,
            variant.pricing.cost_string(),
            variant.pricing.price
        ));

        if variant.metafields.is_empty() {
            continue;
        }
        lines.push(format!(
            "      [DRY] Metafields: {} fields",
            variant.metafields.len()
        ));
        for entry in variant.metafields.iter().take(PREVIEW_METAFIELDS) {
            lines.push(format!("        {}: {}", entry.key, entry.value));
        }
        if variant.metafields.len() > PREVIEW_METAFIELDS {
            lines.push(format!(
                "        ... and {} more",
                variant.metafields.len() - PREVIEW_METAFIELDS
            ));
        }
    }
    lines
}
