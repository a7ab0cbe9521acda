//! Registers the fixed variant metafield definitions.

use catsync_core::{AppConfig, VARIANT_METAFIELD_DEFINITIONS};
use catsync_shopify::{CatalogApi, DefinitionInput, DefinitionOutcome};

/// How a registration pass went, one count per definition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DefinitionTotals {
    pub created: usize,
    pub existing: usize,
    pub failed: usize,
}

/// Creates every definition in the catalog under the configured namespace.
/// Definitions that already exist are fine; failures are logged and the
/// next definition is tried.
pub(crate) async fn register_definitions<C: CatalogApi + ?Sized>(
    api: &C,
    config: &AppConfig,
) -> DefinitionTotals {
    println!("Creating metafield definitions...");
    let mut totals = DefinitionTotals::default();

    for def in VARIANT_METAFIELD_DEFINITIONS {
        let input = DefinitionInput {
            name: def.name.to_owned(),
            namespace: config.namespace.clone(),
            key: def.key.to_owned(),
            description: def.description.to_owned(),
            value_type: def.value_type.to_owned(),
        };

        match api.create_metafield_definition(&input).await {
            Ok(DefinitionOutcome::Created { namespace, key }) => {
                println!("  Created definition: {} ({namespace}.{key})", def.name);
                totals.created += 1;
            }
            Ok(DefinitionOutcome::AlreadyExists) => {
                println!("  {} definition already exists", def.name);
                totals.existing += 1;
            }
            Ok(DefinitionOutcome::Rejected(errors)) => {
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                tracing::error!(
                    key = def.key,
                    errors = %messages.join("; "),
                    "metafield definition rejected"
                );
                totals.failed += 1;
            }
            Err(e) => {
                tracing::error!(key = def.key, error = %e, "failed to create metafield definition");
                totals.failed += 1;
            }
        }
    }

    println!("Metafield definitions setup complete!");
    totals
}
