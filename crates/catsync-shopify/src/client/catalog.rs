//! [`CatalogApi`] over the admin REST endpoints, plus GraphQL for metafields.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::queries;
use super::AdminClient;
use crate::api::CatalogApi;
use crate::error::AdminError;
use crate::gid::variant_gid;
use crate::types::{
    DefinitionInput, DefinitionOutcome, MetafieldEntry, MetafieldsSetOutcome, NewProduct,
    NewVariant, Product, ProductEnvelope, ProductsEnvelope, UserError, Variant, VariantEnvelope,
    VariantsEnvelope,
};

/// `metafieldsSet` accepts at most this many inputs per call.
const METAFIELDS_PER_CALL: usize = 25;

fn decode<T: DeserializeOwned>(value: Value, context: &str) -> Result<T, AdminError> {
    serde_json::from_value(value).map_err(|e| AdminError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

fn user_errors(payload: &Value) -> Result<Vec<UserError>, AdminError> {
    match payload.get("userErrors") {
        Some(errors) if !errors.is_null() => decode(errors.clone(), "userErrors"),
        _ => Ok(Vec::new()),
    }
}

#[async_trait]
impl CatalogApi for AdminClient {
    async fn find_product_by_handle(&self, handle: &str) -> Result<Option<Product>, AdminError> {
        let body = self
            .rest_with_query(
                Method::GET,
                "products.json",
                &[("handle", handle), ("limit", "1")],
                None,
            )
            .await?;
        let envelope: ProductsEnvelope = decode(body, "products.json")?;

        // The handle filter is exact, but guard against stores that ignore it.
        let Some(mut product) = envelope
            .products
            .into_iter()
            .find(|p| p.handle.is_empty() || p.handle == handle)
        else {
            return Ok(None);
        };

        product.variants = self.list_variants(product.id).await?;
        Ok(Some(product))
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, AdminError> {
        let body = json!({
            "product": {
                "title": product.title,
                "handle": product.handle,
                "status": "active",
                "product_type": "",
                "vendor": "",
                "options": [{
                    "name": product.option_name,
                    "values": [product.option_placeholder],
                }],
            }
        });
        let response = self.rest(Method::POST, "products.json", Some(&body)).await?;
        let envelope: ProductEnvelope = decode(response, "create product")?;
        envelope.product.ok_or_else(|| AdminError::MissingData {
            context: format!("create product {}", product.handle),
        })
    }

    async fn list_variants(&self, product_id: i64) -> Result<Vec<Variant>, AdminError> {
        let path = format!("products/{product_id}/variants.json");
        let body = self.rest(Method::GET, &path, None).await?;
        let envelope: VariantsEnvelope = decode(body, &path)?;
        Ok(envelope.variants)
    }

    async fn delete_variant(&self, variant_id: i64) -> Result<(), AdminError> {
        self.rest(Method::DELETE, &format!("variants/{variant_id}.json"), None)
            .await?;
        Ok(())
    }

    async fn reset_product_options(
        &self,
        product_id: i64,
        option_name: &str,
        placeholder: &str,
    ) -> Result<(), AdminError> {
        let body = json!({
            "product": {
                "options": [{
                    "name": option_name,
                    "values": [placeholder],
                }]
            }
        });
        self.rest(
            Method::PUT,
            &format!("products/{product_id}.json"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    async fn create_variant(
        &self,
        product_id: i64,
        variant: &NewVariant,
    ) -> Result<Variant, AdminError> {
        let body = json!({
            "variant": {
                "sku": variant.sku,
                "price": variant.price,
                "inventory_management": "shopify",
                "inventory_policy": "deny",
                "inventory_quantity": 0,
                "option1": variant.sku,
            }
        });
        let path = format!("products/{product_id}/variants.json");
        let response = self.rest(Method::POST, &path, Some(&body)).await?;
        let envelope: VariantEnvelope = decode(response, &path)?;
        envelope.variant.ok_or_else(|| AdminError::MissingData {
            context: format!("create variant {}", variant.sku),
        })
    }

    async fn update_variant_price(
        &self,
        variant_id: i64,
        price: &str,
    ) -> Result<Variant, AdminError> {
        let body = json!({ "variant": { "price": price } });
        let path = format!("variants/{variant_id}.json");
        let response = self.rest(Method::PUT, &path, Some(&body)).await?;
        let envelope: VariantEnvelope = decode(response, &path)?;
        envelope.variant.ok_or_else(|| AdminError::MissingData {
            context: format!("update variant {variant_id}"),
        })
    }

    async fn update_inventory_cost(
        &self,
        inventory_item_id: i64,
        cost: &str,
    ) -> Result<(), AdminError> {
        let body = json!({ "inventory_item": { "cost": cost } });
        self.rest(
            Method::PUT,
            &format!("inventory_items/{inventory_item_id}.json"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    async fn set_variant_metafields(
        &self,
        variant_id: i64,
        namespace: &str,
        entries: &[MetafieldEntry],
    ) -> Result<MetafieldsSetOutcome, AdminError> {
        let owner_id = variant_gid(variant_id);
        let inputs: Vec<Value> = entries
            .iter()
            .filter(|e| !e.value.trim().is_empty())
            .map(|e| {
                json!({
                    "ownerId": owner_id,
                    "namespace": namespace,
                    "key": e.key.to_lowercase(),
                    "value": e.value.trim(),
                    "type": catsync_core::SINGLE_LINE_TEXT,
                })
            })
            .collect();

        let mut outcome = MetafieldsSetOutcome::default();
        let mut first_failure = None;
        let mut sent_chunks = 0usize;
        for (index, chunk) in inputs.chunks(METAFIELDS_PER_CALL).enumerate() {
            match self.set_metafields_chunk(chunk).await {
                Ok(partial) => {
                    sent_chunks += 1;
                    outcome.written.extend(partial.written);
                    outcome.user_errors.extend(partial.user_errors);
                }
                Err(e) => {
                    let start = index * METAFIELDS_PER_CALL;
                    tracing::warn!(variant_id, start, error = %e, "metafieldsSet batch failed");
                    outcome.user_errors.push(UserError {
                        field: None,
                        message: format!(
                            "entries {start}..{} not written: {e}",
                            start + chunk.len()
                        ),
                    });
                    first_failure.get_or_insert(e);
                }
            }
        }

        // Nothing was stored: report the call itself as failed.
        match first_failure {
            Some(e) if sent_chunks == 0 => Err(e),
            _ => Ok(outcome),
        }
    }

    async fn create_metafield_definition(
        &self,
        definition: &DefinitionInput,
    ) -> Result<DefinitionOutcome, AdminError> {
        let variables = json!({
            "definition": {
                "name": definition.name,
                "namespace": definition.namespace,
                "key": definition.key,
                "description": definition.description,
                "type": definition.value_type,
                "ownerType": "PRODUCTVARIANT",
            }
        });
        let data = self
            .graphql_create(queries::METAFIELD_DEFINITION_CREATE, Some(variables))
            .await?;
        let payload = &data["metafieldDefinitionCreate"];

        let errors = user_errors(payload)?;
        if !errors.is_empty() {
            if errors.iter().any(|e| e.message.contains("already exists")) {
                return Ok(DefinitionOutcome::AlreadyExists);
            }
            return Ok(DefinitionOutcome::Rejected(errors));
        }

        let created = &payload["createdDefinition"];
        match (created["namespace"].as_str(), created["key"].as_str()) {
            (Some(namespace), Some(key)) => Ok(DefinitionOutcome::Created {
                namespace: namespace.to_owned(),
                key: key.to_owned(),
            }),
            _ => Err(AdminError::MissingData {
                context: format!("metafieldDefinitionCreate {}", definition.key),
            }),
        }
    }
}

impl AdminClient {
    async fn set_metafields_chunk(
        &self,
        chunk: &[Value],
    ) -> Result<MetafieldsSetOutcome, AdminError> {
        let data = self
            .graphql(queries::METAFIELDS_SET, Some(json!({ "metafields": chunk })))
            .await?;
        let payload = &data["metafieldsSet"];
        let mut outcome = MetafieldsSetOutcome {
            user_errors: user_errors(payload)?,
            ..MetafieldsSetOutcome::default()
        };
        if let Some(written) = payload.get("metafields").filter(|v| !v.is_null()) {
            outcome.written = decode(written.clone(), "metafieldsSet")?;
        }
        Ok(outcome)
    }
}
