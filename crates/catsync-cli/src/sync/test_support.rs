//! In-memory catalog and fixtures shared by the sync tests.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use catsync_core::{AppConfig, KeyCollisionPolicy, SourceColumns};
use catsync_shopify::{
    AdminError, CatalogApi, DefinitionInput, DefinitionOutcome, Metafield, MetafieldEntry,
    MetafieldsSetOutcome, NewProduct, NewVariant, Product, UserError, Variant,
};
use rust_decimal::Decimal;

pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        shop: "demo".to_owned(),
        access_token: "shpat_test".to_owned(),
        api_version: "2024-10".to_owned(),
        admin_base_url: None,
        csv_path: PathBuf::from("products.csv"),
        columns: SourceColumns::default(),
        option_name: "Code".to_owned(),
        namespace: "procut".to_owned(),
        min_price: Decimal::new(1, 2),
        key_collision: KeyCollisionPolicy::LastWriteWins,
        log_level: "info".to_owned(),
        request_timeout_secs: 30,
        max_retries: 0,
        retry_backoff_base_ms: 0,
        min_request_interval_ms: 0,
    }
}

fn server_error(method: &str, path: &str) -> AdminError {
    AdminError::Status {
        method: method.to_owned(),
        path: path.to_owned(),
        status: 500,
        body: "boom".to_owned(),
    }
}

fn unprocessable(path: &str, body: &str) -> AdminError {
    AdminError::Status {
        method: "POST".to_owned(),
        path: path.to_owned(),
        status: 422,
        body: body.to_owned(),
    }
}

#[derive(Default)]
struct State {
    products: Vec<Product>,
    next_id: i64,
    calls: Vec<String>,
    metafields: HashMap<i64, Vec<MetafieldEntry>>,
    costs: HashMap<i64, String>,
    definitions: HashSet<String>,
    lookups: usize,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn product_mut(&mut self, product_id: i64) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == product_id)
    }

    fn new_variant(&mut self, sku: Option<&str>, title: &str, price: &str) -> Variant {
        let id = self.next_id();
        Variant {
            id,
            title: title.to_owned(),
            sku: sku.map(str::to_owned),
            price: Some(price.to_owned()),
            inventory_item_id: Some(id + 10_000),
        }
    }

    fn insert_variant(&mut self, product_id: i64, sku: &str, price: &str) -> Option<Variant> {
        let variant = self.new_variant(Some(sku), sku, price);
        let product = self.product_mut(product_id)?;
        product.variants.push(variant.clone());
        Some(variant)
    }
}

/// A [`CatalogApi`] over an in-memory product list that records every call.
///
/// Read calls are logged as `find`/`list`; everything else is a mutation.
/// Failure modes are switched on with the builder methods.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    state: Mutex<State>,
    /// SKUs whose creation "loses a race": the variant appears anyway and
    /// the call fails with a 422.
    racing_skus: HashSet<String>,
    /// Product creation "loses a race" with a concurrent writer.
    racing_product: bool,
    /// Product lookups that succeed before every later one fails.
    lookups_before_failure: Option<usize>,
    fail_price_updates: bool,
    /// SKUs whose creation fails outright with a 500.
    failing_skus: HashSet<String>,
    /// Metafield keys the store refuses with a user error.
    rejected_keys: HashSet<String>,
}

fn owned_set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

impl FakeCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn racing_skus(mut self, skus: &[&str]) -> Self {
        self.racing_skus = owned_set(skus);
        self
    }

    pub(crate) fn racing_product(mut self) -> Self {
        self.racing_product = true;
        self
    }

    /// Every product lookup fails.
    pub(crate) fn failing_lookups(self) -> Self {
        self.failing_lookups_after(0)
    }

    pub(crate) fn failing_lookups_after(mut self, successes: usize) -> Self {
        self.lookups_before_failure = Some(successes);
        self
    }

    pub(crate) fn failing_price_updates(mut self) -> Self {
        self.fail_price_updates = true;
        self
    }

    pub(crate) fn failing_creates(mut self, skus: &[&str]) -> Self {
        self.failing_skus = owned_set(skus);
        self
    }

    pub(crate) fn rejecting_metafields(mut self, keys: &[&str]) -> Self {
        self.rejected_keys = owned_set(keys);
        self
    }

    /// Seeds an existing product, as an earlier run would have left it.
    pub(crate) fn seed_product(&self, handle: &str, variants: &[(Option<&str>, &str)]) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let variants: Vec<Variant> = variants
            .iter()
            .map(|(sku, title)| state.new_variant(*sku, title, "1.00"))
            .collect();
        state.products.push(Product {
            id,
            title: "Seeded".to_owned(),
            handle: handle.to_owned(),
            variants,
        });
        id
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than lookups.
    pub(crate) fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("find ") && !c.starts_with("list "))
            .collect()
    }

    pub(crate) fn skus(&self, handle: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .products
            .iter()
            .filter(|p| p.handle == handle)
            .flat_map(|p| p.variants.iter().map(|v| v.sku().to_owned()))
            .collect()
    }

    pub(crate) fn product_count(&self) -> usize {
        self.state.lock().unwrap().products.len()
    }

    pub(crate) fn metafields_for_sku(&self, sku: &str) -> Option<Vec<MetafieldEntry>> {
        let state = self.state.lock().unwrap();
        let id = state
            .products
            .iter()
            .flat_map(|p| &p.variants)
            .find(|v| v.sku() == sku)?
            .id;
        state.metafields.get(&id).cloned()
    }

    pub(crate) fn cost_for_sku(&self, sku: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        let item = state
            .products
            .iter()
            .flat_map(|p| &p.variants)
            .find(|v| v.sku() == sku)?
            .inventory_item_id?;
        state.costs.get(&item).cloned()
    }

    fn log(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn find_product_by_handle(&self, handle: &str) -> Result<Option<Product>, AdminError> {
        self.log(format!("find {handle}"));
        let mut state = self.state.lock().unwrap();
        state.lookups += 1;
        if self
            .lookups_before_failure
            .is_some_and(|successes| state.lookups > successes)
        {
            return Err(server_error("GET", "products.json"));
        }
        Ok(state.products.iter().find(|p| p.handle == handle).cloned())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, AdminError> {
        self.log(format!("create_product {}", product.handle));
        let mut state = self.state.lock().unwrap();
        if state.products.iter().any(|p| p.handle == product.handle) {
            return Err(unprocessable(
                "products.json",
                r#"{"errors":{"handle":["has already been taken"]}}"#,
            ));
        }
        let id = state.next_id();
        let placeholder = state.new_variant(None, "Default Title", "0.00");
        let created = Product {
            id,
            title: product.title.clone(),
            handle: product.handle.clone(),
            variants: vec![placeholder],
        };
        state.products.push(created.clone());
        if self.racing_product {
            return Err(unprocessable(
                "products.json",
                r#"{"errors":{"handle":["has already been taken"]}}"#,
            ));
        }
        Ok(created)
    }

    async fn list_variants(&self, product_id: i64) -> Result<Vec<Variant>, AdminError> {
        self.log(format!("list {product_id}"));
        let mut state = self.state.lock().unwrap();
        Ok(state
            .product_mut(product_id)
            .map(|p| p.variants.clone())
            .unwrap_or_default())
    }

    async fn delete_variant(&self, variant_id: i64) -> Result<(), AdminError> {
        self.log(format!("delete_variant {variant_id}"));
        let mut state = self.state.lock().unwrap();
        for product in &mut state.products {
            product.variants.retain(|v| v.id != variant_id);
        }
        Ok(())
    }

    async fn reset_product_options(
        &self,
        product_id: i64,
        option_name: &str,
        placeholder: &str,
    ) -> Result<(), AdminError> {
        self.log(format!(
            "reset_options {product_id} {option_name}={placeholder}"
        ));
        Ok(())
    }

    async fn create_variant(
        &self,
        product_id: i64,
        variant: &NewVariant,
    ) -> Result<Variant, AdminError> {
        self.log(format!("create_variant {} {}", variant.sku, variant.price));
        if self.failing_skus.contains(&variant.sku) {
            return Err(server_error("POST", "variants.json"));
        }
        let mut state = self.state.lock().unwrap();
        let exists = state
            .product_mut(product_id)
            .is_some_and(|p| p.variants.iter().any(|v| v.sku() == variant.sku));
        if exists {
            return Err(unprocessable(
                "variants.json",
                r#"{"errors":{"base":["The variant already exists."]}}"#,
            ));
        }
        let created = state
            .insert_variant(product_id, &variant.sku, &variant.price)
            .ok_or_else(|| AdminError::MissingData {
                context: format!("product {product_id}"),
            })?;
        if self.racing_skus.contains(&variant.sku) {
            return Err(unprocessable(
                "variants.json",
                r#"{"errors":{"base":["The variant already exists."]}}"#,
            ));
        }
        Ok(created)
    }

    async fn update_variant_price(
        &self,
        variant_id: i64,
        price: &str,
    ) -> Result<Variant, AdminError> {
        self.log(format!("update_price {variant_id} {price}"));
        if self.fail_price_updates {
            return Err(AdminError::Status {
                method: "PUT".to_owned(),
                path: format!("variants/{variant_id}.json"),
                status: 422,
                body: r#"{"errors":{"price":["is invalid"]}}"#.to_owned(),
            });
        }
        let mut state = self.state.lock().unwrap();
        let variant = state
            .products
            .iter_mut()
            .flat_map(|p| p.variants.iter_mut())
            .find(|v| v.id == variant_id)
            .ok_or_else(|| AdminError::MissingData {
                context: format!("variant {variant_id}"),
            })?;
        variant.price = Some(price.to_owned());
        Ok(variant.clone())
    }

    async fn update_inventory_cost(
        &self,
        inventory_item_id: i64,
        cost: &str,
    ) -> Result<(), AdminError> {
        self.log(format!("update_cost {inventory_item_id} {cost}"));
        self.state
            .lock()
            .unwrap()
            .costs
            .insert(inventory_item_id, cost.to_owned());
        Ok(())
    }

    async fn set_variant_metafields(
        &self,
        variant_id: i64,
        namespace: &str,
        entries: &[MetafieldEntry],
    ) -> Result<MetafieldsSetOutcome, AdminError> {
        self.log(format!(
            "set_metafields {variant_id} {namespace} {}",
            entries.len()
        ));
        let (accepted, rejected): (Vec<MetafieldEntry>, Vec<MetafieldEntry>) = entries
            .iter()
            .cloned()
            .partition(|e| !self.rejected_keys.contains(&e.key));
        self.state
            .lock()
            .unwrap()
            .metafields
            .insert(variant_id, accepted.clone());
        Ok(MetafieldsSetOutcome {
            written: accepted
                .into_iter()
                .map(|e| Metafield {
                    namespace: namespace.to_owned(),
                    key: e.key,
                    value: e.value,
                    value_type: None,
                })
                .collect(),
            user_errors: rejected
                .into_iter()
                .map(|e| UserError {
                    field: Some(vec!["metafields".to_owned(), e.key]),
                    message: "Value is invalid".to_owned(),
                })
                .collect(),
        })
    }

    async fn create_metafield_definition(
        &self,
        definition: &DefinitionInput,
    ) -> Result<DefinitionOutcome, AdminError> {
        self.log(format!("create_definition {}", definition.key));
        let mut state = self.state.lock().unwrap();
        if state.definitions.insert(definition.key.clone()) {
            Ok(DefinitionOutcome::Created {
                namespace: definition.namespace.clone(),
                key: definition.key.clone(),
            })
        } else {
            Ok(DefinitionOutcome::AlreadyExists)
        }
    }
}
