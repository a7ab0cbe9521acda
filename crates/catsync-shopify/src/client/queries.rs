//! GraphQL documents sent by [`super::AdminClient`].

pub(super) const METAFIELDS_SET: &str = r"
mutation setMetafields($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields {
      id
      key
      value
      namespace
    }
    userErrors {
      field
      message
    }
  }
}
";

pub(super) const METAFIELD_DEFINITION_CREATE: &str = r"
mutation CreateMetafieldDefinition($definition: MetafieldDefinitionInput!) {
  metafieldDefinitionCreate(definition: $definition) {
    createdDefinition {
      id
      name
      namespace
      key
    }
    userErrors {
      field
      message
    }
  }
}
";

pub(super) const VARIANT_METAFIELDS_BY_ID: &str = r"
query getVariantMetafields($id: ID!, $namespace: String!, $first: Int!) {
  productVariant(id: $id) {
    id
    sku
    metafields(first: $first, namespace: $namespace) {
      edges {
        node {
          namespace
          key
          value
          type
        }
      }
    }
  }
}
";

pub(super) const VARIANTS_WITH_METAFIELDS: &str = r"
query listVariantMetafields($first: Int!, $query: String, $namespace: String!, $metafieldsFirst: Int!) {
  productVariants(first: $first, query: $query) {
    edges {
      node {
        id
        sku
        metafields(first: $metafieldsFirst, namespace: $namespace) {
          edges {
            node {
              namespace
              key
              value
              type
            }
          }
        }
      }
    }
  }
}
";
