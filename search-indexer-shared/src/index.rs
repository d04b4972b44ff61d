//! Logical index and type descriptions.

use std::fmt;
use std::sync::Arc;

use crate::mapping::{FieldType, TypeMapping};
use crate::provider::DataProvider;
use crate::record::DEFAULT_ID_FIELD;

/// A data provider registered on a type under a name.
pub type NamedDataProvider = (String, Arc<dyn DataProvider>);

/// A document schema within an index.
///
/// Owns the field mapping used for casting and index creation, and the
/// ordered set of data providers that enrich its documents.
#[derive(Clone)]
pub struct IndexType {
    name: String,
    id_field: String,
    mapping: TypeMapping,
    data_providers: Vec<NamedDataProvider>,
}

impl IndexType {
    /// Create an empty type keyed by the default `id` field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_field: DEFAULT_ID_FIELD.to_string(),
            mapping: TypeMapping::new(),
            data_providers: Vec::new(),
        }
    }

    /// Use a different record field as the document id.
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Declare the semantic type of a field.
    pub fn with_field(mut self, field: impl Into<String>, field_type: FieldType) -> Self {
        self.mapping.insert(field.into(), field_type);
        self
    }

    /// Replace the whole field mapping.
    pub fn with_mapping(mut self, mapping: TypeMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Register a data provider. Providers run in registration order; a
    /// provider registered under an existing name replaces it in place.
    pub fn with_data_provider(
        mut self,
        name: impl Into<String>,
        provider: Arc<dyn DataProvider>,
    ) -> Self {
        let name = name.into();
        match self.data_providers.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = provider,
            None => self.data_providers.push((name, provider)),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn mapping(&self) -> &TypeMapping {
        &self.mapping
    }

    /// All providers in registration order.
    pub fn data_providers(&self) -> &[NamedDataProvider] {
        &self.data_providers
    }

    /// Providers whose name is in `names`, in registration order.
    pub fn data_providers_named<S: AsRef<str>>(&self, names: &[S]) -> Vec<NamedDataProvider> {
        self.data_providers
            .iter()
            .filter(|(name, _)| names.iter().any(|n| n.as_ref() == name))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let providers: Vec<&str> = self.data_providers.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("IndexType")
            .field("name", &self.name)
            .field("id_field", &self.id_field)
            .field("mapping", &self.mapping)
            .field("data_providers", &providers)
            .finish()
    }
}

/// A resolved index in the search backend for one store.
#[derive(Debug, Clone)]
pub struct Index {
    name: String,
    identifier: String,
    types: Vec<IndexType>,
}

impl Index {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>, types: Vec<IndexType>) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
            types,
        }
    }

    /// Backend index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable identifier the index was resolved by.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Look up a type by name.
    pub fn get_type(&self, name: &str) -> Option<&IndexType> {
        self.types.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DataProviderError;
    use crate::record::Batch;
    use async_trait::async_trait;

    struct Passthrough;

    #[async_trait]
    impl DataProvider for Passthrough {
        async fn add_data(&self, batch: Batch, _store_id: u32) -> Result<Batch, DataProviderError> {
            Ok(batch)
        }
    }

    fn product_type() -> IndexType {
        IndexType::new("product")
            .with_data_provider("prices", Arc::new(Passthrough))
            .with_data_provider("stock", Arc::new(Passthrough))
            .with_data_provider("media", Arc::new(Passthrough))
    }

    #[test]
    fn test_providers_named_keeps_registration_order() {
        let index_type = product_type();

        let selected = index_type.data_providers_named(&["media", "prices"]);
        let names: Vec<&str> = selected.iter().map(|(n, _)| n.as_str()).collect();

        assert_eq!(names, vec!["prices", "media"]);
    }

    #[test]
    fn test_providers_named_without_match_is_empty() {
        let index_type = product_type();
        assert!(index_type.data_providers_named(&["unknown"]).is_empty());
    }

    #[test]
    fn test_register_same_name_replaces() {
        let index_type = product_type().with_data_provider("stock", Arc::new(Passthrough));
        assert_eq!(index_type.data_providers().len(), 3);
        assert_eq!(index_type.data_providers()[1].0, "stock");
    }

    #[test]
    fn test_get_type() {
        let index = Index::new("catalog_default", "catalog", vec![product_type()]);

        assert_eq!(index.identifier(), "catalog");
        assert_eq!(index.get_type("product").unwrap().id_field(), "id");
        assert!(index.get_type("category").is_none());
    }
}
