use std::collections::BTreeMap;

use crate::foundation::core::PropertyType;
use crate::schema::model::Schema;

/// Case-insensitive name index over a schema's properties.
///
/// `lower` maps lowercase name to canonical name; `types` maps canonical name to declared type.
/// When two names differ only by case, the first declared one owns the lowercase key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyIndex {
    lower: BTreeMap<String, String>,
    types: BTreeMap<String, PropertyType>,
}

impl PropertyIndex {
    /// Build the index from a schema.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut index = Self::default();
        for p in schema.properties() {
            index
                .lower
                .entry(p.name.to_lowercase())
                .or_insert_with(|| p.name.clone());
            index.types.insert(p.name.clone(), p.ty);
        }
        index
    }

    /// Resolve a payload key to `(canonical name, declared type)`.
    ///
    /// Exact matches win over case-folded ones.
    pub fn resolve(&self, key: &str) -> Option<(&str, PropertyType)> {
        if let Some((name, ty)) = self.types.get_key_value(key) {
            return Some((name.as_str(), *ty));
        }
        let canonical = self.lower.get(&key.to_lowercase())?;
        let ty = self.types.get(canonical)?;
        Some((canonical.as_str(), *ty))
    }

    /// Case-sensitive lookup by canonical name.
    pub fn exact(&self, name: &str) -> Option<PropertyType> {
        self.types.get(name).copied()
    }

    /// Lowercase → canonical table, sorted by key.
    pub fn lowercase_table(&self) -> &BTreeMap<String, String> {
        &self.lower
    }

    /// Canonical → type table, sorted by key.
    pub fn type_table(&self) -> &BTreeMap<String, PropertyType> {
        &self.types
    }

    /// Number of indexed properties.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Return `true` when no property is indexed.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
