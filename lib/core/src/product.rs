use crate::error::LoadError;
use ahash::AHashMap;
use serde::{Deserialize, Deserializer, Serialize};

/// A single catalog entry.
///
/// Text fields are never absent: `null` or missing values deserialize to an
/// empty string, so downstream code never re-checks field presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "product_id", alias = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProductRecord {
    #[inline]
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            description: description.into(),
        }
    }

    /// Build a record from optional text columns, as they arrive from
    /// nullable storage.
    pub fn from_nullable(
        id: String,
        name: Option<String>,
        category: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.unwrap_or_default(),
            category: category.unwrap_or_default(),
            description: description.unwrap_or_default(),
        }
    }

    /// Name, category and description joined by single spaces.
    pub fn composite_document(&self) -> String {
        let mut doc = String::with_capacity(
            self.name.len() + self.category.len() + self.description.len() + 2,
        );
        doc.push_str(&self.name);
        doc.push(' ');
        doc.push_str(&self.category);
        doc.push(' ');
        doc.push_str(&self.description);
        doc
    }
}

/// Products in load order, with a unique id per row.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ProductRecord>,
    index: AHashMap<String, usize>,
}

impl Catalog {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate and index records.
    ///
    /// Duplicate ids are rejected rather than overwritten, so the id to row
    /// mapping is always a bijection onto `0..len()`.
    pub fn from_records(records: Vec<ProductRecord>) -> std::result::Result<Self, LoadError> {
        let mut index = AHashMap::with_capacity(records.len());

        for (row, record) in records.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(LoadError::Malformed(format!(
                    "row {} has an empty product id",
                    row
                )));
            }
            if let Some(&first_row) = index.get(&record.id) {
                return Err(LoadError::DuplicateId {
                    id: record.id.clone(),
                    first_row,
                    second_row: row,
                });
            }
            index.insert(record.id.clone(), row);
        }

        Ok(Self { records, index })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize) -> Option<&ProductRecord> {
        self.records.get(row)
    }

    /// Row index of a product id.
    #[inline]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn by_id(&self, id: &str) -> Option<&ProductRecord> {
        self.position(id).and_then(|row| self.records.get(row))
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.records.iter()
    }
}
