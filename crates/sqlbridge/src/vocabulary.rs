//! Table → field-name vocabulary used to seed completions.
//!
//! The vocabulary is opaque input supplied by whoever renders the page
//! (usually schema metadata). It is never derived or validated here beyond
//! its shape: an object whose values are arrays of strings.

use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::BridgeError;

/// A table and its ordered field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFields {
    pub name: String,
    pub fields: Vec<String>,
}

/// Mapping from table name to an ordered sequence of field names.
///
/// Tables keep the order they were inserted (or appeared in the JSON input).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    tables: Vec<TableFields>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Add a table. A table that is already present gets its fields replaced,
    /// which matches how a repeated key behaves in a JSON object.
    pub fn insert(&mut self, name: impl Into<String>, fields: Vec<String>) {
        let name = name.into();
        match self.tables.iter_mut().find(|t| t.name == name) {
            Some(existing) => existing.fields = fields,
            None => self.tables.push(TableFields { name, fields }),
        }
    }

    pub fn tables(&self) -> &[TableFields] {
        &self.tables
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Fields of `table`. Exact match wins, otherwise the lookup is
    /// ASCII case-insensitive since SQL identifiers usually are.
    pub fn fields_of(&self, table: &str) -> Option<&[String]> {
        self.tables
            .iter()
            .find(|t| t.name == table)
            .or_else(|| self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(table)))
            .map(|t| t.fields.as_slice())
    }

    pub fn from_json_str(s: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a vocabulary from a JSON file shaped like `{"table": ["field", ...]}`.
    pub fn load(path: &Path) -> Result<Self, BridgeError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| BridgeError::VocabularyIo {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&content)
    }
}

impl<N, F> FromIterator<(N, Vec<F>)> for Vocabulary
where
    N: Into<String>,
    F: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, Vec<F>)>>(iter: I) -> Self {
        let mut vocabulary = Vocabulary::new();
        for (name, fields) in iter {
            vocabulary.insert(name, fields.into_iter().map(Into::into).collect());
        }
        vocabulary
    }
}

impl Serialize for Vocabulary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for table in &self.tables {
            map.serialize_entry(&table.name, &table.fields)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Vocabulary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VocabularyVisitor;

        impl<'de> Visitor<'de> for VocabularyVisitor {
            type Value = Vocabulary;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of table names to arrays of field names")
            }

            // `null` reads as an empty vocabulary
            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(Vocabulary::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut vocabulary = Vocabulary::new();
                while let Some((name, fields)) = access.next_entry::<String, Vec<String>>()? {
                    vocabulary.insert(name, fields);
                }
                Ok(vocabulary)
            }
        }

        deserializer.deserialize_any(VocabularyVisitor)
    }
}
