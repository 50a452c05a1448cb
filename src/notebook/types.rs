//! Notebook resource records
//!
//! Listing responses are decoded into these records once at the boundary.
//! Fields the gate does not look at are kept in `extra` so a filtered
//! listing serializes back with its original content.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Anything that can be filtered by name
pub trait NamedResource {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

/// A notebook entry from a notebook listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookRecord {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NotebookRecord {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            extra: Map::new(),
        }
    }
}

/// A section entry from a section listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SectionRecord {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            extra: Map::new(),
        }
    }
}

/// A page entry from a page listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            extra: Map::new(),
        }
    }
}

impl NamedResource for NotebookRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.display_name
    }
}

impl NamedResource for SectionRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.display_name
    }
}

impl NamedResource for PageRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.title
    }
}

/// Decode a JSON listing (`[...]` or `{"value": [...]}`) into records
pub fn decode_listing<T>(value: Value) -> Result<Vec<T>, serde_json::Error>
where
    T: serde::de::DeserializeOwned,
{
    match value {
        Value::Object(mut obj) if obj.contains_key("value") => {
            serde_json::from_value(obj.remove("value").unwrap_or(Value::Array(Vec::new())))
        }
        other => serde_json::from_value(other),
    }
}
