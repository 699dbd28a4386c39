//! Editable interchange form for string tables
//!
//! ```json
//! {
//!   "groups": [
//!     [{ "label": "a", "text": "hello" }],
//!     [],
//!     [{ "label": "b", "text": "world" }, { "label": "c", "text": "!" }]
//!   ]
//! }
//! ```
//!
//! The document carries no byte order or attribute data. Converting it to a
//! [`Msbt`] yields a little-endian table with default attributes.

use crate::msbt::error::MsbtResult;
use crate::msbt::{Msbt, MsbtEntry, MsbtGroup};
use serde::{Deserialize, Serialize};

/// One label and its text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    /// Entry label
    pub label: String,
    /// Entry text
    pub text: String,
}

/// Groups of labelled strings as edited by translators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsbtDocument {
    /// Groups in table order
    pub groups: Vec<Vec<DocumentEntry>>,
}

impl MsbtDocument {
    /// Parse a document from JSON text
    pub fn from_json(json: &str) -> MsbtResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the document as pretty-printed JSON
    pub fn to_json(&self) -> MsbtResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<MsbtDocument> for Msbt {
    fn from(document: MsbtDocument) -> Self {
        let groups = document
            .groups
            .into_iter()
            .map(|entries| MsbtGroup {
                entries: entries
                    .into_iter()
                    .map(|DocumentEntry { label, text }| MsbtEntry { label, text })
                    .collect(),
            })
            .collect();
        Self {
            groups,
            ..Self::default()
        }
    }
}

impl From<&Msbt> for MsbtDocument {
    fn from(table: &Msbt) -> Self {
        Self {
            groups: table
                .groups
                .iter()
                .map(|group| {
                    group
                        .entries
                        .iter()
                        .map(|entry| DocumentEntry {
                            label: entry.label.clone(),
                            text: entry.text.clone(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}
