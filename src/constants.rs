//! Workshop constant store snapshots
//!
//! The host application owns a global store of named workshop constants
//! (group → entry → locale → text). The compiler never talks to that store
//! directly: each compile call receives a read-only [`ConstantTable`]
//! snapshot, typically deserialized from the JSON the host already holds,
//! and resolves `Constant.*` each-loop sources against it.

use indexmap::IndexMap;
use serde::Deserialize;

/// Locale whose values the compiler reads when iterating constants.
pub const DEFAULT_LOCALE: &str = "en-US";

/// One node in the constant tree: either a leaf entry mapping locales to
/// text, or a named group of further nodes.
///
/// Deserialization is shape-driven: a JSON object whose values are all
/// strings is an entry, anything else is a group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ConstantNode {
    /// Leaf entry: locale/variant → text
    Entry(IndexMap<String, String>),
    /// Named group of child nodes
    Group(IndexMap<String, ConstantNode>),
}

/// Read-only nested constant lookup table.
///
/// Iteration order of groups and entries is insertion order, which is
/// observable in each-loop output, so ordered maps are used throughout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ConstantTable {
    groups: IndexMap<String, ConstantNode>,
}

impl ConstantTable {
    /// Create an empty table (no `Constant.*` reference will resolve).
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize a table from a JSON snapshot of the host's store.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Resolve a dotted path (the part after `Constant.`) to the ordered
    /// default-locale values of the entries under that node.
    ///
    /// Returns `None` when any path segment is missing, when the path lands
    /// on a leaf entry instead of a group, or when a child entry carries no
    /// default-locale value.
    pub fn values_at(&self, path: &str) -> Option<Vec<String>> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.groups.get(first)?;

        for segment in segments {
            match node {
                ConstantNode::Group(children) => node = children.get(segment)?,
                ConstantNode::Entry(_) => return None,
            }
        }

        let children = match node {
            ConstantNode::Group(children) => children,
            ConstantNode::Entry(_) => return None,
        };

        let mut values = Vec::with_capacity(children.len());
        for child in children.values() {
            match child {
                ConstantNode::Entry(locales) => values.push(locales.get(DEFAULT_LOCALE)?.clone()),
                ConstantNode::Group(_) => return None,
            }
        }
        Some(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_table() -> ConstantTable {
        ConstantTable::from_json_str(
            r#"{
                "Test": {
                    "One": { "en-US": "one" },
                    "Two": { "en-US": "two" },
                    "Three": { "en-US": "three" }
                },
                "Heroes": {
                    "Support": {
                        "Mercy": { "en-US": "Mercy", "fr-FR": "Ange" },
                        "Lucio": { "en-US": "Lucio" }
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolves_top_level_group_in_insertion_order() {
        let table = sample_table();
        assert_eq!(
            table.values_at("Test"),
            Some(vec!["one".to_string(), "two".to_string(), "three".to_string()])
        );
    }

    #[test]
    fn test_resolves_nested_group_with_default_locale() {
        let table = sample_table();
        assert_eq!(
            table.values_at("Heroes.Support"),
            Some(vec!["Mercy".to_string(), "Lucio".to_string()])
        );
    }

    #[test]
    fn test_missing_segment_is_unresolved() {
        let table = sample_table();
        assert_eq!(table.values_at("Nope"), None);
        assert_eq!(table.values_at("Heroes.Damage"), None);
    }

    #[test]
    fn test_path_into_leaf_entry_is_unresolved() {
        let table = sample_table();
        assert_eq!(table.values_at("Test.One"), None);
        assert_eq!(table.values_at("Test.One.en-US"), None);
    }

    #[test]
    fn test_group_at_final_position_is_unresolved() {
        // "Heroes" contains a group, not locale entries
        let table = sample_table();
        assert_eq!(table.values_at("Heroes"), None);
    }

    #[test]
    fn test_empty_table() {
        let table = ConstantTable::new();
        assert!(table.is_empty());
        assert_eq!(table.values_at("Test"), None);
    }
}
