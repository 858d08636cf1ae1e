//! Label catalog for annotation classes.
//!
//! The catalog is a fixed, ordered list of labels. A label's position in the
//! catalog is the class index written to label files, so the ordering is part
//! of the persistence contract and must not change without a data migration.

use serde::{Deserialize, Serialize};

/// A label with a display name and a hex color (`#RRGGBB`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Display name of the label
    pub name: String,
    /// Stroke/text color used when rendering shapes with this label
    pub color: String,
}

impl Label {
    /// Create a new label with the given name and color.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// An ordered, immutable catalog of labels.
///
/// Shapes never own labels; they refer to catalog positions via
/// [`LabelRef`](crate::model::LabelRef).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCatalog {
    labels: Vec<Label>,
}

impl LabelCatalog {
    /// Create a catalog from an ordered list of labels.
    pub fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    /// Get a label by class index.
    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    /// Resolve a label name to its class index.
    pub fn class_index(&self, name: &str) -> Option<usize> {
        self.labels.iter().position(|l| l.name == name)
    }

    /// Number of labels in the catalog.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate over the labels in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }
}

impl Default for LabelCatalog {
    fn default() -> Self {
        default_catalog()
    }
}

/// The citizen-card label catalog.
///
/// Order matters: existing label files index into this list by position.
pub fn default_catalog() -> LabelCatalog {
    LabelCatalog::new(vec![
        Label::new("card", "#6C5CE7"),
        Label::new("image", "#2ECC71"),
        Label::new("date_of_expiry", "#4ECDC4"),
        Label::new("id", "#FF8A5B"),
        Label::new("name", "#9B59B6"),
        Label::new("date_of_birth", "#FF6B6B"),
        Label::new("gender", "#45B7D1"),
        Label::new("nation", "#3498DB"),
        Label::new("hometown", "#FDCB6E"),
        Label::new("permanent_residence", "#F39C12"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_order() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.get(0).unwrap().name, "card");
        assert_eq!(catalog.get(3).unwrap().name, "id");
        assert_eq!(catalog.get(9).unwrap().name, "permanent_residence");
        assert_eq!(catalog.class_index("id"), Some(3));
        assert_eq!(catalog.class_index("card"), Some(0));
    }

    #[test]
    fn test_default_catalog_colors() {
        let catalog = default_catalog();
        assert_eq!(catalog.get(0).unwrap().color, "#6C5CE7");
        assert_eq!(catalog.get(3).unwrap().color, "#FF8A5B");
    }

    #[test]
    fn test_class_index_unknown_name() {
        let catalog = default_catalog();
        assert_eq!(catalog.class_index("passport"), None);
    }

    #[test]
    fn test_get_out_of_range() {
        let catalog = default_catalog();
        assert!(catalog.get(10).is_none());
    }
}
