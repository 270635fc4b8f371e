//! Untyped configuration tree exchanged with the host.

/// A node holding a string value and ordered, uniquely named children.
///
/// Both the schema dump and the value dump of a host configuration use this
/// shape. A node with no children is a leaf and only its value matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    value: String,
    items: Vec<(String, RawConfig)>,
}

impl RawConfig {
    /// Creates an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a leaf holding `value`.
    #[must_use]
    pub fn leaf(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            items: Vec::new(),
        }
    }

    /// Builder-style helper that appends or replaces a child.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, child: Self) -> Self {
        self.set(name, child);
        self
    }

    /// Builder-style helper that appends or replaces a leaf child.
    #[must_use]
    pub fn with_value(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(name, Self::leaf(value))
    }

    /// The node's own value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the node's own value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Whether the node has any children.
    #[must_use]
    pub fn has_sub_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// Child names in insertion order.
    pub fn sub_items(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|(name, _)| name.as_str())
    }

    /// Looks up a direct child.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Self> {
        self.items
            .iter()
            .find_map(|(key, child)| (key == name).then_some(child))
    }

    /// Looks up a slash-separated descendant path.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Self> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.get(segment))
    }

    /// Returns the named child, creating an empty one when absent.
    #[expect(
        clippy::indexing_slicing,
        reason = "index comes from position() or the push just above"
    )]
    pub fn get_or_insert(&mut self, name: &str) -> &mut Self {
        let index = match self.items.iter().position(|(key, _)| key == name) {
            Some(index) => index,
            None => {
                self.items.push((name.to_owned(), Self::default()));
                self.items.len() - 1
            }
        };
        &mut self.items[index].1
    }

    /// Inserts or replaces a child.
    pub fn set(&mut self, name: impl Into<String>, child: Self) {
        let name = name.into();
        match self.items.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = child,
            None => self.items.push((name, child)),
        }
    }

    /// Calls `visitor` with every direct child and its name, in order.
    ///
    /// Returning `false` from the visitor stops the walk.
    pub fn visit_sub_items(&self, mut visitor: impl FnMut(&Self, &str) -> bool) {
        for (name, child) in &self.items {
            if !visitor(child, name) {
                break;
            }
        }
    }

    /// Merges `patch` into this tree.
    ///
    /// Leaf values in the patch overwrite; children merge by name, so options
    /// absent from the patch keep their current value.
    pub fn merge(&mut self, patch: &Self) {
        if !patch.has_sub_items() {
            self.value.clone_from(&patch.value);
            return;
        }
        for (name, child) in &patch.items {
            self.get_or_insert(name).merge(child);
        }
    }
}
