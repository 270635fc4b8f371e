//! Rendering of host configurations as JSON option trees.
//!
//! A configuration is rendered from two independent dumps. The schema dump is
//! grouped by `Path$...$TypeName` and becomes a tree of option objects, each
//! listing its children under `"Children"`. The value dump mirrors the option
//! paths directly. Merging copies each typed option's current value into its
//! `"Value"` field.

use serde_json::{Map, Value};

use crate::host::{ConfigDocument, RawConfig};

const OPTION_KEY: &str = "Option";
const TYPE_KEY: &str = "Type";
const VALUE_KEY: &str = "Value";
const CHILDREN_KEY: &str = "Children";
const GROUP_SEPARATOR: char = '$';

/// Option tree built from a schema dump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecTree {
    root: SpecNode,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct SpecNode {
    option: String,
    attributes: Map<String, Value>,
    children: Vec<SpecNode>,
}

impl SpecNode {
    fn named(option: &str) -> Self {
        Self {
            option: option.to_owned(),
            ..Self::default()
        }
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "index comes from position() or the push just above"
    )]
    fn child_mut(&mut self, option: &str) -> &mut Self {
        let index = match self.children.iter().position(|child| child.option == option) {
            Some(index) => index,
            None => {
                self.children.push(Self::named(option));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    fn merge(&mut self, value: &Value) {
        if self.attributes.contains_key(TYPE_KEY) {
            self.attributes.insert(VALUE_KEY.to_owned(), value.clone());
        }
        for child in &mut self.children {
            if let Some(child_value) = value.get(child.option.as_str()) {
                child.merge(child_value);
            }
        }
    }

    fn into_json(self, root: bool) -> Value {
        let mut object = Map::new();
        if !root {
            object.insert(OPTION_KEY.to_owned(), Value::String(self.option));
        }
        object.extend(self.attributes);
        if root || !self.children.is_empty() {
            let children = self
                .children
                .into_iter()
                .map(|child| child.into_json(false))
                .collect();
            object.insert(CHILDREN_KEY.to_owned(), Value::Array(children));
        }
        Value::Object(object)
    }
}

impl SpecTree {
    /// Builds the option tree from a schema dump.
    ///
    /// Nested groups attach below the option whose path they carry, so
    /// `Behavior$BehaviorConfig` lists its options as children of the
    /// `Behavior` option declared by the parent group.
    #[must_use]
    pub fn from_description(description: &RawConfig) -> Self {
        let mut root = SpecNode::default();
        description.visit_sub_items(|group, group_path| {
            group.visit_sub_items(|option, option_name| {
                let node = locate(&mut root, group_path, option_name);
                option.visit_sub_items(|attribute, key| {
                    node.attributes
                        .insert(key.to_owned(), value_to_json(attribute));
                    true
                });
                true
            });
            true
        });
        Self { root }
    }

    /// Copies current values into every typed option that has one.
    pub fn merge_values(&mut self, values: &Value) {
        self.root.merge(values);
    }

    /// Renders the tree; the root object only carries `"Children"`.
    #[must_use]
    pub fn into_json(self) -> Value {
        self.root.into_json(true)
    }
}

fn locate<'a>(root: &'a mut SpecNode, group_path: &str, option: &str) -> &'a mut SpecNode {
    let mut segments: Vec<&str> = group_path.split(GROUP_SEPARATOR).collect();
    // The trailing segment names the group's type, not an option.
    segments.pop();
    segments.push(option);
    segments
        .into_iter()
        .fold(root, |node, segment| node.child_mut(segment))
}

/// Mirrors a value dump into JSON: leaves become strings, inner nodes become
/// objects keyed by child name.
#[must_use]
pub fn value_to_json(values: &RawConfig) -> Value {
    if !values.has_sub_items() {
        return Value::String(values.value().to_owned());
    }
    let mut object = Map::new();
    values.visit_sub_items(|child, name| {
        object.insert(name.to_owned(), value_to_json(child));
        true
    });
    Value::Object(object)
}

/// Renders a configuration document as a merged option tree.
#[must_use]
pub fn config_to_json(document: &ConfigDocument) -> Value {
    let mut spec = SpecTree::from_description(&document.description);
    spec.merge_values(&value_to_json(&document.values));
    spec.into_json()
}
