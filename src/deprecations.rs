use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// Table shape
// -----------------------------------------------------------------------------

/// One level of the deprecation tree: either a replacement value or a nested group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeprecationNode {
    Rename(String),
    Group(BTreeMap<String, DeprecationNode>),
}

impl DeprecationNode {
    pub fn as_group(&self) -> Option<&BTreeMap<String, DeprecationNode>> {
        match self {
            DeprecationNode::Group(g) => Some(g),
            DeprecationNode::Rename(_) => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&DeprecationNode> {
        self.as_group().and_then(|g| g.get(key))
    }

    /// Follow `path` from this node, stopping at the first missing segment.
    pub fn descend<S: AsRef<str>>(&self, path: &[S]) -> Option<&DeprecationNode> {
        path.iter().try_fold(self, |node, seg| node.get(seg.as_ref()))
    }
}

/// `owner → prop → old value → new value`. Theme variables live under their
/// export name and nest as deep as the variables object does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeprecationTable {
    owners: BTreeMap<String, DeprecationNode>,
}

impl DeprecationTable {
    pub fn new(owners: BTreeMap<String, DeprecationNode>) -> Self {
        Self { owners }
    }

    pub fn has_owner(&self, owner: &str) -> bool {
        self.owners.contains_key(owner)
    }

    /// The ownerless view used by member-chain lookups (`vars.borderColor.standard`).
    pub fn scope(&self, owner: &str) -> Option<&DeprecationNode> {
        self.owners.get(owner)
    }

    pub fn is_deprecated(&self, owner: &str, prop: &str) -> bool {
        self.owners
            .get(owner)
            .and_then(|o| o.get(prop))
            .and_then(DeprecationNode::as_group)
            .map(|values| !values.is_empty())
            .unwrap_or(false)
    }

    /// Returns the mapped value, or `old` untouched when nothing is mapped.
    pub fn replacement<'a>(&'a self, owner: &str, prop: &str, old: &'a str) -> &'a str {
        match self.owners.get(owner).and_then(|o| o.descend(&[prop, old])) {
            Some(DeprecationNode::Rename(new)) => new.as_str(),
            _ => old,
        }
    }
}

// -----------------------------------------------------------------------------
// Built-in table
// -----------------------------------------------------------------------------

fn renames(pairs: &[(&str, &str)]) -> DeprecationNode {
    DeprecationNode::Group(
        pairs
            .iter()
            .map(|(old, new)| (old.to_string(), DeprecationNode::Rename(new.to_string())))
            .collect(),
    )
}

fn group(entries: Vec<(&str, DeprecationNode)>) -> DeprecationNode {
    DeprecationNode::Group(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

impl Default for DeprecationTable {
    fn default() -> Self {
        let background = renames(&[
            ("card", "surface"),
            ("formAccentDisabled", "neutralLight"),
            ("input", "surface"),
            ("inputDisabled", "neutralSoft"),
            ("selection", "formAccentSoft"),
        ]);

        let owners = vec![
            (
                "Box",
                group(vec![
                    ("background", background.clone()),
                    (
                        "boxShadow",
                        renames(&[
                            ("standard", "neutralLight"),
                            ("borderStandardInverted", "borderNeutralInverted"),
                            ("borderStandardInvertedLarge", "borderNeutralInvertedLarge"),
                            ("borderFormHover", "borderFormAccent"),
                        ]),
                    ),
                ]),
            ),
            (
                "atoms",
                group(vec![(
                    "boxShadow",
                    renames(&[
                        ("borderStandard", "borderNeutralLight"),
                        ("borderStandardInverted", "borderNeutralInverted"),
                        ("borderStandardInvertedLarge", "borderNeutralInvertedLarge"),
                        ("borderFormHover", "borderFormAccent"),
                    ]),
                )]),
            ),
            (
                "vars",
                group(vec![
                    ("backgroundColor", background),
                    (
                        "borderColor",
                        renames(&[
                            ("standard", "neutralLight"),
                            ("standardInverted", "neutralInverted"),
                            ("formHover", "formAccent"),
                        ]),
                    ),
                ]),
            ),
        ];

        Self::new(owners.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_owner_scoped_values() {
        let table = DeprecationTable::default();
        assert!(table.is_deprecated("Box", "background"));
        assert!(!table.is_deprecated("Box", "padding"));
        assert!(!table.is_deprecated("Stack", "background"));
        assert_eq!(table.replacement("Box", "background", "card"), "surface");
        assert_eq!(table.replacement("Box", "background", "body"), "body");
        assert_eq!(table.replacement("Text", "tone", "card"), "card");
    }

    #[test]
    fn keys_are_case_sensitive() {
        let table = DeprecationTable::default();
        assert!(!table.is_deprecated("box", "background"));
        assert_eq!(table.replacement("Box", "background", "Card"), "Card");
    }

    #[test]
    fn empty_groups_are_not_deprecated() {
        let table: DeprecationTable =
            serde_json::from_str(r#"{ "Box": { "tone": {}, "size": { "small": "xsmall" } } }"#)
                .unwrap();
        assert!(!table.is_deprecated("Box", "tone"));
        assert!(table.is_deprecated("Box", "size"));
    }

    #[test]
    fn scope_walks_ownerless_groups() {
        let table = DeprecationTable::default();
        let vars = table.scope("vars").unwrap();
        assert_eq!(
            vars.descend(&["borderColor", "standard"]),
            Some(&DeprecationNode::Rename("neutralLight".into()))
        );
        assert!(vars.descend(&["borderColor", "missing"]).is_none());
        assert!(vars.get("space").is_none());
    }
}
