//! The serialized form of a dependency walk.

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// One walked request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeReport {
    Resolved {
        requested: String,
        resolved: String,
        expansion: Expansion,
    },
    Unresolved {
        requested: String,
        /// Failure text from the resolver. Not part of the JSON output.
        reason: Option<String>,
    },
}

/// What a resolved node carries below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// First visit: the walked children, in resolver order.
    Dependencies(Vec<NodeReport>),
    /// The selected component was already expanded earlier in the same walk.
    AlreadySeen,
}

impl NodeReport {
    pub fn requested(&self) -> &str {
        match self {
            NodeReport::Resolved { requested, .. } | NodeReport::Unresolved { requested, .. } => {
                requested
            }
        }
    }

    /// Children of a first-visit resolved node; empty otherwise.
    pub fn dependencies(&self) -> &[NodeReport] {
        match self {
            NodeReport::Resolved {
                expansion: Expansion::Dependencies(children),
                ..
            } => children,
            _ => &[],
        }
    }

    pub fn is_already_seen(&self) -> bool {
        matches!(
            self,
            NodeReport::Resolved {
                expansion: Expansion::AlreadySeen,
                ..
            }
        )
    }

    fn accumulate(&self, stats: &mut ReportStats) {
        stats.nodes += 1;
        match self {
            NodeReport::Resolved { expansion, .. } => match expansion {
                Expansion::Dependencies(children) => {
                    for child in children {
                        child.accumulate(stats);
                    }
                }
                Expansion::AlreadySeen => stats.truncated += 1,
            },
            NodeReport::Unresolved { .. } => stats.unresolved += 1,
        }
    }
}

impl Serialize for NodeReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NodeReport::Resolved {
                requested,
                resolved,
                expansion,
            } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("requested", requested)?;
                map.serialize_entry("resolved", resolved)?;
                match expansion {
                    Expansion::Dependencies(children) => {
                        map.serialize_entry("dependencies", children)?
                    }
                    Expansion::AlreadySeen => map.serialize_entry("alreadySeen", &true)?,
                }
                map.end()
            }
            NodeReport::Unresolved { requested, .. } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("requested", requested)?;
                map.serialize_entry("resolved", &false)?;
                map.end()
            }
        }
    }
}

/// Group name to walked roots, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyReport {
    groups: Vec<(String, Vec<NodeReport>)>,
}

impl DependencyReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group. Groups are emitted in the order they are pushed.
    pub fn push_group(&mut self, name: impl Into<String>, nodes: Vec<NodeReport>) {
        self.groups.push((name.into(), nodes));
    }

    pub fn groups(&self) -> &[(String, Vec<NodeReport>)] {
        &self.groups
    }

    pub fn get(&self, name: &str) -> Option<&[NodeReport]> {
        self.groups
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, nodes)| nodes.as_slice())
    }

    /// Pretty-printed JSON document, newline terminated.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    /// Single-line JSON document.
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn stats(&self) -> ReportStats {
        let mut stats = ReportStats {
            groups: self.groups.len(),
            ..ReportStats::default()
        };
        for (_, nodes) in &self.groups {
            for node in nodes {
                node.accumulate(&mut stats);
            }
        }
        stats
    }

    /// Render the report as an indented text tree, one section per group.
    ///
    /// Repeated nodes are marked `(*)` and unresolved requests `FAILED`.
    pub fn render_tree(&self) -> String {
        let mut output = String::new();
        for (i, (name, nodes)) in self.groups.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            output.push_str(&format!("{name}\n"));
            if nodes.is_empty() {
                output.push_str("No dependencies\n");
                continue;
            }
            let count = nodes.len();
            for (j, node) in nodes.iter().enumerate() {
                render_subtree(&mut output, node, "", j == count - 1);
            }
        }
        output
    }
}

fn render_subtree(output: &mut String, node: &NodeReport, prefix: &str, is_last: bool) {
    let connector = if is_last { "└── " } else { "├── " };
    let label = match node {
        NodeReport::Resolved {
            requested,
            resolved,
            expansion,
        } => {
            let mut label = if requested == resolved {
                requested.clone()
            } else {
                format!("{requested} -> {resolved}")
            };
            if *expansion == Expansion::AlreadySeen {
                label.push_str(" (*)");
            }
            label
        }
        NodeReport::Unresolved { requested, reason } => match reason {
            Some(reason) => format!("{requested} FAILED ({reason})"),
            None => format!("{requested} FAILED"),
        },
    };
    output.push_str(&format!("{prefix}{connector}{label}\n"));

    let children = node.dependencies();
    let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
    let count = children.len();
    for (i, child) in children.iter().enumerate() {
        render_subtree(output, child, &child_prefix, i == count - 1);
    }
}

impl Serialize for DependencyReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (name, nodes) in &self.groups {
            map.serialize_entry(name, nodes)?;
        }
        map.end()
    }
}

/// Summary counts over a [`DependencyReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub groups: usize,
    /// Every emitted node object, truncated and unresolved ones included.
    pub nodes: usize,
    pub truncated: usize,
    pub unresolved: usize,
}

impl fmt::Display for ReportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} groups, {} nodes ({} already seen, {} unresolved)",
            self.groups, self.nodes, self.truncated, self.unresolved
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(requested: &str) -> NodeReport {
        NodeReport::Resolved {
            requested: requested.into(),
            resolved: requested.into(),
            expansion: Expansion::Dependencies(vec![]),
        }
    }

    #[test]
    fn resolved_key_order() {
        let json = serde_json::to_string(&leaf("a")).unwrap();
        assert_eq!(json, r#"{"requested":"a","resolved":"a","dependencies":[]}"#);
    }

    #[test]
    fn already_seen_has_no_dependencies_key() {
        let node = NodeReport::Resolved {
            requested: "a".into(),
            resolved: "a-v".into(),
            expansion: Expansion::AlreadySeen,
        };
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"requested":"a","resolved":"a-v","alreadySeen":true}"#);
    }

    #[test]
    fn unresolved_omits_reason() {
        let node = NodeReport::Unresolved {
            requested: "x:y:1".into(),
            reason: Some("not found".into()),
        };
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"requested":"x:y:1","resolved":false}"#);
    }

    #[test]
    fn group_order_is_insertion_order() {
        let mut report = DependencyReport::new();
        report.push_group("zeta", vec![]);
        report.push_group("alpha", vec![]);
        assert_eq!(report.to_json_compact().unwrap(), r#"{"zeta":[],"alpha":[]}"#);
    }

    #[test]
    fn pretty_output_ends_with_newline() {
        let mut report = DependencyReport::new();
        report.push_group("runtime", vec![leaf("a")]);
        let pretty = report.to_json_pretty().unwrap();
        assert!(pretty.ends_with("}\n"));
        assert!(pretty.contains("\n  \"runtime\": [\n"));
    }

    #[test]
    fn stats_count_every_node() {
        let mut report = DependencyReport::new();
        report.push_group(
            "runtime",
            vec![
                NodeReport::Resolved {
                    requested: "a".into(),
                    resolved: "a".into(),
                    expansion: Expansion::Dependencies(vec![
                        leaf("b"),
                        NodeReport::Resolved {
                            requested: "b".into(),
                            resolved: "b".into(),
                            expansion: Expansion::AlreadySeen,
                        },
                    ]),
                },
                NodeReport::Unresolved {
                    requested: "c".into(),
                    reason: None,
                },
            ],
        );
        let stats = report.stats();
        assert_eq!(stats.groups, 1);
        assert_eq!(stats.nodes, 4);
        assert_eq!(stats.truncated, 1);
        assert_eq!(stats.unresolved, 1);
    }

    #[test]
    fn tree_rendering() {
        let mut report = DependencyReport::new();
        report.push_group(
            "compile",
            vec![
                NodeReport::Resolved {
                    requested: "a:1".into(),
                    resolved: "a:1-jvm".into(),
                    expansion: Expansion::Dependencies(vec![leaf("b:1")]),
                },
                NodeReport::Unresolved {
                    requested: "c:1".into(),
                    reason: Some("not found".into()),
                },
            ],
        );
        report.push_group("test", vec![]);

        let expected = "\
compile
├── a:1 -> a:1-jvm
│   └── b:1
└── c:1 FAILED (not found)

test
No dependencies
";
        assert_eq!(report.render_tree(), expected);
    }
}
