//! Read-only view of an already-resolved dependency graph.
//!
//! The serializer never talks to a resolver directly. It consumes the
//! [`ResolutionGraph`] trait, and [`ResolutionSnapshot`] is the in-memory
//! implementation loaded from a snapshot file or assembled with
//! [`ResolutionSnapshot::builder`].

use std::collections::HashMap;
use std::hash::Hash;
use std::path::Path;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use depdump_util::errors::{DumpError, DumpResult};

/// Outcome of a single dependency request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a, C> {
    /// The request was satisfied by `selected`, using the variant named `variant`.
    Resolved { variant: &'a str, selected: C },
    /// The resolver could not satisfy the request.
    Unresolved { reason: Option<&'a str> },
}

/// Narrow interface over a resolved dependency graph.
///
/// Requests are the edges of the graph (what was asked for); components are
/// the nodes (what was selected). Component handles double as node identity
/// when truncating repeated expansions.
pub trait ResolutionGraph {
    type Request: Copy;
    type Component: Copy + Eq + Hash;

    /// Named root request lists, in resolver order.
    fn groups(&self) -> Vec<(&str, &[Self::Request])>;

    /// Display name of what was requested on this edge.
    fn requested(&self, request: Self::Request) -> &str;

    fn resolution(&self, request: Self::Request) -> Resolution<'_, Self::Component>;

    /// Requests made by a selected component, in resolver order.
    fn dependencies(&self, component: Self::Component) -> &[Self::Request];
}

/// Handle to a component of a [`ResolutionSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentRef(NodeIndex);

/// Handle to a request of a [`ResolutionSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestRef(usize);

#[derive(Debug)]
struct Component {
    id: String,
    dependencies: Vec<RequestRef>,
}

#[derive(Debug)]
enum Outcome {
    Resolved { variant: String, selected: NodeIndex },
    Unresolved { reason: Option<String> },
}

#[derive(Debug)]
struct Request {
    requested: String,
    outcome: Outcome,
}

#[derive(Debug)]
struct Group {
    name: String,
    roots: Vec<RequestRef>,
}

/// An immutable, fully resolved dependency graph backed by petgraph.
#[derive(Debug)]
pub struct ResolutionSnapshot {
    graph: DiGraph<Component, ()>,
    index: HashMap<String, NodeIndex>,
    requests: Vec<Request>,
    groups: Vec<Group>,
}

impl ResolutionSnapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Load and validate a JSON snapshot file.
    pub fn from_path(path: &Path) -> DumpResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DumpError::Snapshot {
            message: format!("Failed to read snapshot {}: {e}", path.display()),
        })?;
        Self::parse(&content)
    }

    /// Parse and validate a JSON snapshot document.
    pub fn parse(content: &str) -> DumpResult<Self> {
        let document: SnapshotDocument =
            serde_json::from_str(content).map_err(|e| DumpError::Snapshot {
                message: format!("Failed to parse snapshot: {e}"),
            })?;
        Ok(Self::from_document(document)?)
    }

    /// Build a snapshot, checking that every selected component and every
    /// group name is declared exactly once.
    pub fn from_document(document: SnapshotDocument) -> Result<Self, DumpError> {
        let mut snapshot = Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            requests: Vec::new(),
            groups: Vec::new(),
        };

        for spec in &document.components {
            if snapshot.index.contains_key(&spec.id) {
                return Err(DumpError::Snapshot {
                    message: format!("component `{}` is declared more than once", spec.id),
                });
            }
            let idx = snapshot.graph.add_node(Component {
                id: spec.id.clone(),
                dependencies: Vec::new(),
            });
            snapshot.index.insert(spec.id.clone(), idx);
        }

        for spec in document.components {
            let from = snapshot.index[&spec.id];
            let mut dependencies = Vec::with_capacity(spec.dependencies.len());
            for request in spec.dependencies {
                let r = snapshot.add_request(request)?;
                if let Outcome::Resolved { selected, .. } = snapshot.requests[r.0].outcome {
                    snapshot.graph.update_edge(from, selected, ());
                }
                dependencies.push(r);
            }
            snapshot.graph[from].dependencies = dependencies;
        }

        for spec in document.groups {
            if snapshot.groups.iter().any(|g| g.name == spec.name) {
                return Err(DumpError::Snapshot {
                    message: format!("group `{}` is declared more than once", spec.name),
                });
            }
            let roots = spec
                .dependencies
                .into_iter()
                .map(|request| snapshot.add_request(request))
                .collect::<Result<Vec<_>, _>>()?;
            snapshot.groups.push(Group {
                name: spec.name,
                roots,
            });
        }

        tracing::debug!(
            "Loaded snapshot: {} groups, {} components, {} requests",
            snapshot.groups.len(),
            snapshot.component_count(),
            snapshot.request_count()
        );
        Ok(snapshot)
    }

    fn add_request(&mut self, spec: RequestSpec) -> Result<RequestRef, DumpError> {
        let outcome = match spec.selected {
            Some(selected) => {
                let Some(&idx) = self.index.get(&selected) else {
                    return Err(DumpError::Snapshot {
                        message: format!(
                            "request `{}` selects unknown component `{selected}`",
                            spec.requested
                        ),
                    });
                };
                Outcome::Resolved {
                    variant: spec.variant.unwrap_or(selected),
                    selected: idx,
                }
            }
            None => Outcome::Unresolved {
                reason: spec.reason,
            },
        };
        self.requests.push(Request {
            requested: spec.requested,
            outcome,
        });
        Ok(RequestRef(self.requests.len() - 1))
    }

    /// Look up a component by id.
    pub fn find(&self, id: &str) -> Option<ComponentRef> {
        self.index.get(id).copied().map(ComponentRef)
    }

    pub fn component_id(&self, component: ComponentRef) -> &str {
        &self.graph[component.0].id
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }

    /// Ids of the components that request `id`, in declaration order.
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut dependents: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect();
        dependents.sort();
        dependents
            .into_iter()
            .map(|d| self.graph[d].id.as_str())
            .collect()
    }

    /// Whether any component transitively depends on itself.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    pub fn component_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }
}

impl ResolutionGraph for ResolutionSnapshot {
    type Request = RequestRef;
    type Component = ComponentRef;

    fn groups(&self) -> Vec<(&str, &[RequestRef])> {
        self.groups
            .iter()
            .map(|g| (g.name.as_str(), g.roots.as_slice()))
            .collect()
    }

    fn requested(&self, request: RequestRef) -> &str {
        &self.requests[request.0].requested
    }

    fn resolution(&self, request: RequestRef) -> Resolution<'_, ComponentRef> {
        match &self.requests[request.0].outcome {
            Outcome::Resolved { variant, selected } => Resolution::Resolved {
                variant: variant.as_str(),
                selected: ComponentRef(*selected),
            },
            Outcome::Unresolved { reason } => Resolution::Unresolved {
                reason: reason.as_deref(),
            },
        }
    }

    fn dependencies(&self, component: ComponentRef) -> &[RequestRef] {
        &self.graph[component.0].dependencies
    }
}

/// On-disk form of a [`ResolutionSnapshot`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

/// A selected component and the requests it makes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpec {
    pub id: String,
    #[serde(default)]
    pub dependencies: Vec<RequestSpec>,
}

/// A named list of root requests (e.g. one build configuration).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<RequestSpec>,
}

/// One dependency request. A request without `selected` is unresolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestSpec {
    pub requested: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    /// Display name of the selected variant; defaults to the selected id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RequestSpec {
    pub fn resolved(requested: impl Into<String>, selected: impl Into<String>) -> Self {
        Self {
            requested: requested.into(),
            selected: Some(selected.into()),
            variant: None,
            reason: None,
        }
    }

    pub fn unresolved(requested: impl Into<String>) -> Self {
        Self {
            requested: requested.into(),
            selected: None,
            variant: None,
            reason: None,
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Programmatic construction of a [`ResolutionSnapshot`].
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    document: SnapshotDocument,
}

impl SnapshotBuilder {
    pub fn component(mut self, id: impl Into<String>, dependencies: Vec<RequestSpec>) -> Self {
        self.document.components.push(ComponentSpec {
            id: id.into(),
            dependencies,
        });
        self
    }

    pub fn group(mut self, name: impl Into<String>, dependencies: Vec<RequestSpec>) -> Self {
        self.document.groups.push(GroupSpec {
            name: name.into(),
            dependencies,
        });
        self
    }

    pub fn build(self) -> Result<ResolutionSnapshot, DumpError> {
        ResolutionSnapshot::from_document(self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> ResolutionSnapshot {
        ResolutionSnapshot::builder()
            .component(
                "app:a:1",
                vec![
                    RequestSpec::resolved("app:b:1", "app:b:1"),
                    RequestSpec::resolved("app:c:1", "app:c:1"),
                ],
            )
            .component("app:b:1", vec![RequestSpec::resolved("app:d:1", "app:d:1")])
            .component("app:c:1", vec![RequestSpec::resolved("app:d:1", "app:d:1")])
            .component("app:d:1", vec![])
            .group("compile", vec![RequestSpec::resolved("app:a:1", "app:a:1")])
            .build()
            .unwrap()
    }

    #[test]
    fn variant_defaults_to_selected_id() {
        let snap = diamond();
        let (_, roots) = snap.groups()[0];
        match snap.resolution(roots[0]) {
            Resolution::Resolved { variant, selected } => {
                assert_eq!(variant, "app:a:1");
                assert_eq!(snap.component_id(selected), "app:a:1");
            }
            other => panic!("expected resolved, got {other:?}"),
        }
    }

    #[test]
    fn dependencies_keep_declaration_order() {
        let snap = diamond();
        let a = snap.find("app:a:1").unwrap();
        let names: Vec<&str> = snap
            .dependencies(a)
            .iter()
            .map(|r| snap.requested(*r))
            .collect();
        assert_eq!(names, vec!["app:b:1", "app:c:1"]);
    }

    #[test]
    fn dependents_of_diamond_tip() {
        let snap = diamond();
        assert_eq!(snap.dependents_of("app:d:1"), vec!["app:b:1", "app:c:1"]);
        assert!(snap.dependents_of("app:a:1").is_empty());
        assert!(snap.dependents_of("missing").is_empty());
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        assert!(!diamond().has_cycles());
    }

    #[test]
    fn cycle_detected() {
        let snap = ResolutionSnapshot::builder()
            .component("a", vec![RequestSpec::resolved("b", "b")])
            .component("b", vec![RequestSpec::resolved("a", "a")])
            .group("runtime", vec![RequestSpec::resolved("a", "a")])
            .build()
            .unwrap();
        assert!(snap.has_cycles());
    }

    #[test]
    fn unknown_selected_component_rejected() {
        let err = ResolutionSnapshot::builder()
            .group("runtime", vec![RequestSpec::resolved("x:y:1", "x:y:1")])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("unknown component `x:y:1`"));
    }

    #[test]
    fn duplicate_component_rejected() {
        let err = ResolutionSnapshot::builder()
            .component("a", vec![])
            .component("a", vec![])
            .build()
            .unwrap_err();
        assert!(matches!(err, DumpError::Snapshot { .. }));
    }

    #[test]
    fn duplicate_group_rejected() {
        let err = ResolutionSnapshot::builder()
            .group("runtime", vec![RequestSpec::unresolved("a")])
            .group("runtime", vec![RequestSpec::unresolved("b")])
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid resolution snapshot: group `runtime` is declared more than once"
        );
    }

    #[test]
    fn counts() {
        let snap = diamond();
        assert_eq!(snap.component_count(), 4);
        assert_eq!(snap.request_count(), 5);
        assert_eq!(snap.group_names(), vec!["compile"]);
    }
}
