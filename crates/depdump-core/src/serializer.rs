//! Cycle-safe walk of a [`ResolutionGraph`] into a [`DependencyReport`].
//!
//! Resolver output is not a tree: diamonds make a component reachable along
//! several paths, and malformed metadata can produce real cycles. Each walk
//! carries a visited set of selected components. The first encounter of a
//! component expands its dependencies; every later encounter within the same
//! set emits `alreadySeen` instead. Output therefore holds at most one full
//! expansion per component per set, and always terminates.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use depdump_util::errors::DumpError;

use crate::report::{DependencyReport, Expansion, NodeReport};
use crate::snapshot::{Resolution, ResolutionGraph};

/// How long a visited set lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeenScope {
    /// One set per group, shared by all of its roots.
    #[default]
    Group,
    /// A fresh set for every root request.
    Root,
    /// One set shared by every group.
    Global,
}

impl FromStr for SeenScope {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(SeenScope::Group),
            "root" => Ok(SeenScope::Root),
            "global" => Ok(SeenScope::Global),
            other => Err(DumpError::Config {
                message: format!(
                    "unknown seen scope `{other}` (expected one of: group, root, global)"
                ),
            }),
        }
    }
}

impl fmt::Display for SeenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeenScope::Group => "group",
            SeenScope::Root => "root",
            SeenScope::Global => "global",
        };
        f.write_str(name)
    }
}

/// Default cap on how many expanded components may be nested below a root.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Options for [`serialize`].
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    pub scope: SeenScope,
    /// Glob patterns selecting groups by name. Empty selects every group.
    pub groups: Vec<String>,
    /// Longest chain of expanded components allowed under one root.
    pub max_depth: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            scope: SeenScope::default(),
            groups: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A resolved component whose dependencies are still being walked.
struct Frame<'g, R> {
    requested: String,
    resolved: String,
    pending: std::slice::Iter<'g, R>,
    children: Vec<NodeReport>,
}

impl<R> Frame<'_, R> {
    fn finish(self) -> NodeReport {
        NodeReport::Resolved {
            requested: self.requested,
            resolved: self.resolved,
            expansion: Expansion::Dependencies(self.children),
        }
    }
}

enum Step<'g, R> {
    Done(NodeReport),
    Expand(Frame<'g, R>),
}

fn step<'g, G: ResolutionGraph>(
    graph: &'g G,
    request: G::Request,
    seen: &mut HashSet<G::Component>,
) -> Step<'g, G::Request> {
    let requested = graph.requested(request).to_string();
    match graph.resolution(request) {
        Resolution::Resolved { variant, selected } => {
            if seen.insert(selected) {
                Step::Expand(Frame {
                    requested,
                    resolved: variant.to_string(),
                    pending: graph.dependencies(selected).iter(),
                    children: Vec::new(),
                })
            } else {
                tracing::trace!("{requested} already seen, not expanding");
                Step::Done(NodeReport::Resolved {
                    requested,
                    resolved: variant.to_string(),
                    expansion: Expansion::AlreadySeen,
                })
            }
        }
        Resolution::Unresolved { reason } => Step::Done(NodeReport::Unresolved {
            requested,
            reason: reason.map(str::to_string),
        }),
    }
}

/// Walk one request, expanding its selected component unless `seen` already
/// holds it, with the default depth cap.
pub fn walk<G: ResolutionGraph>(
    graph: &G,
    request: G::Request,
    seen: &mut HashSet<G::Component>,
) -> Result<NodeReport, DumpError> {
    walk_with_limit(graph, request, seen, DEFAULT_MAX_DEPTH)
}

/// Walk one request using an explicit stack.
///
/// Fails with a snapshot error when more than `max_depth` expanded
/// components are nested under `request`.
pub fn walk_with_limit<G: ResolutionGraph>(
    graph: &G,
    request: G::Request,
    seen: &mut HashSet<G::Component>,
    max_depth: usize,
) -> Result<NodeReport, DumpError> {
    let mut root = match step(graph, request, seen) {
        Step::Done(node) => return Ok(node),
        Step::Expand(frame) => frame,
    };
    let mut stack: Vec<Frame<'_, G::Request>> = Vec::new();

    loop {
        let top = stack.last_mut().unwrap_or(&mut root);
        match top.pending.next().copied() {
            Some(child) => match step(graph, child, seen) {
                Step::Done(node) => top.children.push(node),
                Step::Expand(frame) => {
                    if stack.len() + 1 >= max_depth {
                        return Err(DumpError::Snapshot {
                            message: format!(
                                "dependencies of `{}` are nested deeper than {max_depth} levels",
                                root.requested
                            ),
                        });
                    }
                    stack.push(frame);
                }
            },
            None => match stack.pop() {
                Some(frame) => {
                    let node = frame.finish();
                    stack.last_mut().unwrap_or(&mut root).children.push(node);
                }
                None => return Ok(root.finish()),
            },
        }
    }
}

/// Walk every selected group of `graph`, in the graph's group order.
///
/// Fails when a group pattern is not a valid glob or a chain of
/// dependencies is nested deeper than `options.max_depth`.
pub fn serialize<G: ResolutionGraph>(
    graph: &G,
    options: &SerializeOptions,
) -> Result<DependencyReport, DumpError> {
    let mut filter = GroupFilter::new(&options.groups)?;
    let mut report = DependencyReport::new();
    let mut global_seen = HashSet::new();

    for (name, roots) in graph.groups() {
        if !filter.accepts(name) {
            tracing::debug!("Skipping group {name}");
            continue;
        }
        tracing::debug!(
            "Walking group {name} ({} roots, scope {})",
            roots.len(),
            options.scope
        );

        let max_depth = options.max_depth;
        let nodes = match options.scope {
            SeenScope::Group => {
                let mut seen = HashSet::new();
                roots
                    .iter()
                    .map(|r| walk_with_limit(graph, *r, &mut seen, max_depth))
                    .collect::<Result<Vec<_>, _>>()?
            }
            SeenScope::Root => roots
                .iter()
                .map(|r| walk_with_limit(graph, *r, &mut HashSet::new(), max_depth))
                .collect::<Result<Vec<_>, _>>()?,
            SeenScope::Global => roots
                .iter()
                .map(|r| walk_with_limit(graph, *r, &mut global_seen, max_depth))
                .collect::<Result<Vec<_>, _>>()?,
        };
        report.push_group(name, nodes);
    }

    filter.warn_unmatched();
    Ok(report)
}

struct GroupFilter<'a> {
    patterns: &'a [String],
    set: Option<GlobSet>,
    matched: Vec<bool>,
}

impl<'a> GroupFilter<'a> {
    fn new(patterns: &'a [String]) -> Result<Self, DumpError> {
        if patterns.is_empty() {
            return Ok(Self {
                patterns,
                set: None,
                matched: Vec::new(),
            });
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| DumpError::Config {
                message: format!("invalid group pattern `{pattern}`: {e}"),
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| DumpError::Config {
            message: format!("invalid group patterns: {e}"),
        })?;
        Ok(Self {
            patterns,
            set: Some(set),
            matched: vec![false; patterns.len()],
        })
    }

    fn accepts(&mut self, name: &str) -> bool {
        let Some(set) = &self.set else {
            return true;
        };
        let hits = set.matches(name);
        for i in &hits {
            self.matched[*i] = true;
        }
        !hits.is_empty()
    }

    fn warn_unmatched(&self) {
        for (pattern, hit) in self.patterns.iter().zip(&self.matched) {
            if !hit {
                tracing::warn!("Group pattern `{pattern}` did not match any group");
            }
        }
    }
}
