use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::{DiGraph, Neighbors, NodeIndex};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::cycle::ID_LENGTH;
use crate::core::ImportEdge;
use crate::graph::ModuleGraph;

/// Detector for finding circular import chains in a module graph
///
/// Uses Tarjan's Strongly Connected Components algorithm to partition the
/// graph, then reconstructs one representative cyclic path per component.
pub struct CycleDetector {
    cycles: Vec<Cycle>,
}

/// A concrete closed walk through the module graph
///
/// `paths` starts and ends with the same module. `id` only depends on the set
/// of modules involved, so the same cycle keeps its id across runs even when
/// traversal order changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    pub id: String,
    pub paths: Vec<String>,
    pub edges: Vec<CycleEdge>,
}

/// The import taken to get from one cycle member to the next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleEdge {
    pub from: String,
    pub to: String,
    pub import_info: ImportEdge,
}

impl Cycle {
    /// Build a cycle from a closed path, looking up the first import (in
    /// source order) connecting each consecutive pair
    ///
    /// Returns `None` if the path is not closed or some hop has no import in
    /// the graph.
    pub fn from_path(paths: Vec<String>, graph: &ModuleGraph) -> Option<Self> {
        if paths.len() < 2 || paths.first() != paths.last() {
            return None;
        }

        let edges = paths
            .windows(2)
            .map(|pair| {
                let import = graph.get(&pair[0])?.import_to(&pair[1])?;
                Some(CycleEdge {
                    from: pair[0].clone(),
                    to: pair[1].clone(),
                    import_info: import.clone(),
                })
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            id: cycle_id(&paths),
            paths,
            edges,
        })
    }

    /// Distinct modules in the cycle, sorted
    pub fn nodes(&self) -> Vec<&str> {
        self.paths
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of distinct modules in the cycle
    pub fn len(&self) -> usize {
        self.nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn is_self_loop(&self) -> bool {
        self.paths.len() == 2 && self.paths[0] == self.paths[1]
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

/// Stable identifier for a cycle: a truncated SHA-256 over the sorted,
/// deduplicated module paths
pub fn cycle_id<S: AsRef<str>>(paths: &[S]) -> String {
    let nodes: BTreeSet<&str> = paths.iter().map(AsRef::as_ref).collect();

    let mut hasher = Sha256::new();
    for node in nodes {
        hasher.update(node.as_bytes());
        hasher.update(b"\n");
    }

    let digest = format!("{:x}", hasher.finalize());
    digest[..ID_LENGTH].to_string()
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleDetector {
    /// Create a new cycle detector
    pub fn new() -> Self {
        Self { cycles: Vec::new() }
    }

    /// Detect all cycles in the module graph, replacing earlier results
    ///
    /// Every strongly connected component with more than one module, and
    /// every module importing itself, yields exactly one [`Cycle`]. Imports
    /// pointing at modules missing from the graph are ignored.
    ///
    /// `max_depth` is accepted for parity with path-search style detectors but
    /// does not limit the search: the component pass is not depth-bounded and
    /// path reconstruction uses an explicit stack.
    pub fn detect_cycles(&mut self, graph: &ModuleGraph, max_depth: Option<usize>) -> &[Cycle] {
        let _ = max_depth;

        let digraph = index_graph(graph);
        let sccs = strongly_connected(&digraph);

        let mut cycles = Vec::new();
        for scc in sccs {
            let members: Vec<&str> = scc.iter().map(|&idx| digraph[idx]).collect();

            let is_cycle = match scc.as_slice() {
                [single] => digraph.contains_edge(*single, *single),
                _ => true,
            };
            if !is_cycle {
                continue;
            }

            let Some(path) = representative_path(graph, &members) else {
                tracing::warn!(
                    members = members.len(),
                    "strongly connected component without a reconstructable path"
                );
                continue;
            };

            match Cycle::from_path(path, graph) {
                Some(cycle) => cycles.push(cycle),
                None => tracing::warn!("cycle path references a missing import"),
            }
        }

        cycles.sort_by(|a, b| a.nodes().cmp(&b.nodes()));
        tracing::debug!(cycles = cycles.len(), "cycle detection finished");

        self.cycles = cycles;
        &self.cycles
    }

    /// Get all detected cycles
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Consume the detector, returning its cycles
    pub fn into_cycles(self) -> Vec<Cycle> {
        self.cycles
    }

    /// Check if any cycles were detected
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// Get the number of detected cycles
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    /// Number of distinct modules taking part in any cycle
    pub fn affected_modules(&self) -> usize {
        self.cycles
            .iter()
            .flat_map(|cycle| cycle.paths.iter())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Convenience wrapper returning the cycles of a graph
pub fn detect_cycles(graph: &ModuleGraph, max_depth: Option<usize>) -> Vec<Cycle> {
    let mut detector = CycleDetector::new();
    detector.detect_cycles(graph, max_depth);
    detector.into_cycles()
}

fn index_graph(graph: &ModuleGraph) -> DiGraph<&str, ()> {
    let mut digraph = DiGraph::new();
    let mut indices = HashMap::new();

    for path in graph.paths() {
        indices.insert(path, digraph.add_node(path));
    }

    for path in graph.paths() {
        let from = indices[path];
        for target in graph.successors(path) {
            if let Some(&to) = indices.get(target) {
                digraph.add_edge(from, to, ());
            }
        }
    }

    digraph
}

const UNVISITED: usize = usize::MAX;

/// Tarjan's strongly connected components with an explicit work stack
///
/// Import chains can be far deeper than the native call stack allows, so the
/// DFS keeps one `(node, remaining neighbors)` frame per level on the heap.
fn strongly_connected(digraph: &DiGraph<&str, ()>) -> Vec<Vec<NodeIndex>> {
    let count = digraph.node_count();
    let mut index = vec![UNVISITED; count];
    let mut lowlink = vec![0; count];
    let mut on_stack = vec![false; count];
    let mut stack: Vec<NodeIndex> = Vec::new();
    let mut work: Vec<(NodeIndex, Neighbors<'_, ()>)> = Vec::new();
    let mut components = Vec::new();
    let mut next_index = 0;

    for root in digraph.node_indices() {
        if index[root.index()] != UNVISITED {
            continue;
        }

        index[root.index()] = next_index;
        lowlink[root.index()] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root.index()] = true;
        work.push((root, digraph.neighbors(root)));

        while let Some((node, neighbors)) = work.last_mut() {
            let node = *node;

            if let Some(next) = neighbors.next() {
                let n = next.index();
                if index[n] == UNVISITED {
                    index[n] = next_index;
                    lowlink[n] = next_index;
                    next_index += 1;
                    stack.push(next);
                    on_stack[n] = true;
                    work.push((next, digraph.neighbors(next)));
                } else if on_stack[n] {
                    lowlink[node.index()] = lowlink[node.index()].min(index[n]);
                }
                continue;
            }

            work.pop();
            if let Some((parent, _)) = work.last() {
                let p = parent.index();
                lowlink[p] = lowlink[p].min(lowlink[node.index()]);
            }

            if lowlink[node.index()] == index[node.index()] {
                let mut component = Vec::new();
                while let Some(member) = stack.pop() {
                    on_stack[member.index()] = false;
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }

    components
}

struct Frame<'a> {
    node: &'a str,
    successors: Vec<&'a str>,
    cursor: usize,
}

/// Walk the component from its smallest member and stop at the first
/// back-edge into a module still on the stack
fn representative_path(graph: &ModuleGraph, members: &[&str]) -> Option<Vec<String>> {
    let start = members.iter().min().copied()?;
    let member_set: HashSet<&str> = members.iter().copied().collect();
    let allow_self = members.len() == 1;

    let mut stack = vec![Frame {
        node: start,
        successors: component_successors(graph, &member_set, start, allow_self),
        cursor: 0,
    }];
    let mut on_stack: HashMap<&str, usize> = HashMap::from([(start, 0)]);
    let mut visited: HashSet<&str> = HashSet::from([start]);

    loop {
        let frame = stack.last_mut()?;
        let next = frame.successors.get(frame.cursor).copied();
        frame.cursor += 1;

        let Some(next) = next else {
            if let Some(done) = stack.pop() {
                on_stack.remove(done.node);
            }
            continue;
        };

        if let Some(&position) = on_stack.get(next) {
            let mut path: Vec<String> = stack[position..]
                .iter()
                .map(|frame| frame.node.to_string())
                .collect();
            path.push(next.to_string());
            return Some(path);
        }

        if visited.insert(next) {
            on_stack.insert(next, stack.len());
            stack.push(Frame {
                node: next,
                successors: component_successors(graph, &member_set, next, allow_self),
                cursor: 0,
            });
        }
    }
}

fn component_successors<'a>(
    graph: &'a ModuleGraph,
    members: &HashSet<&str>,
    node: &str,
    allow_self: bool,
) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    graph
        .successors(node)
        .filter(|target| members.contains(target))
        .filter(|target| allow_self || *target != node)
        .filter(|target| seen.insert(*target))
        .collect()
}
