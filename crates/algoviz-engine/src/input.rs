//! Algorithm inputs and the parsers behind the "custom input" boxes.
//!
//! An [`AlgorithmInput`] is frozen once recording starts: the recorder only
//! ever borrows it, and the control surface refuses edits while a run is live.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::algorithm::AlgorithmFamily;
use crate::error::{Result, VizError};

/// Identifier of a graph node.
pub type NodeId = usize;

/// Matches a single `a-b` edge token.
#[allow(clippy::unwrap_used)]
static EDGE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)-(\d+)$").unwrap());

/// Matches a dash with optional surrounding whitespace.
#[allow(clippy::unwrap_used)]
static EDGE_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*").unwrap());

/// Splits free text on commas, semicolons and whitespace.
#[allow(clippy::unwrap_used)]
static TOKEN_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;\s]+").unwrap());

// ============================================================================
// AlgorithmInput
// ============================================================================

/// Raw data supplied by the user for one visualization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum AlgorithmInput {
    /// An ordered sequence of numbers to sort.
    Numbers(Vec<i64>),
    /// A graph to traverse.
    Graph(Graph),
    /// Values to push (stack) or enqueue (queue) in order.
    Values(Vec<String>),
    /// An explicit stack/queue operation script.
    Operations(Vec<ContainerOp>),
}

impl AlgorithmInput {
    /// Returns the algorithm family able to consume this input.
    ///
    /// `Values` and `Operations` are both consumed by the linear family.
    #[must_use]
    pub const fn family(&self) -> AlgorithmFamily {
        match self {
            Self::Numbers(_) => AlgorithmFamily::Sorting,
            Self::Graph(_) => AlgorithmFamily::Traversal,
            Self::Values(_) | Self::Operations(_) => AlgorithmFamily::Linear,
        }
    }

    /// Number of user-visible elements (array entries, nodes, values or operations).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numbers(values) => values.len(),
            Self::Graph(graph) => graph.node_count(),
            Self::Values(values) => values.len(),
            Self::Operations(ops) => ops.len(),
        }
    }

    /// Returns `true` if the input holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parses custom text for the given algorithm family.
    ///
    /// Linear text is read as an operation script only when every entry is a
    /// valid operation and at least one of them inserts a value. Anything else,
    /// such as `Pop, Rock, Jazz` or `Front, Back`, is a plain value list.
    ///
    /// # Examples
    ///
    /// ```
    /// use algoviz_engine::{AlgorithmFamily, AlgorithmInput};
    ///
    /// let input = AlgorithmInput::parse(AlgorithmFamily::Sorting, "5, 3 1").unwrap();
    /// assert_eq!(input, AlgorithmInput::Numbers(vec![5, 3, 1]));
    /// ```
    pub fn parse(family: AlgorithmFamily, text: &str) -> Result<Self> {
        match family {
            AlgorithmFamily::Sorting => parse_numbers(text).map(Self::Numbers),
            AlgorithmFamily::Traversal => Graph::parse(text).map(Self::Graph),
            AlgorithmFamily::Linear => {
                Ok(as_script(text)
                    .map_or_else(|| Self::Values(parse_values(text)), Self::Operations))
            }
        }
    }
}

impl Default for AlgorithmInput {
    fn default() -> Self {
        Self::Numbers(vec![5, 3, 8, 1, 9, 2])
    }
}

/// Parses a list of integers separated by commas and/or whitespace.
///
/// Empty text yields an empty list.
pub fn parse_numbers(text: &str) -> Result<Vec<i64>> {
    tokens(text)
        .map(|token| {
            token.parse::<i64>().map_err(|_| {
                VizError::invalid_input(
                    format!("'{token}' is not a whole number"),
                    "Enter whole numbers separated by commas, e.g. 5, 3, 8, 1",
                )
            })
        })
        .collect()
}

/// Parses a comma separated list of free-form values.
pub fn parse_values(text: &str) -> Vec<String> {
    text.split([',', '\n'])
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    TOKEN_SEPARATOR
        .split(text.trim())
        .filter(|token| !token.is_empty())
}

// ============================================================================
// Graph
// ============================================================================

/// A node/edge graph with deterministic, ascending neighbour order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GraphSpec", into = "GraphSpec")]
pub struct Graph {
    nodes: BTreeSet<NodeId>,
    edges: Vec<(NodeId, NodeId)>,
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
    directed: bool,
}

/// Wire form of a [`Graph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphSpec {
    nodes: Vec<NodeId>,
    #[serde(default)]
    edges: Vec<(NodeId, NodeId)>,
    #[serde(default)]
    directed: bool,
}

impl TryFrom<GraphSpec> for Graph {
    type Error = VizError;

    fn try_from(spec: GraphSpec) -> Result<Self> {
        Self::build(spec.nodes, spec.edges, spec.directed)
    }
}

impl From<Graph> for GraphSpec {
    fn from(graph: Graph) -> Self {
        Self {
            nodes: graph.nodes.into_iter().collect(),
            edges: graph.edges,
            directed: graph.directed,
        }
    }
}

impl Graph {
    /// Builds an undirected graph.
    ///
    /// Fails with `InvalidInputError` if an edge names a node not in `nodes`.
    pub fn undirected(
        nodes: impl IntoIterator<Item = NodeId>,
        edges: impl IntoIterator<Item = (NodeId, NodeId)>,
    ) -> Result<Self> {
        Self::build(nodes, edges, false)
    }

    /// Builds a directed graph.
    pub fn directed(
        nodes: impl IntoIterator<Item = NodeId>,
        edges: impl IntoIterator<Item = (NodeId, NodeId)>,
    ) -> Result<Self> {
        Self::build(nodes, edges, true)
    }

    fn build(
        nodes: impl IntoIterator<Item = NodeId>,
        edges: impl IntoIterator<Item = (NodeId, NodeId)>,
        directed: bool,
    ) -> Result<Self> {
        let nodes: BTreeSet<NodeId> = nodes.into_iter().collect();
        let edges: Vec<(NodeId, NodeId)> = edges.into_iter().collect();
        let mut adjacency: BTreeMap<NodeId, BTreeSet<NodeId>> =
            nodes.iter().map(|&node| (node, BTreeSet::new())).collect();

        for &(from, to) in &edges {
            for endpoint in [from, to] {
                if !nodes.contains(&endpoint) {
                    return Err(VizError::invalid_input(
                        format!("edge {from}-{to} refers to unknown node {endpoint}"),
                        "Add the node to the node list or remove the edge",
                    ));
                }
            }
            adjacency.entry(from).or_default().insert(to);
            if !directed {
                adjacency.entry(to).or_default().insert(from);
            }
        }

        Ok(Self {
            nodes,
            edges,
            adjacency,
            directed,
        })
    }

    /// Parses `a-b` edge tokens and bare node tokens into an undirected graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use algoviz_engine::Graph;
    ///
    /// let graph = Graph::parse("0-1, 0-2, 5").unwrap();
    /// assert_eq!(graph.nodes().collect::<Vec<_>>(), vec![0, 1, 2, 5]);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut nodes = BTreeSet::new();
        let mut edges = Vec::new();

        // "0 - 1" must stay one token through the split below.
        let compact = EDGE_DASH.replace_all(text, "-");
        for token in tokens(&compact) {
            if let Some(captures) = EDGE_TOKEN.captures(token) {
                let from = parse_node(&captures[1])?;
                let to = parse_node(&captures[2])?;
                nodes.insert(from);
                nodes.insert(to);
                edges.push((from, to));
            } else {
                nodes.insert(parse_node(token)?);
            }
        }

        Self::undirected(nodes, edges)
    }

    /// Returns `true` if edges are one-way.
    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if `node` is part of the graph.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    /// Neighbours of `node` in ascending order.
    pub fn neighbors(&self, node: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Smallest node id, used as the default traversal start.
    #[must_use]
    pub fn first_node(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }
}

fn parse_node(token: &str) -> Result<NodeId> {
    token.parse::<NodeId>().map_err(|_| {
        VizError::invalid_input(
            format!("'{token}' is not a node id or an edge"),
            "Write edges as a-b and isolated nodes as plain numbers, e.g. 0-1, 0-2, 3",
        )
    })
}

// ============================================================================
// ContainerOp
// ============================================================================

/// One operation of a stack/queue script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum ContainerOp {
    /// Push onto a stack or enqueue at the rear of a queue.
    Insert(String),
    /// Pop from a stack or dequeue from the front of a queue.
    Remove,
    /// Look at the stack top or the queue front.
    Peek,
    /// Look at the queue rear.
    PeekRear,
    /// Remove every element.
    Clear,
}

const INSERT_KEYWORDS: [&str; 3] = ["push", "enqueue", "insert"];
const REMOVE_KEYWORDS: [&str; 3] = ["pop", "dequeue", "remove"];
const PEEK_KEYWORDS: [&str; 3] = ["peek", "top", "front"];
const PEEK_REAR_KEYWORDS: [&str; 2] = ["rear", "back"];

fn keyword_of(entry: &str) -> String {
    entry
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// A script that never inserts only shows underflows, so it is read as values.
fn as_script(text: &str) -> Option<Vec<ContainerOp>> {
    let ops = parse_operations(text).ok()?;
    ops.iter()
        .any(|op| matches!(op, ContainerOp::Insert(_)))
        .then_some(ops)
}

/// Parses an operation script such as `push A, push B, pop`.
///
/// Entries are separated by commas or newlines.
pub fn parse_operations(text: &str) -> Result<Vec<ContainerOp>> {
    text.split([',', '\n'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_operation)
        .collect()
}

fn parse_operation(entry: &str) -> Result<ContainerOp> {
    let keyword = keyword_of(entry);
    let value = entry[entry.find(char::is_whitespace).unwrap_or(entry.len())..].trim();

    if INSERT_KEYWORDS.contains(&keyword.as_str()) {
        if value.is_empty() {
            return Err(VizError::invalid_input(
                format!("'{entry}' has no value to insert"),
                "Write the value after the keyword, e.g. push 42",
            ));
        }
        return Ok(ContainerOp::Insert(value.to_string()));
    }

    match keyword.as_str() {
        k if REMOVE_KEYWORDS.contains(&k) => Ok(ContainerOp::Remove),
        k if PEEK_KEYWORDS.contains(&k) => Ok(ContainerOp::Peek),
        k if PEEK_REAR_KEYWORDS.contains(&k) => Ok(ContainerOp::PeekRear),
        "clear" => Ok(ContainerOp::Clear),
        _ => Err(VizError::invalid_input(
            format!("unknown operation '{entry}'"),
            "Use push/enqueue <value>, pop/dequeue, peek/front, rear or clear",
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Number parsing
    // ------------------------------------------------------------------------

    #[test]
    fn test_parse_numbers_mixed_separators() {
        assert_eq!(parse_numbers("5, 3 ,1\n-4").unwrap(), vec![5, 3, 1, -4]);
    }

    #[test]
    fn test_parse_numbers_empty_text() {
        assert!(parse_numbers("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_numbers_rejects_garbage() {
        let err = parse_numbers("5, x, 1").unwrap_err();
        assert!(
            matches!(&err, VizError::InvalidInputError { message, .. } if message.contains("'x'")),
            "Expected InvalidInputError naming the token, got: {err:?}"
        );
    }

    #[test]
    fn test_parse_numbers_rejects_decimals() {
        assert!(parse_numbers("1.5").is_err());
    }

    // ------------------------------------------------------------------------
    // Graph
    // ------------------------------------------------------------------------

    #[test]
    fn test_graph_neighbors_are_ascending() {
        let graph = Graph::undirected([0, 1, 2, 3], [(0, 3), (0, 1), (2, 0)]).unwrap();
        assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(graph.neighbors(3).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_directed_graph_is_one_way() {
        let graph = Graph::directed([0, 1], [(0, 1)]).unwrap();
        assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(graph.neighbors(1).count(), 0);
        assert!(graph.is_directed());
    }

    #[test]
    fn test_graph_rejects_unknown_endpoint() {
        let err = Graph::undirected([0, 1], [(0, 4)]).unwrap_err();
        assert!(err.to_string().contains("unknown node 4"));
    }

    #[test]
    fn test_graph_parse_edges_and_isolated_nodes() {
        let graph = Graph::parse("0-1, 0 - 2; 7").unwrap();
        assert_eq!(graph.nodes().collect::<Vec<_>>(), vec![0, 1, 2, 7]);
        assert_eq!(graph.edges(), &[(0, 1), (0, 2)]);
        assert_eq!(graph.neighbors(7).count(), 0);
    }

    #[test]
    fn test_graph_parse_rejects_garbage() {
        assert!(Graph::parse("0-1, a-b").is_err());
    }

    #[test]
    fn test_graph_serde_roundtrip_validates() {
        let json = r#"{"nodes":[0,1,2],"edges":[[0,1],[0,2]]}"#;
        let graph: Graph = serde_json::from_str(json).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert!(!graph.is_directed());

        let bad = r#"{"nodes":[0],"edges":[[0,9]]}"#;
        assert!(serde_json::from_str::<Graph>(bad).is_err());
    }

    // ------------------------------------------------------------------------
    // Operations and values
    // ------------------------------------------------------------------------

    #[test]
    fn test_parse_operations() {
        let ops = parse_operations("push A, Push hello world\npop, top, rear, clear").unwrap();
        assert_eq!(
            ops,
            vec![
                ContainerOp::Insert("A".to_string()),
                ContainerOp::Insert("hello world".to_string()),
                ContainerOp::Remove,
                ContainerOp::Peek,
                ContainerOp::PeekRear,
                ContainerOp::Clear,
            ]
        );
    }

    #[test]
    fn test_parse_operations_requires_insert_value() {
        assert!(parse_operations("push").is_err());
    }

    #[test]
    fn test_parse_operations_rejects_unknown_keyword() {
        let err = parse_operations("push A, shove B").unwrap_err();
        assert!(err.to_string().contains("shove B"));
    }

    #[test]
    fn test_linear_parse_picks_values_or_script() {
        let values = AlgorithmInput::parse(AlgorithmFamily::Linear, "A, B , ,C").unwrap();
        assert_eq!(
            values,
            AlgorithmInput::Values(vec!["A".into(), "B".into(), "C".into()])
        );

        let script = AlgorithmInput::parse(AlgorithmFamily::Linear, "enqueue X, dequeue").unwrap();
        assert!(matches!(script, AlgorithmInput::Operations(ops) if ops.len() == 2));
    }

    #[test]
    fn test_linear_parse_keeps_keyword_like_values() {
        let genres = AlgorithmInput::parse(AlgorithmFamily::Linear, "Pop, Rock, Jazz").unwrap();
        assert_eq!(
            genres,
            AlgorithmInput::Values(vec!["Pop".into(), "Rock".into(), "Jazz".into()])
        );

        let sides = AlgorithmInput::parse(AlgorithmFamily::Linear, "Front, Back").unwrap();
        assert_eq!(
            sides,
            AlgorithmInput::Values(vec!["Front".into(), "Back".into()])
        );

        let broken = AlgorithmInput::parse(AlgorithmFamily::Linear, "push A, shove B").unwrap();
        assert!(matches!(broken, AlgorithmInput::Values(values) if values.len() == 2));
    }

    #[test]
    fn test_input_serialization() {
        let input = AlgorithmInput::Operations(vec![
            ContainerOp::Insert("A".to_string()),
            ContainerOp::Remove,
        ]);
        let json = serde_json::to_string(&input).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"operations","data":[{"op":"insert","value":"A"},{"op":"remove"}]}"#
        );
        let restored: AlgorithmInput = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, input);
    }

    #[test]
    fn test_input_len_and_family() {
        let graph = Graph::undirected([0, 1, 2], [(0, 1)]).unwrap();
        let input = AlgorithmInput::Graph(graph);
        assert_eq!(input.len(), 3);
        assert_eq!(input.family(), AlgorithmFamily::Traversal);
        assert!(AlgorithmInput::Values(vec![]).is_empty());
    }
}
