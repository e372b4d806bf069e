//! Step recorder.
//!
//! Runs a textbook algorithm against an [`AlgorithmInput`] and writes down
//! every observable moment as a [`Step`]. Recording is synchronous and
//! deterministic; delays belong to playback.

mod graph;
mod linear;
mod sorting;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithm::{AlgorithmFamily, AlgorithmId};
use crate::error::{Result, VizError};
use crate::input::{AlgorithmInput, ContainerOp, NodeId};
use crate::step::{ContainerState, Counters, ElementId, Step, StepKind, StepSequence};

/// Optional parameters for a recording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOptions {
    /// Start node for BFS/DFS. Required for traversals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node: Option<NodeId>,
}

impl RecordOptions {
    /// Options with a traversal start node.
    #[must_use]
    pub const fn starting_at(node: NodeId) -> Self {
        Self {
            start_node: Some(node),
        }
    }
}

/// Records `input` under the algorithm named `algorithm_id`.
///
/// The id is matched case-insensitively; see [`AlgorithmId::parse`].
///
/// # Errors
///
/// - `ConfigurationError` if the algorithm id is unknown.
/// - `InvalidInputError` if the input does not fit the algorithm or a
///   traversal start node is missing or not in the graph.
///
/// # Examples
///
/// ```
/// use algoviz_engine::{record_steps, AlgorithmInput, RecordOptions};
///
/// let input = AlgorithmInput::Numbers(vec![5, 3, 1]);
/// let steps = record_steps(&input, "bubble_sort", &RecordOptions::default()).unwrap();
/// let last = steps.last().unwrap();
/// assert_eq!(last.container_state_after.values(), Some(&[1, 3, 5][..]));
/// assert_eq!(last.counters.get("swaps"), 3);
/// ```
pub fn record_steps(
    input: &AlgorithmInput,
    algorithm_id: &str,
    options: &RecordOptions,
) -> Result<StepSequence> {
    record(input, AlgorithmId::parse(algorithm_id)?, options)
}

/// Records `input` under an already-resolved algorithm.
pub fn record(
    input: &AlgorithmInput,
    algorithm: AlgorithmId,
    options: &RecordOptions,
) -> Result<StepSequence> {
    let sequence = match (algorithm, input) {
        (AlgorithmId::BubbleSort, AlgorithmInput::Numbers(values)) => {
            sorting::bubble_sort(values)
        }
        (AlgorithmId::SelectionSort, AlgorithmInput::Numbers(values)) => {
            sorting::selection_sort(values)
        }
        (AlgorithmId::InsertionSort, AlgorithmInput::Numbers(values)) => {
            sorting::insertion_sort(values)
        }
        (AlgorithmId::Bfs | AlgorithmId::Dfs, AlgorithmInput::Graph(graph)) => {
            let start = options.start_node.ok_or_else(|| {
                VizError::invalid_input(
                    "graph traversal needs a start node",
                    "Choose the node the traversal should begin from",
                )
            })?;
            if !graph.contains(start) {
                return Err(VizError::start_node_not_found(start));
            }
            if algorithm == AlgorithmId::Bfs {
                graph::breadth_first(graph, start)
            } else {
                graph::depth_first(graph, start)
            }
        }
        (AlgorithmId::Stack | AlgorithmId::Queue, AlgorithmInput::Values(values)) => {
            let ops: Vec<ContainerOp> = values.iter().cloned().map(ContainerOp::Insert).collect();
            linear::run(algorithm, &ops)?
        }
        (AlgorithmId::Stack | AlgorithmId::Queue, AlgorithmInput::Operations(ops)) => {
            linear::run(algorithm, ops)?
        }
        _ => return Err(wrong_input_kind(algorithm, input.family())),
    };

    let sequence = StepSequence::new(algorithm, sequence);
    debug!(
        algorithm = %algorithm,
        elements = input.len(),
        steps = sequence.len(),
        "Recorded step sequence"
    );
    Ok(sequence)
}

fn wrong_input_kind(algorithm: AlgorithmId, got: AlgorithmFamily) -> VizError {
    let expected = match algorithm.family() {
        AlgorithmFamily::Sorting => "a list of numbers",
        AlgorithmFamily::Traversal => "a graph",
        AlgorithmFamily::Linear => "values or a stack/queue operation script",
    };
    let received = match got {
        AlgorithmFamily::Sorting => "numbers",
        AlgorithmFamily::Traversal => "a graph",
        AlgorithmFamily::Linear => "values",
    };
    VizError::invalid_input(
        format!(
            "{} expects {expected}, but the input is {received}",
            algorithm.display_name()
        ),
        format!("Provide {expected}"),
    )
}

// ============================================================================
// StepLog
// ============================================================================

/// Append-only step buffer shared by the individual recorders.
///
/// Keeps the running counters so every step gets a copy of their values at
/// that moment.
pub(crate) struct StepLog {
    steps: Vec<Step>,
    counters: Counters,
}

impl StepLog {
    pub(crate) fn new(counter_names: &[&str]) -> Self {
        Self {
            steps: Vec::new(),
            counters: Counters::zeroed(counter_names),
        }
    }

    pub(crate) fn count(&mut self, name: &str) {
        self.counters.increment(name);
    }

    pub(crate) fn push(
        &mut self,
        kind: StepKind,
        subjects: impl IntoIterator<Item = ElementId>,
        state: ContainerState,
        narrative: impl Into<String>,
    ) {
        self.steps.push(Step {
            index: self.steps.len(),
            kind,
            subject_ids: subjects.into_iter().collect(),
            container_state_after: state,
            narrative: narrative.into(),
            counters: self.counters.clone(),
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }

    pub(crate) fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}
