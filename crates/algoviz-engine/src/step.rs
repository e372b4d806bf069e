//! Recorded steps and step sequences.
//!
//! Every [`Step`] carries a complete snapshot of its container, so playback,
//! scrubbing and rendering never need to re-run the algorithm.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::algorithm::AlgorithmId;
use crate::input::NodeId;

/// Identifier of a rendered element: an array index, a node id or a
/// stack/queue position.
pub type ElementId = usize;

// ============================================================================
// StepKind
// ============================================================================

/// What happened in a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Two array elements were compared.
    Compare,
    /// Two array elements were swapped.
    Swap,
    /// A graph node was visited.
    Visit,
    /// A value or node entered the rear of a queue.
    Enqueue,
    /// A value left the front of a queue.
    Dequeue,
    /// A value or node was pushed onto a stack.
    Push,
    /// A value was popped off a stack.
    Pop,
    /// Array positions reached their final place.
    MarkSorted,
    /// Nothing changed (peek, skip, underflow, completion notice).
    NoOp,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Compare => "compare",
            Self::Swap => "swap",
            Self::Visit => "visit",
            Self::Enqueue => "enqueue",
            Self::Dequeue => "dequeue",
            Self::Push => "push",
            Self::Pop => "pop",
            Self::MarkSorted => "mark_sorted",
            Self::NoOp => "no_op",
        };
        f.write_str(name)
    }
}

// ============================================================================
// ContainerState
// ============================================================================

/// Full copy of the animated container immediately after a step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContainerState {
    /// Array being sorted.
    Array {
        /// Current contents.
        values: Vec<i64>,
        /// Indices already in their final position.
        sorted: BTreeSet<ElementId>,
    },
    /// Graph traversal progress.
    Traversal {
        /// Nodes in the order they were visited.
        visited: Vec<NodeId>,
        /// Pending queue (BFS, front first) or stack (DFS, bottom first).
        frontier: Vec<NodeId>,
    },
    /// Stack (bottom to top) or queue (front to rear).
    #[serde(rename_all = "camelCase")]
    Linear {
        /// Current contents.
        items: Vec<String>,
        /// Most recently popped or dequeued value.
        last_removed: Option<String>,
    },
}

impl ContainerState {
    /// Array contents, if this is an array snapshot.
    #[must_use]
    pub fn values(&self) -> Option<&[i64]> {
        match self {
            Self::Array { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Visit order, if this is a traversal snapshot.
    #[must_use]
    pub fn visited(&self) -> Option<&[NodeId]> {
        match self {
            Self::Traversal { visited, .. } => Some(visited),
            _ => None,
        }
    }

    /// Stack/queue contents, if this is a linear snapshot.
    #[must_use]
    pub fn items(&self) -> Option<&[String]> {
        match self {
            Self::Linear { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Most recently removed stack/queue value.
    #[must_use]
    pub fn last_removed(&self) -> Option<&str> {
        match self {
            Self::Linear { last_removed, .. } => last_removed.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if `id` names an element present in this snapshot.
    #[must_use]
    pub fn contains_element(&self, id: ElementId) -> bool {
        match self {
            Self::Array { values, .. } => id < values.len(),
            Self::Traversal { visited, frontier } => {
                visited.contains(&id) || frontier.contains(&id)
            }
            Self::Linear { items, .. } => id < items.len(),
        }
    }
}

// ============================================================================
// Counters
// ============================================================================

/// Named integer counters carried by each step (comparisons, swaps, ...).
///
/// Counters only ever go up during a recording.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counters(BTreeMap<String, u64>);

impl Counters {
    /// Number of comparisons made by a sort.
    pub const COMPARISONS: &'static str = "comparisons";
    /// Number of swaps made by a sort.
    pub const SWAPS: &'static str = "swaps";
    /// Number of nodes visited by a traversal.
    pub const VISITED: &'static str = "visited";
    /// Number of nodes enqueued by BFS.
    pub const ENQUEUED: &'static str = "enqueued";
    /// Number of nodes pushed by DFS.
    pub const PUSHED: &'static str = "pushed";
    /// Number of stack/queue insertions.
    pub const INSERTIONS: &'static str = "insertions";
    /// Number of stack/queue removals.
    pub const REMOVALS: &'static str = "removals";

    /// Creates counters with every name set to zero.
    #[must_use]
    pub fn zeroed(names: &[&str]) -> Self {
        Self(names.iter().map(|name| ((*name).to_string(), 0)).collect())
    }

    /// Returns the value of `name`, or zero if it was never registered.
    #[must_use]
    pub fn get(&self, name: &str) -> u64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    /// Adds one to `name`.
    pub fn increment(&mut self, name: &str) {
        *self.0.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Iterates counters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Returns `true` if no counter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Step
// ============================================================================

/// One discrete, replayable moment of an algorithm run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Position of this step in its sequence.
    pub index: usize,
    /// What happened.
    pub kind: StepKind,
    /// Elements or nodes this step concerns.
    pub subject_ids: BTreeSet<ElementId>,
    /// Container contents right after this step's effect.
    pub container_state_after: ContainerState,
    /// Human-readable description.
    pub narrative: String,
    /// Counter values right after this step.
    pub counters: Counters,
}

// ============================================================================
// StepSequence
// ============================================================================

/// The complete, immutable recording of one algorithm run.
///
/// Cloning is cheap: the steps are shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSequence {
    algorithm: AlgorithmId,
    steps: Arc<[Step]>,
}

impl StepSequence {
    /// Wraps recorded steps.
    #[must_use]
    pub fn new(algorithm: AlgorithmId, steps: Vec<Step>) -> Self {
        Self {
            algorithm,
            steps: steps.into(),
        }
    }

    /// The algorithm that produced this sequence.
    #[must_use]
    pub const fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if there are no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Last step, whose snapshot is the algorithm's final state.
    #[must_use]
    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// All steps in order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Iterates steps in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Final counter values.
    #[must_use]
    pub fn final_counters(&self) -> Counters {
        self.last().map(|step| step.counters.clone()).unwrap_or_default()
    }
}

impl Index<usize> for StepSequence {
    type Output = Step;

    fn index(&self, index: usize) -> &Step {
        &self.steps[index]
    }
}

impl<'a> IntoIterator for &'a StepSequence {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
