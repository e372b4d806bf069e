//! Render projection: step snapshot to per-element display tags.
//!
//! [`project_step`] is a pure function. Identical inputs give identical
//! (`Eq` and `Hash` equal) tag maps, so a renderer can skip redraws when the
//! tags did not change.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::step::{ContainerState, ElementId, Step, StepKind};

/// Display state of one rendered element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderTag {
    /// Nothing special.
    #[default]
    Default,
    /// Being compared in this step.
    Compared,
    /// Just swapped.
    Swapped,
    /// The element this step acts on (visited node, newly inserted value).
    Current,
    /// In its final sorted position.
    Sorted,
    /// Already visited by a traversal.
    Visited,
    /// Waiting in the traversal queue or stack.
    Frontier,
    /// Pointed at without being changed (peek, skip, new front).
    Highlighted,
}

impl fmt::Display for RenderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Compared => "compared",
            Self::Swapped => "swapped",
            Self::Current => "current",
            Self::Sorted => "sorted",
            Self::Visited => "visited",
            Self::Frontier => "frontier",
            Self::Highlighted => "highlighted",
        };
        f.write_str(name)
    }
}

/// Tag assignment for one rendered frame.
///
/// Elements without an entry are [`RenderTag::Default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderTags(BTreeMap<ElementId, RenderTag>);

impl RenderTags {
    /// Tag of `id`, `Default` if none was assigned.
    #[must_use]
    pub fn tag(&self, id: ElementId) -> RenderTag {
        self.0.get(&id).copied().unwrap_or_default()
    }

    /// Ids carrying `tag`, ascending.
    pub fn with_tag(&self, tag: RenderTag) -> impl Iterator<Item = ElementId> + '_ {
        self.0
            .iter()
            .filter(move |(_, assigned)| **assigned == tag)
            .map(|(id, _)| *id)
    }

    /// Returns `true` if every element is `Default`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates non-default assignments in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, RenderTag)> + '_ {
        self.0.iter().map(|(id, tag)| (*id, *tag))
    }

    fn set(&mut self, id: ElementId, tag: RenderTag) {
        if tag == RenderTag::Default {
            self.0.remove(&id);
        } else {
            self.0.insert(id, tag);
        }
    }
}

/// Maps `step` at playback position `cursor` to display tags.
///
/// A `None` cursor means playback has not started and every element is
/// `Default`. Subject ids that are not present in the step's container
/// (such as a popped stack slot) stay `Default`.
///
/// # Examples
///
/// ```
/// use algoviz_engine::{project_step, record_steps, AlgorithmInput, RecordOptions, RenderTag};
///
/// let steps = record_steps(&AlgorithmInput::Numbers(vec![2, 1]), "bubble_sort", &RecordOptions::default()).unwrap();
/// let tags = project_step(&steps[0], Some(0));
/// assert_eq!(tags.tag(0), RenderTag::Compared);
/// assert_eq!(tags.tag(1), RenderTag::Compared);
/// assert_eq!(project_step(&steps[0], None).tag(0), RenderTag::Default);
/// ```
#[must_use]
pub fn project_step(step: &Step, cursor: Option<usize>) -> RenderTags {
    let mut tags = RenderTags::default();
    if cursor.is_none() {
        return tags;
    }

    let state = &step.container_state_after;
    match state {
        ContainerState::Array { sorted, .. } => {
            for &id in sorted {
                tags.set(id, RenderTag::Sorted);
            }
        }
        ContainerState::Traversal { visited, frontier } => {
            for &id in visited {
                tags.set(id, RenderTag::Visited);
            }
            for &id in frontier {
                tags.set(id, RenderTag::Frontier);
            }
        }
        ContainerState::Linear { .. } => {}
    }

    let subject_tag = match (step.kind, state) {
        (StepKind::Compare, _) => RenderTag::Compared,
        (StepKind::Swap, _) => RenderTag::Swapped,
        (StepKind::MarkSorted, _) => RenderTag::Sorted,
        (StepKind::Visit, _) => RenderTag::Current,
        (StepKind::Push | StepKind::Enqueue, ContainerState::Linear { .. }) => RenderTag::Current,
        (StepKind::Push | StepKind::Enqueue | StepKind::Pop | StepKind::Dequeue | StepKind::NoOp, _) => {
            RenderTag::Highlighted
        }
    };
    for &id in &step.subject_ids {
        if state.contains_element(id) {
            tags.set(id, subject_tag);
        }
    }

    tags
}
