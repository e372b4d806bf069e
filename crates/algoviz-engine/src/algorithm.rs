//! The fixed catalogue of algorithms the recorder knows how to animate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VizError};

/// Identifier of a recordable algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlgorithmId {
    /// Bubble sort with early exit.
    #[default]
    BubbleSort,
    /// Selection sort.
    SelectionSort,
    /// Insertion sort.
    InsertionSort,
    /// Breadth-first traversal.
    Bfs,
    /// Depth-first traversal.
    Dfs,
    /// Stack push/pop/peek.
    Stack,
    /// Queue enqueue/dequeue/front/rear.
    Queue,
}

/// The kind of input an algorithm consumes and the container it animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmFamily {
    /// Sorts an array of numbers.
    Sorting,
    /// Walks a graph from a start node.
    Traversal,
    /// Mutates a stack or a queue.
    Linear,
}

impl AlgorithmId {
    /// All algorithms, in menu order.
    pub const ALL: [Self; 7] = [
        Self::BubbleSort,
        Self::SelectionSort,
        Self::InsertionSort,
        Self::Bfs,
        Self::Dfs,
        Self::Stack,
        Self::Queue,
    ];

    /// Parses an algorithm id.
    ///
    /// Matching ignores case and treats `-` and spaces like `_`, so
    /// `"Bubble Sort"`, `"bubble-sort"` and `"BUBBLE_SORT"` are the same id.
    ///
    /// # Examples
    ///
    /// ```
    /// use algoviz_engine::AlgorithmId;
    ///
    /// assert_eq!(AlgorithmId::parse("Bubble-Sort").unwrap(), AlgorithmId::BubbleSort);
    /// assert!(AlgorithmId::parse("bogo_sort").is_err());
    /// ```
    pub fn parse(id: &str) -> Result<Self> {
        Self::from_str_case_insensitive(id).ok_or_else(|| VizError::unknown_algorithm(id))
    }

    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "bubble_sort" | "bubble" => Some(Self::BubbleSort),
            "selection_sort" | "selection" => Some(Self::SelectionSort),
            "insertion_sort" | "insertion" => Some(Self::InsertionSort),
            "bfs" | "breadth_first" => Some(Self::Bfs),
            "dfs" | "depth_first" => Some(Self::Dfs),
            "stack" => Some(Self::Stack),
            "queue" => Some(Self::Queue),
            _ => None,
        }
    }

    /// Canonical snake_case id.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BubbleSort => "bubble_sort",
            Self::SelectionSort => "selection_sort",
            Self::InsertionSort => "insertion_sort",
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
            Self::Stack => "stack",
            Self::Queue => "queue",
        }
    }

    /// Human-readable name for headings.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::BubbleSort => "Bubble Sort",
            Self::SelectionSort => "Selection Sort",
            Self::InsertionSort => "Insertion Sort",
            Self::Bfs => "Breadth-First Search",
            Self::Dfs => "Depth-First Search",
            Self::Stack => "Stack",
            Self::Queue => "Queue",
        }
    }

    /// Returns the family this algorithm belongs to.
    #[must_use]
    pub const fn family(&self) -> AlgorithmFamily {
        match self {
            Self::BubbleSort | Self::SelectionSort | Self::InsertionSort => {
                AlgorithmFamily::Sorting
            }
            Self::Bfs | Self::Dfs => AlgorithmFamily::Traversal,
            Self::Stack | Self::Queue => AlgorithmFamily::Linear,
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmId {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for AlgorithmId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_case_insensitive(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid algorithm '{s}': expected one of 'bubble_sort', 'selection_sort', 'insertion_sort', 'bfs', 'dfs', 'stack', 'queue'"
            ))
        })
    }
}

impl Serialize for AlgorithmId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
