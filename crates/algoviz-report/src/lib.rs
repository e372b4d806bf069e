//! Algoviz transcripts
//!
//! A [`Transcript`] is the written record of one algorithm run: what was
//! recorded, from which input, how playback ended, and every step with its
//! narrative and resulting container state. Transcripts serialize to JSON for
//! programmatic access and render to Markdown for reading.
//!
//! # Generators
//!
//! - [`json::JsonGenerator`] - compact or pretty JSON, optionally written to a file
//! - [`MarkdownGenerator`] - summary table plus a step-by-step table
//!
//! # Example
//!
//! ```rust
//! use algoviz_engine::{record_steps, AlgorithmInput, RecordOptions};
//! use algoviz_report::{MarkdownGenerator, Transcript};
//!
//! let input = AlgorithmInput::Numbers(vec![5, 3, 1]);
//! let sequence = record_steps(&input, "bubble_sort", &RecordOptions::default()).unwrap();
//!
//! let transcript = Transcript::builder()
//!     .sequence(sequence)
//!     .input(input)
//!     .build()
//!     .unwrap();
//! assert_eq!(transcript.summary.total_steps, transcript.steps.len());
//!
//! let markdown = MarkdownGenerator::new(&transcript).generate();
//! assert!(markdown.contains("# Algorithm Transcript: Bubble Sort"));
//! ```

pub mod json;
mod markdown;

pub use markdown::MarkdownGenerator;

use std::path::{Path, PathBuf};

use algoviz_engine::{
    AlgorithmId, AlgorithmInput, Counters, NodeId, PlaybackStatus, Step, StepKind, StepSequence,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while building or writing a transcript.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// Failed to serialize the transcript to JSON.
    #[error("failed to serialize transcript: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to read or write transcript files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid transcript data.
    #[error("invalid transcript data: {0}")]
    InvalidData(String),
}

/// Result type for transcript operations.
pub type Result<T> = std::result::Result<T, TranscriptError>;

// ============================================================================
// Transcript
// ============================================================================

/// Written record of one algorithm run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    /// Algorithm that produced the steps.
    pub algorithm: AlgorithmId,

    /// Run-level facts.
    pub summary: TranscriptSummary,

    /// Input the steps were recorded from.
    pub input: AlgorithmInput,

    /// Every recorded step, in order.
    pub steps: Vec<Step>,
}

/// Run-level facts shown at the top of a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSummary {
    /// How playback ended. `completed` for a run that was only recorded.
    pub status: PlaybackStatus,

    /// Number of recorded steps.
    pub total_steps: usize,

    /// Traversal start node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node: Option<NodeId>,

    /// Counter values after the last step.
    pub counters: Counters,

    /// When the transcript was produced.
    pub generated_at: DateTime<Utc>,
}

impl Transcript {
    /// Creates a new transcript builder.
    #[must_use]
    pub fn builder() -> TranscriptBuilder {
        TranscriptBuilder::default()
    }

    /// Serializes the transcript to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(TranscriptError::from)
    }

    /// Step kinds in order of first appearance, with how often each occurs.
    #[must_use]
    pub fn kind_counts(&self) -> Vec<(StepKind, usize)> {
        let mut counts: Vec<(StepKind, usize)> = Vec::new();
        for step in &self.steps {
            match counts.iter_mut().find(|(kind, _)| *kind == step.kind) {
                Some((_, count)) => *count += 1,
                None => counts.push((step.kind, 1)),
            }
        }
        counts
    }

    /// The final step, if any.
    #[must_use]
    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// File stem shared by the Markdown and JSON outputs, e.g. `algoviz-bubble_sort`.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("algoviz-{}", self.algorithm.as_str())
    }

    /// Writes `<stem>.md` and `<stem>.json` into `dir`, creating it if needed.
    ///
    /// Returns the two paths, Markdown first.
    pub fn write_to_dir(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(dir)?;
        let stem = self.file_stem();

        let md_path = dir.join(format!("{stem}.md"));
        std::fs::write(&md_path, MarkdownGenerator::new(self).generate())?;

        let json_path = dir.join(format!("{stem}.json"));
        json::JsonGenerator::new(self).write_to_file(&json_path, true)?;

        Ok((md_path, json_path))
    }
}

// ============================================================================
// TranscriptBuilder
// ============================================================================

/// Builder for constructing [`Transcript`] instances.
#[derive(Debug, Clone, Default)]
pub struct TranscriptBuilder {
    sequence: Option<StepSequence>,
    input: Option<AlgorithmInput>,
    start_node: Option<NodeId>,
    status: Option<PlaybackStatus>,
    generated_at: Option<DateTime<Utc>>,
}

impl TranscriptBuilder {
    /// Sets the recorded steps.
    #[must_use]
    pub fn sequence(mut self, sequence: StepSequence) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Sets the input the steps were recorded from.
    #[must_use]
    pub fn input(mut self, input: AlgorithmInput) -> Self {
        self.input = Some(input);
        self
    }

    /// Sets the traversal start node.
    #[must_use]
    pub const fn start_node(mut self, node: Option<NodeId>) -> Self {
        self.start_node = node;
        self
    }

    /// Sets how playback ended.
    #[must_use]
    pub const fn status(mut self, status: PlaybackStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the generation timestamp. Defaults to now.
    #[must_use]
    pub const fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Builds the transcript.
    ///
    /// # Errors
    ///
    /// Returns `TranscriptError::InvalidData` if the sequence or input is
    /// missing, or if the input kind does not belong to the sequence's
    /// algorithm.
    pub fn build(self) -> Result<Transcript> {
        let sequence = self
            .sequence
            .ok_or_else(|| TranscriptError::InvalidData("sequence is required".to_string()))?;

        let input = self
            .input
            .ok_or_else(|| TranscriptError::InvalidData("input is required".to_string()))?;

        let algorithm = sequence.algorithm();
        if input.family() != algorithm.family() {
            return Err(TranscriptError::InvalidData(format!(
                "input does not belong to {}",
                algorithm.display_name()
            )));
        }

        Ok(Transcript {
            algorithm,
            summary: TranscriptSummary {
                status: self.status.unwrap_or(PlaybackStatus::Completed),
                total_steps: sequence.len(),
                start_node: self.start_node,
                counters: sequence.final_counters(),
                generated_at: self.generated_at.unwrap_or_else(Utc::now),
            },
            input,
            steps: sequence.steps().to_vec(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use algoviz_engine::{record_steps, RecordOptions};

    fn bubble_transcript(values: Vec<i64>) -> Transcript {
        let input = AlgorithmInput::Numbers(values);
        let sequence = record_steps(&input, "bubble_sort", &RecordOptions::default()).unwrap();
        Transcript::builder()
            .sequence(sequence)
            .input(input)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_fills_summary() {
        let transcript = bubble_transcript(vec![5, 3, 1]);
        assert_eq!(transcript.algorithm, AlgorithmId::BubbleSort);
        assert_eq!(transcript.summary.status, PlaybackStatus::Completed);
        assert_eq!(transcript.summary.total_steps, 9);
        assert_eq!(transcript.summary.counters.get(Counters::SWAPS), 3);
        assert_eq!(transcript.summary.counters.get(Counters::COMPARISONS), 3);
        assert_eq!(transcript.summary.start_node, None);
    }

    #[test]
    fn test_builder_missing_required_fields() {
        let err = Transcript::builder().build().unwrap_err();
        assert!(err.to_string().contains("sequence is required"));

        let sequence = record_steps(
            &AlgorithmInput::Numbers(vec![1]),
            "bubble_sort",
            &RecordOptions::default(),
        )
        .unwrap();
        let err = Transcript::builder().sequence(sequence).build().unwrap_err();
        assert!(err.to_string().contains("input is required"));
    }

    #[test]
    fn test_builder_rejects_mismatched_input() {
        let sequence = record_steps(
            &AlgorithmInput::Numbers(vec![1]),
            "bubble_sort",
            &RecordOptions::default(),
        )
        .unwrap();
        let err = Transcript::builder()
            .sequence(sequence)
            .input(AlgorithmInput::Values(vec!["A".to_string()]))
            .build()
            .unwrap_err();
        assert!(matches!(err, TranscriptError::InvalidData(_)));
    }

    #[test]
    fn test_kind_counts_in_first_seen_order() {
        let transcript = bubble_transcript(vec![5, 3, 1]);
        assert_eq!(
            transcript.kind_counts(),
            vec![
                (StepKind::Compare, 3),
                (StepKind::Swap, 3),
                (StepKind::MarkSorted, 3),
            ]
        );
    }

    #[test]
    fn test_file_stem() {
        let transcript = bubble_transcript(vec![2, 1]);
        assert_eq!(transcript.file_stem(), "algoviz-bubble_sort");
    }

    #[test]
    fn test_write_to_dir() {
        let dir = std::env::temp_dir().join("test_algoviz_transcripts");
        let transcript = bubble_transcript(vec![2, 1]);

        let (md_path, json_path) = transcript.write_to_dir(&dir).unwrap();
        assert!(md_path.ends_with("algoviz-bubble_sort.md"));
        let markdown = std::fs::read_to_string(&md_path).unwrap();
        assert!(markdown.contains("## Steps"));

        let json = std::fs::read_to_string(&json_path).unwrap();
        let parsed: Transcript = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, transcript);

        std::fs::remove_file(&md_path).ok();
        std::fs::remove_file(&json_path).ok();
        std::fs::remove_dir(&dir).ok();
    }
}
