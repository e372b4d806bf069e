//! Markdown transcript rendering.
//!
//! The document has a summary table (algorithm, status, input, step count,
//! counters, final state) followed by one table row per step.
//!
//! # Example
//!
//! ```rust
//! use algoviz_engine::{record_steps, AlgorithmInput, RecordOptions};
//! use algoviz_report::{MarkdownGenerator, Transcript};
//!
//! let input = AlgorithmInput::Values(vec!["A".to_string(), "B".to_string()]);
//! let sequence = record_steps(&input, "stack", &RecordOptions::default()).unwrap();
//! let transcript = Transcript::builder().sequence(sequence).input(input).build().unwrap();
//!
//! let markdown = MarkdownGenerator::new(&transcript).generate();
//! assert!(markdown.contains("| Input | A, B |"));
//! ```

use std::fmt::Write;

use algoviz_engine::{AlgorithmInput, ContainerOp, ContainerState, Graph, Step};
use chrono::{DateTime, Utc};

use crate::Transcript;

/// Generates Markdown transcripts.
pub struct MarkdownGenerator<'a> {
    transcript: &'a Transcript,
}

impl<'a> MarkdownGenerator<'a> {
    /// Creates a new Markdown generator for the given transcript.
    #[must_use]
    pub const fn new(transcript: &'a Transcript) -> Self {
        Self { transcript }
    }

    /// Generates the complete Markdown document.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        self.write_title(&mut output);
        self.write_summary(&mut output);
        self.write_steps(&mut output);
        self.write_footer(&mut output);

        output
    }

    fn write_title(&self, output: &mut String) {
        let _ = writeln!(
            output,
            "# Algorithm Transcript: {}\n",
            self.transcript.algorithm.display_name()
        );
    }

    fn write_summary(&self, output: &mut String) {
        let transcript = self.transcript;
        let summary = &transcript.summary;

        let _ = writeln!(output, "## Summary\n");
        let _ = writeln!(output, "| Metric | Value |");
        let _ = writeln!(output, "|--------|-------|");
        let _ = writeln!(
            output,
            "| Algorithm | {} (`{}`) |",
            transcript.algorithm.display_name(),
            transcript.algorithm.as_str()
        );
        let _ = writeln!(output, "| Status | {} |", summary.status);
        let _ = writeln!(
            output,
            "| Input | {} |",
            describe_input(&transcript.input)
        );
        if let Some(node) = summary.start_node {
            let _ = writeln!(output, "| Start Node | {node} |");
        }
        let _ = writeln!(output, "| Steps | {} |", summary.total_steps);
        for (name, value) in summary.counters.iter() {
            let _ = writeln!(output, "| {} | {value} |", capitalize(name));
        }
        if let Some(step) = transcript.last_step() {
            let _ = writeln!(
                output,
                "| Final State | `{}` |",
                describe_state(&step.container_state_after)
            );
        }
        let _ = writeln!(output);
    }

    fn write_steps(&self, output: &mut String) {
        let _ = writeln!(output, "## Steps\n");

        if self.transcript.steps.is_empty() {
            let _ = writeln!(output, "*No steps recorded.*\n");
            return;
        }

        let _ = writeln!(output, "| # | Kind | Subjects | Narrative | State |");
        let _ = writeln!(output, "|---|------|----------|-----------|-------|");

        for step in &self.transcript.steps {
            Self::write_step(output, step);
        }

        let _ = writeln!(output);
    }

    fn write_step(output: &mut String, step: &Step) {
        let index = step.index;
        let kind = step.kind;
        let subjects = join(step.subject_ids.iter());
        let narrative = escape_markdown(&step.narrative);
        let state = describe_state(&step.container_state_after);
        let _ = writeln!(
            output,
            "| {index} | {kind} | {subjects} | {narrative} | `{state}` |"
        );
    }

    fn write_footer(&self, output: &mut String) {
        let _ = writeln!(output, "---");
        let timestamp = format_timestamp(&self.transcript.summary.generated_at);
        let _ = writeln!(output, "*Generated by algoviz at {timestamp}*");
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|item| item.to_string()).collect::<Vec<_>>().join(", ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// One-line summary of the input for the summary table.
fn describe_input(input: &AlgorithmInput) -> String {
    let text = match input {
        AlgorithmInput::Numbers(values) => join(values.iter()),
        AlgorithmInput::Graph(graph) => describe_graph(graph),
        AlgorithmInput::Values(values) => values.join(", "),
        AlgorithmInput::Operations(ops) => ops.iter().map(describe_op).collect::<Vec<_>>().join(", "),
    };
    if text.is_empty() {
        "*empty*".to_string()
    } else {
        escape_markdown(&text)
    }
}

/// Edges as `a-b` (or `a->b` when directed), then nodes without edges.
fn describe_graph(graph: &Graph) -> String {
    let arrow = if graph.is_directed() { "->" } else { "-" };
    let edges = graph
        .edges()
        .iter()
        .map(|(from, to)| format!("{from}{arrow}{to}"));
    let isolated = graph
        .nodes()
        .filter(|node| {
            !graph
                .edges()
                .iter()
                .any(|(from, to)| from == node || to == node)
        })
        .map(|node| node.to_string());
    join(edges.chain(isolated))
}

fn describe_op(op: &ContainerOp) -> String {
    match op {
        ContainerOp::Insert(value) => format!("insert {value}"),
        ContainerOp::Remove => "remove".to_string(),
        ContainerOp::Peek => "peek".to_string(),
        ContainerOp::PeekRear => "rear".to_string(),
        ContainerOp::Clear => "clear".to_string(),
    }
}

/// Compact container state for an inline code span.
fn describe_state(state: &ContainerState) -> String {
    let text = match state {
        ContainerState::Array { values, sorted } => {
            let values = join(values.iter());
            if sorted.is_empty() {
                format!("[{values}]")
            } else {
                format!("[{values}] sorted={{{}}}", join(sorted.iter()))
            }
        }
        ContainerState::Traversal { visited, frontier } => format!(
            "visited=[{}] frontier=[{}]",
            join(visited.iter()),
            join(frontier.iter())
        ),
        ContainerState::Linear {
            items,
            last_removed,
        } => match last_removed {
            Some(removed) => format!("[{}] removed={removed}", items.join(", ")),
            None => format!("[{}]", items.join(", ")),
        },
    };
    escape_markdown_inline_code(&text)
}

/// Escapes characters that Markdown or a table cell would interpret.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '*' | '_' | '`' | '#' | '[' | ']' | '(' | ')' | '!' | '\\' | '<' | '>' | '|' => {
                result.push('\\');
                result.push(ch);
            }
            '\n' => result.push_str("<br>"),
            _ => result.push(ch),
        }
    }

    result
}

/// Inline code keeps everything literal except backticks and pipes.
fn escape_markdown_inline_code(text: &str) -> String {
    text.replace('`', "'").replace('|', "\\|")
}

// ============================================================================
// Tests
// ============================================================================
