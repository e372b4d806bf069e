//! JSON transcript output.
//!
//! [`JsonGenerator`] serializes a [`Transcript`] as compact single-line JSON
//! or pretty-printed JSON. Keys are camelCase, matching the event stream.
//!
//! # Example
//!
//! ```rust
//! use algoviz_engine::{record_steps, AlgorithmInput, RecordOptions};
//! use algoviz_report::{json::JsonGenerator, Transcript};
//!
//! let input = AlgorithmInput::Numbers(vec![2, 1]);
//! let sequence = record_steps(&input, "selection_sort", &RecordOptions::default()).unwrap();
//! let transcript = Transcript::builder().sequence(sequence).input(input).build().unwrap();
//!
//! let compact = JsonGenerator::new(&transcript).generate().unwrap();
//! assert!(compact.contains(r#""algorithm":"selection_sort""#));
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::{Result, Transcript, TranscriptError};

/// JSON transcript generator.
pub struct JsonGenerator<'a> {
    transcript: &'a Transcript,
}

impl<'a> JsonGenerator<'a> {
    /// Creates a new JSON generator for the given transcript.
    #[must_use]
    pub const fn new(transcript: &'a Transcript) -> Self {
        Self { transcript }
    }

    /// Generates compact JSON output (single line, no extra whitespace).
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::Serialization`] if JSON serialization fails.
    pub fn generate(&self) -> Result<String> {
        serde_json::to_string(self.transcript).map_err(TranscriptError::from)
    }

    /// Generates pretty-printed JSON output with 2-space indentation.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::Serialization`] if JSON serialization fails.
    pub fn generate_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self.transcript).map_err(TranscriptError::from)
    }

    /// Writes the transcript to `path`, creating or overwriting the file.
    ///
    /// Parent directories must exist.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::Serialization`] if JSON serialization fails.
    /// Returns [`TranscriptError::Io`] if file creation or writing fails.
    pub fn write_to_file(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = if pretty {
            self.generate_pretty()?
        } else {
            self.generate()?
        };

        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
