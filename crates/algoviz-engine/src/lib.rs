//! Algoviz engine
//!
//! Records textbook algorithms (sorting, graph traversal, stack and queue)
//! as step sequences, plays them back on a timer and projects each step into
//! per-element display tags.
//!
//! ```
//! use algoviz_engine::{project_step, record_steps, AlgorithmInput, RecordOptions, RenderTag};
//!
//! let input = AlgorithmInput::Numbers(vec![2, 1]);
//! let steps = record_steps(&input, "bubble_sort", &RecordOptions::default()).unwrap();
//! let tags = project_step(&steps[0], Some(0));
//! assert_eq!(tags.tag(0), RenderTag::Compared);
//! ```

pub mod algorithm;
pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod input;
pub mod playback;
pub mod projection;
pub mod recorder;
pub mod scheduler;
pub mod step;

pub use algorithm::{AlgorithmFamily, AlgorithmId};
pub use config::{EngineConfig, CONFIG_FILE_NAME, DEFAULT_SPEED_MS};
pub use control::{ControlSnapshot, ControlSurface};
pub use error::{Result, VizError};
pub use events::{EventBroadcaster, PlaybackEvent};
pub use input::{AlgorithmInput, ContainerOp, Graph, NodeId};
pub use playback::{Advance, ControlAction, PlaybackSnapshot, PlaybackState, PlaybackStatus};
pub use projection::{project_step, RenderTag, RenderTags};
pub use recorder::{record, record_steps, RecordOptions};
pub use scheduler::{Command, ControlOutcome, PlaybackScheduler};
pub use step::{ContainerState, Counters, ElementId, Step, StepKind, StepSequence};
