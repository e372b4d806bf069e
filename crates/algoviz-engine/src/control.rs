//! Control surface: user intents in, recorder and scheduler calls out.
//!
//! Mirrors a visualizer page whose buttons are disabled when they do not
//! apply. An action that is not valid for the current status comes back as
//! [`ControlOutcome::Ignored`] instead of an error. Bad user data (unparsable
//! text, unknown start node, out-of-range speed) is still an error, and it
//! leaves the previous input untouched.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info};

use crate::algorithm::{AlgorithmFamily, AlgorithmId};
use crate::config::EngineConfig;
use crate::error::{Result, VizError};
use crate::events::{EventBroadcaster, PlaybackEvent};
use crate::input::{AlgorithmInput, Graph, NodeId};
use crate::playback::{PlaybackSnapshot, PlaybackState};
use crate::projection::{project_step, RenderTags};
use crate::recorder::{record, RecordOptions};
use crate::scheduler::{Command, ControlOutcome, PlaybackScheduler};
use crate::step::Step;

/// Everything a UI needs to draw the current frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSnapshot {
    /// Playback status, cursor and speed.
    pub playback: PlaybackSnapshot,
    /// Selected algorithm.
    pub algorithm: AlgorithmId,
    /// Current input.
    pub input: AlgorithmInput,
    /// Traversal start node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_node: Option<NodeId>,
    /// Step under the cursor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<Step>,
    /// Display tags for the step under the cursor.
    pub tags: RenderTags,
}

#[derive(Debug)]
struct Session {
    algorithm: AlgorithmId,
    input: AlgorithmInput,
    options: RecordOptions,
}

/// Sample input shown when an algorithm family is first selected.
fn sample_input(family: AlgorithmFamily) -> AlgorithmInput {
    match family {
        AlgorithmFamily::Sorting => AlgorithmInput::default(),
        AlgorithmFamily::Traversal => Graph::undirected(
            0..6,
            [(0, 1), (0, 2), (1, 3), (1, 4), (2, 5)],
        )
        .map_or_else(|_| AlgorithmInput::default(), AlgorithmInput::Graph),
        AlgorithmFamily::Linear => {
            AlgorithmInput::Values(["A", "B", "C"].map(str::to_string).to_vec())
        }
    }
}

fn default_options(input: &AlgorithmInput) -> RecordOptions {
    match input {
        AlgorithmInput::Graph(graph) => RecordOptions {
            start_node: graph.first_node(),
        },
        _ => RecordOptions::default(),
    }
}

/// Logs engine bugs before handing them back.
fn surface<T>(result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        if err.is_fatal() {
            error!(error = %err, "Playback engine rejected a transition the control surface allowed");
        }
    }
    result
}

/// One visualization session: input, algorithm choice and playback.
#[derive(Debug)]
pub struct ControlSurface {
    config: EngineConfig,
    session: Mutex<Session>,
    scheduler: PlaybackScheduler,
}

impl ControlSurface {
    /// Opens a session with the configured default algorithm and its sample input.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let algorithm = config.default_algorithm;
        let input = sample_input(algorithm.family());
        let options = default_options(&input);
        let scheduler = PlaybackScheduler::new(
            PlaybackState::new(config.default_speed_ms),
            EventBroadcaster::new(config.event_capacity),
        );
        Self {
            config,
            session: Mutex::new(Session {
                algorithm,
                input,
                options,
            }),
            scheduler,
        }
    }

    /// The configuration this session was opened with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The scheduler driving this session.
    #[must_use]
    pub const fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    /// Subscribes to playback events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.scheduler.subscribe()
    }

    /// Selected algorithm.
    pub async fn algorithm(&self) -> AlgorithmId {
        self.session.lock().await.algorithm
    }

    /// Current input.
    pub async fn input(&self) -> AlgorithmInput {
        self.session.lock().await.input.clone()
    }

    /// Current record options.
    pub async fn options(&self) -> RecordOptions {
        self.session.lock().await.options
    }

    /// Everything needed to draw the current frame.
    pub async fn snapshot(&self) -> ControlSnapshot {
        let session = self.session.lock().await;
        let (playback, current_step) = self.scheduler.view().await;
        let tags = current_step
            .as_ref()
            .map(|step| project_step(step, playback.cursor))
            .unwrap_or_default();
        ControlSnapshot {
            playback,
            algorithm: session.algorithm,
            input: session.input.clone(),
            start_node: session.options.start_node,
            current_step,
            tags,
        }
    }

    async fn editing_locked(&self, action: &str) -> bool {
        let status = self.scheduler.status().await;
        if status.is_live() {
            debug!(action, status = %status, "Ignoring edit while a run is live");
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------------
    // Input editing
    // ------------------------------------------------------------------------

    /// Selects an algorithm.
    ///
    /// Switching to another family replaces the input with that family's
    /// sample input.
    pub async fn set_algorithm(&self, algorithm: AlgorithmId) -> Result<ControlOutcome> {
        let mut session = self.session.lock().await;
        if self.editing_locked("set_algorithm").await {
            return Ok(ControlOutcome::Ignored);
        }
        if session.algorithm.family() != algorithm.family() {
            session.input = sample_input(algorithm.family());
            session.options = default_options(&session.input);
        }
        session.algorithm = algorithm;
        info!(algorithm = %algorithm, "Algorithm selected");
        Ok(ControlOutcome::Applied)
    }

    /// Selects an algorithm by id; unknown ids are a `ConfigurationError`.
    pub async fn set_algorithm_by_name(&self, id: &str) -> Result<ControlOutcome> {
        self.set_algorithm(AlgorithmId::parse(id)?).await
    }

    /// Replaces the input after validating it against the selected algorithm.
    pub async fn set_input(&self, input: AlgorithmInput) -> Result<ControlOutcome> {
        let mut session = self.session.lock().await;
        if self.editing_locked("set_input").await {
            return Ok(ControlOutcome::Ignored);
        }
        self.validate_input(session.algorithm, &input)?;

        if let AlgorithmInput::Graph(graph) = &input {
            let keep = session.options.start_node.filter(|node| graph.contains(*node));
            session.options.start_node = keep.or_else(|| graph.first_node());
        } else {
            session.options.start_node = None;
        }
        debug!(elements = input.len(), "Input replaced");
        session.input = input;
        Ok(ControlOutcome::Applied)
    }

    /// Parses custom text for the selected algorithm and uses it as input.
    pub async fn set_custom_input(&self, text: &str) -> Result<ControlOutcome> {
        let algorithm = self.algorithm().await;
        let input = AlgorithmInput::parse(algorithm.family(), text)?;
        self.set_input(input).await
    }

    /// Picks the traversal start node.
    pub async fn set_start_node(&self, node: NodeId) -> Result<ControlOutcome> {
        let mut session = self.session.lock().await;
        if self.editing_locked("set_start_node").await {
            return Ok(ControlOutcome::Ignored);
        }
        match &session.input {
            AlgorithmInput::Graph(graph) if graph.contains(node) => {
                session.options.start_node = Some(node);
                Ok(ControlOutcome::Applied)
            }
            AlgorithmInput::Graph(_) => Err(VizError::start_node_not_found(node)),
            _ => Err(VizError::invalid_input(
                "a start node only applies to graph traversals",
                "Select BFS or DFS first",
            )),
        }
    }

    fn validate_input(&self, algorithm: AlgorithmId, input: &AlgorithmInput) -> Result<()> {
        if input.family() != algorithm.family() {
            return Err(VizError::invalid_input(
                format!(
                    "{} cannot run on this kind of input",
                    algorithm.display_name()
                ),
                "Provide input that matches the selected algorithm",
            ));
        }
        if input.len() > self.config.max_elements {
            return Err(VizError::invalid_input(
                format!(
                    "input has {} elements, the limit is {}",
                    input.len(),
                    self.config.max_elements
                ),
                "Use a smaller input so every step stays readable",
            ));
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------------

    /// Records the current input afresh and starts playing it.
    pub async fn start(&self) -> Result<ControlOutcome> {
        let session = self.session.lock().await;
        let status = self.scheduler.status().await;
        if !status.accepts_start() {
            debug!(status = %status, "Ignoring start while a run is live");
            return Ok(ControlOutcome::Ignored);
        }
        let sequence = record(&session.input, session.algorithm, &session.options)?;
        surface(self.scheduler.dispatch(Command::StartWith(sequence)).await)
    }

    /// Pauses a running playback.
    pub async fn pause(&self) -> Result<ControlOutcome> {
        surface(self.scheduler.dispatch(Command::Pause).await)
    }

    /// Resumes a paused playback.
    pub async fn resume(&self) -> Result<ControlOutcome> {
        surface(self.scheduler.dispatch(Command::Resume).await)
    }

    /// Stops the run.
    pub async fn stop(&self) -> Result<ControlOutcome> {
        surface(self.scheduler.dispatch(Command::Stop).await)
    }

    /// Returns to idle.
    pub async fn reset(&self) -> Result<ControlOutcome> {
        surface(self.scheduler.dispatch(Command::Reset).await)
    }

    /// One step forward while paused.
    pub async fn step_forward(&self) -> Result<ControlOutcome> {
        surface(self.scheduler.dispatch(Command::StepForward).await)
    }

    /// One step back while paused or completed.
    pub async fn step_back(&self) -> Result<ControlOutcome> {
        surface(self.scheduler.dispatch(Command::StepBack).await)
    }

    /// Jumps to `index` while paused or completed.
    pub async fn seek(&self, index: usize) -> Result<ControlOutcome> {
        surface(self.scheduler.dispatch(Command::Seek(index)).await)
    }

    /// Changes the delay between steps. Allowed at any time.
    pub async fn set_speed(&self, speed_ms: u64) -> Result<ControlOutcome> {
        self.config.check_speed(speed_ms)?;
        surface(self.scheduler.dispatch(Command::SetSpeed(speed_ms)).await)
    }
}

impl Default for ControlSurface {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
