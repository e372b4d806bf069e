//! Timer-driven playback scheduler.
//!
//! Wraps a [`PlaybackState`] in a `tokio::sync::Mutex` and drives it with at
//! most one timer task per session. Every state change and every event it
//! publishes happens under that lock, and the timer re-checks the generation
//! token under the lock before touching anything, so a timer that outlives
//! its run can neither mutate state nor emit events.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::Result;
use crate::events::{EventBroadcaster, PlaybackEvent};
use crate::playback::{Advance, ControlAction, PlaybackSnapshot, PlaybackState, PlaybackStatus};
use crate::step::{Step, StepSequence};

// ============================================================================
// Command and ControlOutcome
// ============================================================================

/// A request to the scheduler.
#[derive(Debug, Clone)]
pub enum Command {
    /// Play the loaded sequence from the beginning.
    Start,
    /// Load a freshly recorded sequence and play it.
    StartWith(StepSequence),
    /// Freeze the cursor.
    Pause,
    /// Continue from the frozen cursor.
    Resume,
    /// Cancel the run.
    Stop,
    /// Return to idle.
    Reset,
    /// One step forward while paused.
    StepForward,
    /// One step back while paused or completed.
    StepBack,
    /// Jump to a step while paused or completed.
    Seek(usize),
    /// Change the delay for later waits.
    SetSpeed(u64),
}

impl Command {
    /// The status-guarded action behind this command, `None` for speed changes.
    #[must_use]
    pub const fn action(&self) -> Option<ControlAction> {
        match self {
            Self::Start | Self::StartWith(_) => Some(ControlAction::Start),
            Self::Pause => Some(ControlAction::Pause),
            Self::Resume => Some(ControlAction::Resume),
            Self::Stop => Some(ControlAction::Stop),
            Self::Reset => Some(ControlAction::Reset),
            Self::StepForward => Some(ControlAction::StepForward),
            Self::StepBack => Some(ControlAction::StepBack),
            Self::Seek(index) => Some(ControlAction::Seek(*index)),
            Self::SetSpeed(_) => None,
        }
    }
}

/// Whether a control request changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlOutcome {
    /// The request was carried out.
    Applied,
    /// The request was not valid for the current status and was dropped.
    Ignored,
}

impl ControlOutcome {
    /// Returns `true` for [`ControlOutcome::Applied`].
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

// ============================================================================
// PlaybackScheduler
// ============================================================================

#[derive(Debug)]
struct Shared {
    state: PlaybackState,
    timer: Option<JoinHandle<()>>,
}

impl Shared {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Replays a [`StepSequence`] on a cancellable timer.
///
/// Cloning yields another handle to the same session.
#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    shared: Arc<Mutex<Shared>>,
    events: EventBroadcaster,
}

impl PlaybackScheduler {
    /// Creates a scheduler around `state`, publishing on `events`.
    #[must_use]
    pub fn new(state: PlaybackState, events: EventBroadcaster) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared { state, timer: None })),
            events,
        }
    }

    /// Subscribes to playback events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// The broadcaster this scheduler publishes on.
    #[must_use]
    pub const fn events(&self) -> &EventBroadcaster {
        &self.events
    }

    /// Current status, cursor and speed.
    pub async fn snapshot(&self) -> PlaybackSnapshot {
        self.shared.lock().await.state.snapshot()
    }

    /// Current status.
    pub async fn status(&self) -> PlaybackStatus {
        self.shared.lock().await.state.status()
    }

    /// Step under the cursor.
    pub async fn current_step(&self) -> Option<Step> {
        self.shared.lock().await.state.current_step().cloned()
    }

    /// Snapshot and step under the cursor, read together.
    pub async fn view(&self) -> (PlaybackSnapshot, Option<Step>) {
        let shared = self.shared.lock().await;
        (shared.state.snapshot(), shared.state.current_step().cloned())
    }

    /// Starts playing the loaded sequence.
    pub async fn start(&self) -> Result<()> {
        self.execute(Command::Start).await
    }

    /// Loads `sequence` and starts playing it.
    pub async fn start_with(&self, sequence: StepSequence) -> Result<()> {
        self.execute(Command::StartWith(sequence)).await
    }

    /// Freezes the cursor and cancels the pending timer.
    pub async fn pause(&self) -> Result<()> {
        self.execute(Command::Pause).await
    }

    /// Re-arms the timer for the next step.
    pub async fn resume(&self) -> Result<()> {
        self.execute(Command::Resume).await
    }

    /// Cancels the pending timer and discards the sequence.
    pub async fn stop(&self) -> Result<()> {
        self.execute(Command::Stop).await
    }

    /// Cancels the pending timer and returns to idle.
    pub async fn reset(&self) -> Result<()> {
        self.execute(Command::Reset).await
    }

    /// Changes the delay used for waits scheduled from now on.
    pub async fn set_speed(&self, speed_ms: u64) -> Result<()> {
        self.execute(Command::SetSpeed(speed_ms)).await
    }

    /// Moves one step forward while paused.
    pub async fn step_forward(&self) -> Result<()> {
        self.execute(Command::StepForward).await
    }

    /// Moves one step back while paused or completed.
    pub async fn step_back(&self) -> Result<()> {
        self.execute(Command::StepBack).await
    }

    /// Jumps to `index` while paused or completed.
    pub async fn seek(&self, index: usize) -> Result<()> {
        self.execute(Command::Seek(index)).await
    }

    /// Applies `command` if the current status allows it, otherwise ignores it.
    ///
    /// The status check and the transition happen under one lock, so a timer
    /// completing the run in between cannot turn an allowed request into an
    /// illegal one.
    pub async fn dispatch(&self, command: Command) -> Result<ControlOutcome> {
        let mut shared = self.shared.lock().await;
        if let Some(action) = command.action() {
            let allowed = match &command {
                Command::StartWith(_) => shared.state.status().accepts_start(),
                _ => shared.state.allows(action),
            };
            if !allowed {
                debug!(
                    action = %action,
                    status = %shared.state.status(),
                    "Ignoring control action not valid for current status"
                );
                return Ok(ControlOutcome::Ignored);
            }
        }
        self.apply(&mut shared, command)?;
        Ok(ControlOutcome::Applied)
    }

    async fn execute(&self, command: Command) -> Result<()> {
        let mut shared = self.shared.lock().await;
        self.apply(&mut shared, command)
    }

    fn apply(&self, shared: &mut Shared, command: Command) -> Result<()> {
        match command {
            Command::Start => self.begin(shared),
            Command::StartWith(sequence) => {
                shared.cancel_timer();
                shared.state.load(sequence)?;
                self.begin(shared)
            }
            Command::Pause => {
                shared.state.pause()?;
                shared.cancel_timer();
                debug!(cursor = ?shared.state.cursor(), "Playback paused");
                self.events.send(PlaybackEvent::paused(shared.state.cursor()));
                Ok(())
            }
            Command::Resume => {
                shared.state.resume()?;
                debug!(cursor = ?shared.state.cursor(), "Playback resumed");
                self.events.send(PlaybackEvent::resumed(shared.state.cursor()));
                self.arm(shared);
                Ok(())
            }
            Command::Stop => {
                let cursor = shared.state.cursor();
                shared.state.stop()?;
                shared.cancel_timer();
                info!(cursor = ?cursor, "Playback cancelled");
                self.events.send(PlaybackEvent::cancelled(cursor));
                Ok(())
            }
            Command::Reset => {
                shared.state.reset()?;
                shared.cancel_timer();
                info!("Playback reset");
                self.events.send(PlaybackEvent::Reset);
                Ok(())
            }
            Command::StepForward => {
                let advance = shared.state.step_forward()?;
                publish(&self.events, &shared.state, advance);
                Ok(())
            }
            Command::StepBack => {
                let index = shared.state.step_back()?;
                self.publish_seek(&shared.state, index);
                Ok(())
            }
            Command::Seek(index) => {
                let before = shared.state.status();
                shared.state.seek(index)?;
                self.publish_seek(&shared.state, index);
                if before != PlaybackStatus::Completed
                    && shared.state.status() == PlaybackStatus::Completed
                {
                    publish(&self.events, &shared.state, Advance::Settled(index));
                }
                Ok(())
            }
            Command::SetSpeed(speed_ms) => {
                shared.state.set_speed(speed_ms)?;
                debug!(speed_ms, "Playback speed changed");
                self.events.send(PlaybackEvent::speed_changed(speed_ms));
                Ok(())
            }
        }
    }

    fn begin(&self, shared: &mut Shared) -> Result<()> {
        shared.cancel_timer();
        let advance = shared.state.start()?;

        if let Some(sequence) = shared.state.sequence() {
            info!(
                algorithm = %sequence.algorithm(),
                steps = sequence.len(),
                speed_ms = shared.state.speed_ms(),
                generation = shared.state.generation(),
                "Playback started"
            );
            self.events.send(PlaybackEvent::started(
                sequence.algorithm(),
                sequence.len(),
                shared.state.speed_ms(),
                shared.state.generation(),
            ));
        }
        publish(&self.events, &shared.state, advance);

        if shared.state.status() == PlaybackStatus::Running {
            self.arm(shared);
        }
        Ok(())
    }

    /// Spawns the single timer task for the current generation.
    fn arm(&self, shared: &mut Shared) {
        shared.cancel_timer();
        let generation = shared.state.generation();
        let delay = shared.state.speed_ms();
        shared.timer = Some(tokio::spawn(drive(
            Arc::clone(&self.shared),
            self.events.clone(),
            generation,
            delay,
        )));
    }

    fn publish_seek(&self, state: &PlaybackState, index: usize) {
        if let Some(sequence) = state.sequence() {
            if let Some(step) = sequence.get(index) {
                debug!(cursor = index, "Playback cursor moved");
                self.events
                    .send(PlaybackEvent::seeked(step, sequence.len()));
            }
        }
    }
}

/// Publishes the events for a cursor move.
fn publish(events: &EventBroadcaster, state: &PlaybackState, advance: Advance) {
    let Some(sequence) = state.sequence() else {
        return;
    };
    match advance {
        Advance::Stepped(index) => {
            if let Some(step) = sequence.get(index) {
                debug!(cursor = index, kind = %step.kind, "Step advanced");
                events.send(PlaybackEvent::step_advanced(step, sequence.len()));
            }
        }
        Advance::Completed(cursor) => {
            if let Some(step) = cursor.and_then(|index| sequence.get(index)) {
                events.send(PlaybackEvent::step_advanced(step, sequence.len()));
            }
            info!(steps = sequence.len(), "Playback completed");
            events.send(PlaybackEvent::completed(
                cursor,
                sequence.len(),
                sequence.final_counters(),
            ));
        }
        Advance::Settled(index) => {
            info!(steps = sequence.len(), "Playback completed");
            events.send(PlaybackEvent::completed(
                Some(index),
                sequence.len(),
                sequence.final_counters(),
            ));
        }
        Advance::Stale => {}
    }
}

/// Timer loop for one generation.
///
/// Each wait uses the speed in effect when it was scheduled.
async fn drive(
    shared: Arc<Mutex<Shared>>,
    events: EventBroadcaster,
    generation: u64,
    mut delay_ms: u64,
) {
    loop {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        let mut guard = shared.lock().await;
        let advance = guard.state.advance(generation);
        publish(&events, &guard.state, advance);
        match advance {
            Advance::Stepped(_) => delay_ms = guard.state.speed_ms(),
            Advance::Completed(_) | Advance::Settled(_) => {
                guard.timer = None;
                return;
            }
            Advance::Stale => return,
        }
    }
}
