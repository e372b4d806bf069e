//! Playback state machine.
//!
//! [`PlaybackState`] is the pure half of the playback scheduler: every
//! transition is a synchronous method that either succeeds or fails with
//! [`VizError::IllegalTransition`]. Timers live in
//! [`crate::scheduler::PlaybackScheduler`], which only ever talks to the state
//! through these methods.
//!
//! ```text
//! idle ──start──> running ──pause──> paused ──resume──> running
//!                    │                  │
//!                    └──(last step)──> completed <──step_forward──┘
//! running | paused | completed ──stop──> cancelled
//! any non-idle ──reset──> idle
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::algorithm::AlgorithmId;
use crate::error::{Result, VizError};
use crate::step::{Step, StepSequence};

// ============================================================================
// PlaybackStatus
// ============================================================================

/// Status of a playback session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    /// Nothing is playing.
    #[default]
    Idle,
    /// A timer is advancing the cursor.
    Running,
    /// Cursor frozen, run still live.
    Paused,
    /// Cursor reached the last step.
    Completed,
    /// The run was stopped.
    Cancelled,
}

impl PlaybackStatus {
    /// Returns `true` while a run is in progress (`Running` or `Paused`).
    ///
    /// The algorithm input cannot be edited while a run is live.
    ///
    /// # Examples
    ///
    /// ```
    /// use algoviz_engine::PlaybackStatus;
    ///
    /// assert!(PlaybackStatus::Paused.is_live());
    /// assert!(!PlaybackStatus::Completed.is_live());
    /// ```
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    /// Returns `true` if the run is over (`Completed` or `Cancelled`).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns `true` if a new run may start from this status.
    #[must_use]
    pub const fn accepts_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Completed | Self::Cancelled)
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ControlAction
// ============================================================================

/// A status-guarded playback transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "index", rename_all = "snake_case")]
pub enum ControlAction {
    /// Begin playing the loaded sequence.
    Start,
    /// Freeze the cursor.
    Pause,
    /// Continue from the frozen cursor.
    Resume,
    /// Cancel the run and drop the sequence.
    Stop,
    /// Return to idle.
    Reset,
    /// Move one step forward while paused.
    StepForward,
    /// Move one step back while paused or completed.
    StepBack,
    /// Jump to a step while paused or completed.
    Seek(usize),
}

impl ControlAction {
    /// Status this action would lead to, for error messages.
    const fn target(self) -> PlaybackStatus {
        match self {
            Self::Start | Self::Resume => PlaybackStatus::Running,
            Self::Pause | Self::StepForward | Self::StepBack | Self::Seek(_) => {
                PlaybackStatus::Paused
            }
            Self::Stop => PlaybackStatus::Cancelled,
            Self::Reset => PlaybackStatus::Idle,
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Pause => f.write_str("pause"),
            Self::Resume => f.write_str("resume"),
            Self::Stop => f.write_str("stop"),
            Self::Reset => f.write_str("reset"),
            Self::StepForward => f.write_str("step_forward"),
            Self::StepBack => f.write_str("step_back"),
            Self::Seek(index) => write!(f, "seek({index})"),
        }
    }
}

// ============================================================================
// Advance
// ============================================================================

/// Result of moving the cursor forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The cursor moved to this index and more steps remain.
    Stepped(usize),
    /// The cursor moved to the last step (`None` for an empty sequence) and
    /// the run completed.
    Completed(Option<usize>),
    /// The cursor was already on the last step, so the run completed without
    /// moving.
    Settled(usize),
    /// Nothing happened: the timer belonged to an older run or playback is
    /// not running.
    Stale,
}

// ============================================================================
// PlaybackSnapshot
// ============================================================================

/// Read-only view of a [`PlaybackState`] for status endpoints and events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    /// Current status.
    pub status: PlaybackStatus,
    /// Index of the step on screen, `None` before the first step.
    pub cursor: Option<usize>,
    /// Delay between steps in milliseconds.
    pub speed_ms: u64,
    /// Current generation token.
    pub generation: u64,
    /// Length of the loaded sequence, zero when none is loaded.
    pub total_steps: usize,
    /// Algorithm of the loaded sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<AlgorithmId>,
}

// ============================================================================
// PlaybackState
// ============================================================================

/// Cursor, status, speed and generation token of one playback session.
///
/// The generation token changes whenever a pending timer must be invalidated
/// (start, pause, resume, stop, reset). A timer carries the generation it was
/// armed with and [`advance`](Self::advance) ignores it once that no longer
/// matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    cursor: Option<usize>,
    status: PlaybackStatus,
    speed_ms: u64,
    generation: u64,
    sequence: Option<StepSequence>,
}

impl PlaybackState {
    /// Creates an idle state with nothing loaded.
    ///
    /// A zero speed is raised to one millisecond.
    #[must_use]
    pub fn new(speed_ms: u64) -> Self {
        Self {
            cursor: None,
            status: PlaybackStatus::Idle,
            speed_ms: speed_ms.max(1),
            generation: 0,
            sequence: None,
        }
    }

    /// Creates an idle state with `sequence` loaded and ready to start.
    ///
    /// # Examples
    ///
    /// ```
    /// use algoviz_engine::{record_steps, AlgorithmInput, PlaybackState, PlaybackStatus, RecordOptions};
    ///
    /// let steps = record_steps(&AlgorithmInput::Numbers(vec![2, 1]), "bubble_sort", &RecordOptions::default()).unwrap();
    /// let mut playback = PlaybackState::with_sequence(steps, 100);
    /// playback.start().unwrap();
    /// assert_eq!(playback.status(), PlaybackStatus::Running);
    /// assert_eq!(playback.cursor(), Some(0));
    /// ```
    #[must_use]
    pub fn with_sequence(sequence: StepSequence, speed_ms: u64) -> Self {
        let mut state = Self::new(speed_ms);
        state.sequence = Some(sequence);
        state
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Index of the step on screen.
    #[must_use]
    pub const fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Delay between steps in milliseconds.
    #[must_use]
    pub const fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    /// Current generation token.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Loaded sequence, if any.
    #[must_use]
    pub const fn sequence(&self) -> Option<&StepSequence> {
        self.sequence.as_ref()
    }

    /// Step under the cursor.
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        let cursor = self.cursor?;
        self.sequence.as_ref()?.get(cursor)
    }

    fn total_steps(&self) -> usize {
        self.sequence.as_ref().map_or(0, StepSequence::len)
    }

    /// Read-only view for status reporting.
    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status,
            cursor: self.cursor,
            speed_ms: self.speed_ms,
            generation: self.generation,
            total_steps: self.total_steps(),
            algorithm: self.sequence.as_ref().map(StepSequence::algorithm),
        }
    }

    /// Returns `true` if `action` is valid right now.
    ///
    /// Every transition method checks this first and fails with
    /// `IllegalTransition` when it returns `false`.
    #[must_use]
    pub fn allows(&self, action: ControlAction) -> bool {
        let total = self.total_steps();
        match action {
            ControlAction::Start => self.status.accepts_start() && self.sequence.is_some(),
            ControlAction::Pause => self.status == PlaybackStatus::Running,
            ControlAction::Resume => self.status == PlaybackStatus::Paused,
            ControlAction::Stop => matches!(
                self.status,
                PlaybackStatus::Running | PlaybackStatus::Paused | PlaybackStatus::Completed
            ),
            ControlAction::Reset => self.status != PlaybackStatus::Idle,
            ControlAction::StepForward => {
                self.status == PlaybackStatus::Paused
                    && self.cursor.map_or(total > 0, |cursor| cursor + 1 < total)
            }
            ControlAction::StepBack => {
                matches!(
                    self.status,
                    PlaybackStatus::Paused | PlaybackStatus::Completed
                ) && self.cursor.is_some_and(|cursor| cursor > 0)
            }
            ControlAction::Seek(index) => {
                matches!(
                    self.status,
                    PlaybackStatus::Paused | PlaybackStatus::Completed
                ) && index < total
            }
        }
    }

    fn guard(&self, action: ControlAction) -> Result<()> {
        if self.allows(action) {
            Ok(())
        } else {
            Err(VizError::illegal_transition(self.status, action.target()))
        }
    }

    /// Replaces the loaded sequence. Not allowed while a run is live.
    ///
    /// Leaves the state idle with the cursor cleared.
    pub fn load(&mut self, sequence: StepSequence) -> Result<()> {
        if self.status.is_live() {
            return Err(VizError::illegal_transition(
                self.status,
                PlaybackStatus::Idle,
            ));
        }
        self.sequence = Some(sequence);
        self.cursor = None;
        self.status = PlaybackStatus::Idle;
        Ok(())
    }

    /// Starts playing the loaded sequence and shows its first step.
    ///
    /// An empty sequence goes straight to `Completed`.
    pub fn start(&mut self) -> Result<Advance> {
        self.guard(ControlAction::Start)?;
        self.generation += 1;
        self.cursor = None;
        self.status = PlaybackStatus::Running;
        Ok(self.step_once())
    }

    /// Freezes the cursor.
    pub fn pause(&mut self) -> Result<()> {
        self.guard(ControlAction::Pause)?;
        self.generation += 1;
        self.status = PlaybackStatus::Paused;
        Ok(())
    }

    /// Continues from the frozen cursor.
    pub fn resume(&mut self) -> Result<()> {
        self.guard(ControlAction::Resume)?;
        self.generation += 1;
        self.status = PlaybackStatus::Running;
        Ok(())
    }

    /// Cancels the run, clearing the cursor and dropping the sequence.
    pub fn stop(&mut self) -> Result<()> {
        self.guard(ControlAction::Stop)?;
        self.generation += 1;
        self.status = PlaybackStatus::Cancelled;
        self.cursor = None;
        self.sequence = None;
        Ok(())
    }

    /// Returns to idle, clearing the cursor and dropping the sequence.
    pub fn reset(&mut self) -> Result<()> {
        self.guard(ControlAction::Reset)?;
        self.generation += 1;
        self.status = PlaybackStatus::Idle;
        self.cursor = None;
        self.sequence = None;
        Ok(())
    }

    /// Timer callback: moves to the next step if `generation` is current and
    /// the state is running.
    pub fn advance(&mut self, generation: u64) -> Advance {
        if generation != self.generation || self.status != PlaybackStatus::Running {
            return Advance::Stale;
        }
        self.step_once()
    }

    /// Moves one step while paused. Reaching the last step completes the run.
    pub fn step_forward(&mut self) -> Result<Advance> {
        self.guard(ControlAction::StepForward)?;
        Ok(self.step_once())
    }

    /// Moves one step back. A completed run becomes paused.
    pub fn step_back(&mut self) -> Result<usize> {
        self.guard(ControlAction::StepBack)?;
        let index = self.cursor.map_or(0, |cursor| cursor - 1);
        self.cursor = Some(index);
        self.status = PlaybackStatus::Paused;
        Ok(index)
    }

    /// Jumps to `index`. Landing on the last step completes the run, any
    /// other index leaves it paused.
    pub fn seek(&mut self, index: usize) -> Result<usize> {
        self.guard(ControlAction::Seek(index))?;
        self.cursor = Some(index);
        self.status = if index + 1 == self.total_steps() {
            PlaybackStatus::Completed
        } else {
            PlaybackStatus::Paused
        };
        Ok(index)
    }

    /// Changes the delay for waits scheduled from now on.
    pub fn set_speed(&mut self, speed_ms: u64) -> Result<()> {
        if speed_ms == 0 {
            return Err(VizError::invalid_input(
                "speed must be a positive number of milliseconds",
                "Use a delay of at least 1 ms",
            ));
        }
        self.speed_ms = speed_ms;
        Ok(())
    }

    fn step_once(&mut self) -> Advance {
        let total = self.total_steps();
        if total == 0 {
            self.status = PlaybackStatus::Completed;
            return Advance::Completed(None);
        }
        if self.cursor == Some(total - 1) {
            self.status = PlaybackStatus::Completed;
            return Advance::Settled(total - 1);
        }
        let next = self.cursor.map_or(0, |cursor| cursor + 1).min(total - 1);
        self.cursor = Some(next);
        if next + 1 == total {
            self.status = PlaybackStatus::Completed;
            Advance::Completed(Some(next))
        } else {
            Advance::Stepped(next)
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SPEED_MS)
    }
}
