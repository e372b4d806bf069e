//! Playback events and their broadcaster.
//!
//! The scheduler publishes a [`PlaybackEvent`] for every transition. UI
//! adapters subscribe and redraw; nothing in the engine waits on them.
//!
//! # Event Types
//!
//! - `connected` - Sent by adapters to a new subscriber, carries a snapshot
//! - `started` - A run began
//! - `step_advanced` - The cursor moved forward (timer or step button)
//! - `paused` / `resumed` - The timer was frozen or re-armed
//! - `seeked` - The cursor was moved by scrubbing
//! - `speed_changed` - New delay for waits scheduled from now on
//! - `completed` - The last step is on screen
//! - `cancelled` - The run was stopped; nothing follows for that run
//! - `reset` - Back to idle
//!
//! # Example
//!
//! ```
//! use algoviz_engine::events::{EventBroadcaster, PlaybackEvent};
//!
//! # async fn example() {
//! let broadcaster = EventBroadcaster::new(16);
//! let mut receiver = broadcaster.subscribe();
//!
//! broadcaster.send(PlaybackEvent::speed_changed(250));
//!
//! if let Ok(event) = receiver.recv().await {
//!     assert_eq!(event.event_name(), "speed_changed");
//! }
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::algorithm::AlgorithmId;
use crate::playback::PlaybackSnapshot;
use crate::projection::{project_step, RenderTags};
use crate::step::{Counters, Step};

// ============================================================================
// Event Payloads
// ============================================================================

/// Payload for the `connected` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedPayload {
    /// The playback state at connection time.
    pub playback: PlaybackSnapshot,
}

/// Payload for the `started` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedPayload {
    /// Algorithm being played.
    pub algorithm: AlgorithmId,
    /// Number of recorded steps.
    pub total_steps: usize,
    /// Delay between steps at start time.
    pub speed_ms: u64,
    /// Generation token of the new run.
    pub generation: u64,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

/// Payload for the `step_advanced` and `seeked` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPayload {
    /// Index of the step now on screen.
    pub cursor: usize,
    /// Number of recorded steps.
    pub total_steps: usize,
    /// The step itself.
    pub step: Step,
    /// Display tags for the step.
    pub tags: RenderTags,
}

/// Payload for the `paused`, `resumed` and `cancelled` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPayload {
    /// Cursor at the time of the transition.
    pub cursor: Option<usize>,
}

/// Payload for the `speed_changed` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedPayload {
    /// New delay between steps.
    pub speed_ms: u64,
}

/// Payload for the `completed` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedPayload {
    /// Final cursor, `None` for an empty sequence.
    pub cursor: Option<usize>,
    /// Number of recorded steps.
    pub total_steps: usize,
    /// Counter values of the last step.
    pub counters: Counters,
    /// When the run completed.
    pub finished_at: DateTime<Utc>,
}

// ============================================================================
// Event Enum
// ============================================================================

/// Playback event.
///
/// All events are serialized as JSON objects with "event" and "payload" fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Sent to a subscriber when it connects.
    Connected(ConnectedPayload),
    /// A run began.
    Started(StartedPayload),
    /// The cursor moved forward.
    StepAdvanced(StepPayload),
    /// Playback was frozen.
    Paused(CursorPayload),
    /// Playback continues.
    Resumed(CursorPayload),
    /// The cursor was moved by scrubbing.
    Seeked(StepPayload),
    /// The delay changed.
    SpeedChanged(SpeedPayload),
    /// The last step is on screen.
    Completed(CompletedPayload),
    /// The run was stopped.
    Cancelled(CursorPayload),
    /// Back to idle.
    Reset,
}

impl PlaybackEvent {
    /// Creates a `Connected` event.
    #[must_use]
    pub const fn connected(playback: PlaybackSnapshot) -> Self {
        Self::Connected(ConnectedPayload { playback })
    }

    /// Creates a `Started` event stamped with the current time.
    #[must_use]
    pub fn started(algorithm: AlgorithmId, total_steps: usize, speed_ms: u64, generation: u64) -> Self {
        Self::Started(StartedPayload {
            algorithm,
            total_steps,
            speed_ms,
            generation,
            started_at: Utc::now(),
        })
    }

    /// Creates a `StepAdvanced` event, projecting the step's tags.
    #[must_use]
    pub fn step_advanced(step: &Step, total_steps: usize) -> Self {
        Self::StepAdvanced(step_payload(step, total_steps))
    }

    /// Creates a `Seeked` event, projecting the step's tags.
    #[must_use]
    pub fn seeked(step: &Step, total_steps: usize) -> Self {
        Self::Seeked(step_payload(step, total_steps))
    }

    /// Creates a `Paused` event.
    #[must_use]
    pub const fn paused(cursor: Option<usize>) -> Self {
        Self::Paused(CursorPayload { cursor })
    }

    /// Creates a `Resumed` event.
    #[must_use]
    pub const fn resumed(cursor: Option<usize>) -> Self {
        Self::Resumed(CursorPayload { cursor })
    }

    /// Creates a `SpeedChanged` event.
    #[must_use]
    pub const fn speed_changed(speed_ms: u64) -> Self {
        Self::SpeedChanged(SpeedPayload { speed_ms })
    }

    /// Creates a `Completed` event stamped with the current time.
    #[must_use]
    pub fn completed(cursor: Option<usize>, total_steps: usize, counters: Counters) -> Self {
        Self::Completed(CompletedPayload {
            cursor,
            total_steps,
            counters,
            finished_at: Utc::now(),
        })
    }

    /// Creates a `Cancelled` event.
    #[must_use]
    pub const fn cancelled(cursor: Option<usize>) -> Self {
        Self::Cancelled(CursorPayload { cursor })
    }

    /// Returns the event name as a string.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Connected(_) => "connected",
            Self::Started(_) => "started",
            Self::StepAdvanced(_) => "step_advanced",
            Self::Paused(_) => "paused",
            Self::Resumed(_) => "resumed",
            Self::Seeked(_) => "seeked",
            Self::SpeedChanged(_) => "speed_changed",
            Self::Completed(_) => "completed",
            Self::Cancelled(_) => "cancelled",
            Self::Reset => "reset",
        }
    }
}

fn step_payload(step: &Step, total_steps: usize) -> StepPayload {
    StepPayload {
        cursor: step.index,
        total_steps,
        step: step.clone(),
        tags: project_step(step, Some(step.index)),
    }
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Fans playback events out to every subscriber.
///
/// Uses a tokio broadcast channel. Events are not kept for subscribers that
/// join later, and a subscriber that falls more than `capacity` events behind
/// gets a `Lagged` error.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<PlaybackEvent>,
}

impl EventBroadcaster {
    /// Creates a broadcaster buffering `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Creates a new subscriber.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.sender.subscribe()
    }

    /// Broadcasts an event and returns how many subscribers will see it.
    pub fn send(&self, event: PlaybackEvent) -> usize {
        // Err only means nobody is listening.
        self.sender.send(event).unwrap_or(0)
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(crate::config::EngineConfig::default().event_capacity)
    }
}
