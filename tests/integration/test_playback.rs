//! Integration tests for recording, playback and transcripts.
//!
//! These tests drive a full session through the control surface with a
//! paused clock, then check the event stream and the transcript built from
//! the finished run.

use std::time::Duration;

use algoviz_engine::{
    record, AlgorithmId, ControlOutcome, ControlSurface, EngineConfig, PlaybackEvent,
    PlaybackStatus, StepKind,
};
use algoviz_report::{json::JsonGenerator, MarkdownGenerator, Transcript};
use tokio::sync::broadcast::{self, error::TryRecvError};

fn fast_config() -> EngineConfig {
    EngineConfig {
        default_speed_ms: 10,
        ..EngineConfig::default()
    }
}

/// Receives events until the run completes or is cancelled.
async fn drain_run(receiver: &mut broadcast::Receiver<PlaybackEvent>) -> Vec<PlaybackEvent> {
    let mut events = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(60), receiver.recv())
            .await
            .expect("Timeout waiting for event")
            .expect("Event stream closed");
        let done = matches!(
            event,
            PlaybackEvent::Completed(_) | PlaybackEvent::Cancelled(_)
        );
        events.push(event);
        if done {
            return events;
        }
    }
}

// ============================================================================
// Full Runs
// ============================================================================

/// Tests that a sorting run emits started, every step in order, then completed.
#[tokio::test(start_paused = true)]
async fn test_bubble_sort_event_stream() {
    let surface = ControlSurface::new(fast_config());
    surface.set_custom_input("5, 3, 1").await.unwrap();
    let mut receiver = surface.subscribe();

    surface.start().await.unwrap();
    let events = drain_run(&mut receiver).await;

    let PlaybackEvent::Started(started) = &events[0] else {
        panic!("Expected Started first, got: {:?}", events[0]);
    };
    assert_eq!(started.algorithm, AlgorithmId::BubbleSort);
    assert_eq!(started.total_steps, 9);
    assert_eq!(started.speed_ms, 10);

    let cursors: Vec<usize> = events
        .iter()
        .filter_map(|event| match event {
            PlaybackEvent::StepAdvanced(payload) => Some(payload.cursor),
            _ => None,
        })
        .collect();
    assert_eq!(cursors, (0..9).collect::<Vec<_>>());

    let PlaybackEvent::Completed(completed) = events.last().unwrap() else {
        panic!("Expected Completed last");
    };
    assert_eq!(completed.cursor, Some(8));
    assert_eq!(completed.counters.get("swaps"), 3);
    assert_eq!(completed.counters.get("comparisons"), 3);
}

/// Tests that a DFS run visits exactly the nodes reachable from the start.
#[tokio::test(start_paused = true)]
async fn test_dfs_run_ignores_unreachable_nodes() {
    let surface = ControlSurface::new(fast_config());
    surface.set_algorithm(AlgorithmId::Dfs).await.unwrap();
    surface
        .set_custom_input("0-1, 0-2, 1-3, 4-5")
        .await
        .unwrap();
    surface.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    let snapshot = surface.snapshot().await;
    assert_eq!(snapshot.playback.status, PlaybackStatus::Completed);
    assert_eq!(snapshot.start_node, Some(0));

    let step = snapshot.current_step.unwrap();
    assert_eq!(step.container_state_after.visited(), Some(&[0, 1, 3, 2][..]));
    assert_eq!(step.counters.get("visited"), 4);
}

/// Tests that a stack underflow is shown as a no-op and the run still completes.
#[tokio::test(start_paused = true)]
async fn test_stack_underflow_is_part_of_the_run() {
    let surface = ControlSurface::new(fast_config());
    surface.set_algorithm(AlgorithmId::Stack).await.unwrap();
    surface
        .set_custom_input("push A, pop, pop")
        .await
        .unwrap();
    let mut receiver = surface.subscribe();

    surface.start().await.unwrap();
    let events = drain_run(&mut receiver).await;

    let steps: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            PlaybackEvent::StepAdvanced(payload) => Some(&payload.step),
            _ => None,
        })
        .collect();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0].kind, StepKind::Push);
    assert_eq!(steps[1].kind, StepKind::Pop);
    assert_eq!(steps[2].kind, StepKind::NoOp);
    assert_eq!(steps[2].narrative, "Stack underflow: nothing to pop");
    assert!(matches!(events.last(), Some(PlaybackEvent::Completed(_))));
}

// ============================================================================
// Interactive Control
// ============================================================================

/// Tests pausing, stepping and scrubbing, then resuming to the end.
#[tokio::test(start_paused = true)]
async fn test_pause_scrub_and_resume() {
    let surface = ControlSurface::new(fast_config());
    surface.set_custom_input("4, 3, 2, 1").await.unwrap();
    surface.start().await.unwrap();
    assert_eq!(surface.pause().await.unwrap(), ControlOutcome::Applied);

    let snapshot = surface.snapshot().await;
    assert_eq!(snapshot.playback.status, PlaybackStatus::Paused);
    assert_eq!(snapshot.playback.cursor, Some(0));
    let total = snapshot.playback.total_steps;

    // Paused time does not move the cursor.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(surface.snapshot().await.playback.cursor, Some(0));

    surface.step_forward().await.unwrap();
    surface.step_forward().await.unwrap();
    assert_eq!(surface.snapshot().await.playback.cursor, Some(2));

    surface.step_back().await.unwrap();
    assert_eq!(surface.snapshot().await.playback.cursor, Some(1));

    assert_eq!(
        surface.seek(total).await.unwrap(),
        ControlOutcome::Ignored
    );
    surface.seek(total - 2).await.unwrap();
    surface.resume().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    let snapshot = surface.snapshot().await;
    assert_eq!(snapshot.playback.status, PlaybackStatus::Completed);
    assert_eq!(snapshot.playback.cursor, Some(total - 1));
}

/// Tests that jumping to the last step finishes the run without replaying it.
#[tokio::test(start_paused = true)]
async fn test_seek_to_last_step_finishes_run() {
    let surface = ControlSurface::new(fast_config());
    surface.set_custom_input("3, 2, 1").await.unwrap();
    surface.start().await.unwrap();
    surface.pause().await.unwrap();
    let total = surface.snapshot().await.playback.total_steps;
    let mut receiver = surface.subscribe();

    surface.seek(total - 1).await.unwrap();
    let snapshot = surface.snapshot().await;
    assert_eq!(snapshot.playback.status, PlaybackStatus::Completed);
    assert_eq!(snapshot.playback.cursor, Some(total - 1));
    assert_eq!(surface.resume().await.unwrap(), ControlOutcome::Ignored);
    assert_eq!(
        surface.step_forward().await.unwrap(),
        ControlOutcome::Ignored
    );

    tokio::time::sleep(Duration::from_secs(1)).await;
    let names: Vec<_> = std::iter::from_fn(|| receiver.try_recv().ok())
        .map(|event| event.event_name())
        .collect();
    assert_eq!(names, vec!["seeked", "completed"]);
}

/// Tests that no events follow a stop, and that a new start begins afresh.
#[tokio::test(start_paused = true)]
async fn test_stop_then_restart_with_new_input() {
    let surface = ControlSurface::new(fast_config());
    let mut receiver = surface.subscribe();

    surface.start().await.unwrap();
    surface.stop().await.unwrap();
    let events = drain_run(&mut receiver).await;
    assert!(matches!(events.last(), Some(PlaybackEvent::Cancelled(_))));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(matches!(receiver.try_recv(), Err(TryRecvError::Empty)));

    let snapshot = surface.snapshot().await;
    assert_eq!(snapshot.playback.status, PlaybackStatus::Cancelled);
    assert_eq!(snapshot.playback.cursor, None);

    assert_eq!(
        surface.set_custom_input("2, 1").await.unwrap(),
        ControlOutcome::Applied
    );
    surface.start().await.unwrap();
    let events = drain_run(&mut receiver).await;
    let PlaybackEvent::Started(started) = &events[0] else {
        panic!("Expected Started first");
    };
    assert_eq!(started.total_steps, 4);
    assert!(matches!(events.last(), Some(PlaybackEvent::Completed(_))));
}

/// Tests that a speed change applies to the waits that follow it.
#[tokio::test(start_paused = true)]
async fn test_speed_change_mid_run() {
    let surface = ControlSurface::new(fast_config());
    surface.set_custom_input("3, 2, 1").await.unwrap();
    surface.start().await.unwrap();
    surface.set_speed(1_000).await.unwrap();

    // The wait already scheduled still uses the old speed.
    tokio::time::sleep(Duration::from_millis(15)).await;
    assert_eq!(surface.snapshot().await.playback.cursor, Some(1));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(surface.snapshot().await.playback.cursor, Some(1));

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(surface.snapshot().await.playback.cursor, Some(2));
}

// ============================================================================
// Transcripts
// ============================================================================

/// Tests building Markdown and JSON transcripts from a finished session.
#[tokio::test(start_paused = true)]
async fn test_transcript_from_finished_session() {
    let surface = ControlSurface::new(fast_config());
    surface
        .set_algorithm(AlgorithmId::InsertionSort)
        .await
        .unwrap();
    surface.set_custom_input("3, 1, 2").await.unwrap();
    surface.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    let status = surface.snapshot().await.playback.status;
    assert_eq!(status, PlaybackStatus::Completed);

    let input = surface.input().await;
    let options = surface.options().await;
    let sequence = record(&input, surface.algorithm().await, &options).unwrap();
    let transcript = Transcript::builder()
        .sequence(sequence)
        .input(input)
        .start_node(options.start_node)
        .status(status)
        .build()
        .unwrap();

    let markdown = MarkdownGenerator::new(&transcript).generate();
    assert!(markdown.starts_with("# Algorithm Transcript: Insertion Sort"));
    assert!(markdown.contains("| Status | completed |"));
    assert!(markdown.contains("| Input | 3, 1, 2 |"));

    let json = JsonGenerator::new(&transcript).generate().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["algorithm"], "insertion_sort");
    let last = value["steps"].as_array().unwrap().last().unwrap();
    assert_eq!(
        last["containerStateAfter"]["values"],
        serde_json::json!([1, 2, 3])
    );

    let dir = std::env::temp_dir().join("algoviz-integration-transcripts");
    let (md_path, json_path) = transcript.write_to_dir(&dir).unwrap();
    assert!(md_path.ends_with("algoviz-insertion_sort.md"));
    assert!(json_path.ends_with("algoviz-insertion_sort.json"));
    assert!(md_path.exists());
    assert!(json_path.exists());
    std::fs::remove_dir_all(&dir).unwrap();
}
