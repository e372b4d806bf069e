//! algoviz CLI
//!
//! Records an algorithm and plays it back in the terminal, or serves the
//! session over HTTP/WebSocket for a browser front end.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use algoviz_engine::events::StepPayload;
use algoviz_engine::{
    record, ContainerState, ControlSurface, EngineConfig, PlaybackEvent, PlaybackStatus,
    RenderTag, RenderTags,
};
use algoviz_report::Transcript;
use algoviz_server::{create_router, AppState};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

/// Default port for the HTTP API server.
const DEFAULT_PORT: u16 = 3000;

/// algoviz - step-by-step algorithm visualizer
///
/// Runs a sorting algorithm, a graph traversal or a stack/queue script and
/// shows every comparison, swap, visit, push and pop as it happens.
#[derive(Parser, Debug)]
#[command(name = "algoviz")]
#[command(version, about, long_about = None)]
struct Args {
    /// Algorithm id: bubble_sort, selection_sort, insertion_sort, bfs, dfs, stack, queue
    #[arg(value_name = "ALGORITHM")]
    algorithm: String,

    /// Custom input, e.g. "5, 3, 1", "0-1, 0-2" or "push A, push B, pop"
    #[arg(short, long, value_name = "TEXT")]
    input: Option<String>,

    /// Start node for bfs/dfs (default: smallest node)
    #[arg(short, long, value_name = "NODE")]
    start: Option<usize>,

    /// Delay between steps in milliseconds
    #[arg(long, value_name = "MS")]
    speed: Option<u64>,

    /// Path to configuration file (default: algoviz.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Write Markdown and JSON transcripts into this directory
    #[arg(short, long, value_name = "DIR")]
    report_dir: Option<String>,

    /// Print events as JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// Serve the session over HTTP and WebSocket instead of playing it here
    #[arg(long)]
    serve: bool,

    /// Port for --serve
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = ?args.config, "Config file");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(speed) = args.speed {
        config.check_speed(speed)?;
        config.default_speed_ms = speed;
    }

    let control = Arc::new(ControlSurface::new(config));
    control.set_algorithm_by_name(&args.algorithm).await?;
    if let Some(text) = &args.input {
        control.set_custom_input(text).await?;
    }
    if let Some(node) = args.start {
        control.set_start_node(node).await?;
    }

    if args.serve {
        return serve(control, args.port).await;
    }

    let status = play(&control, args.json).await?;

    if let Some(dir) = &args.report_dir {
        write_transcripts(&control, status, Path::new(dir)).await?;
    }
    Ok(())
}

fn load_config(config_path: Option<&str>) -> anyhow::Result<EngineConfig> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Ok(EngineConfig::load_from_file(path)?)
        }
        None => Ok(EngineConfig::load_from_dir(&std::env::current_dir()?)?),
    }
}

/// Serves the session until Ctrl+C.
async fn serve(control: Arc<ControlSurface>, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = ([127, 0, 0, 1], port).into();
    let router = create_router(AppState::with_control(control));

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port"
        )
    })?;

    println!("algoviz server running on http://{addr}");
    println!("Event stream: ws://{addr}/ws");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received Ctrl+C, shutting down");
        })
        .await?;
    Ok(())
}

/// Plays the run in the terminal and returns how it ended.
async fn play(control: &ControlSurface, json: bool) -> anyhow::Result<PlaybackStatus> {
    let mut events = control.subscribe();
    if !control.start().await?.is_applied() {
        anyhow::bail!("Playback could not start");
    }

    loop {
        tokio::select! {
            Ok(()) = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, stopping playback");
                control.stop().await?;
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        print_event(&event, json)?;
                        match event {
                            PlaybackEvent::Completed(_) => return Ok(PlaybackStatus::Completed),
                            PlaybackEvent::Cancelled(_) => return Ok(PlaybackStatus::Cancelled),
                            _ => {}
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "Terminal output fell behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Ok(control.snapshot().await.playback.status);
                    }
                }
            }
        }
    }
}

fn print_event(event: &PlaybackEvent, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    match event {
        PlaybackEvent::Started(payload) => {
            println!(
                "{} ({} steps, {} ms per step)",
                payload.algorithm.display_name(),
                payload.total_steps,
                payload.speed_ms
            );
            println!();
        }
        PlaybackEvent::StepAdvanced(payload) | PlaybackEvent::Seeked(payload) => {
            println!("{}", format_step(payload));
        }
        PlaybackEvent::Completed(payload) => {
            println!();
            let counters = payload
                .counters
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>()
                .join(", ");
            println!("Completed after {} steps. {counters}", payload.total_steps);
        }
        PlaybackEvent::Cancelled(_) => println!("Stopped."),
        _ => {}
    }
    Ok(())
}

/// One terminal line: position, kind, narrative, then the tagged container.
fn format_step(payload: &StepPayload) -> String {
    let step = &payload.step;
    format!(
        "[{:>3}/{}] {:<11} {:<48} {}",
        payload.cursor + 1,
        payload.total_steps,
        step.kind.to_string(),
        step.narrative,
        format_state(&step.container_state_after, &payload.tags)
    )
}

fn mark(text: &str, tag: RenderTag) -> String {
    match tag {
        RenderTag::Compared => format!("({text})"),
        RenderTag::Swapped => format!("<{text}>"),
        RenderTag::Sorted => format!("{text}."),
        RenderTag::Current | RenderTag::Highlighted => format!("*{text}*"),
        RenderTag::Visited | RenderTag::Frontier | RenderTag::Default => text.to_string(),
    }
}

fn format_state(state: &ContainerState, tags: &RenderTags) -> String {
    match state {
        ContainerState::Array { values, .. } => {
            let cells = values
                .iter()
                .enumerate()
                .map(|(i, value)| mark(&value.to_string(), tags.tag(i)))
                .collect::<Vec<_>>();
            format!("[{}]", cells.join(" "))
        }
        ContainerState::Traversal { visited, frontier } => {
            let join = |nodes: &[usize]| {
                nodes
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            format!("visited [{}] frontier [{}]", join(visited), join(frontier))
        }
        ContainerState::Linear { items, .. } => {
            let cells = items
                .iter()
                .enumerate()
                .map(|(i, item)| mark(item, tags.tag(i)))
                .collect::<Vec<_>>();
            format!("[{}]", cells.join(" "))
        }
    }
}

async fn write_transcripts(
    control: &ControlSurface,
    status: PlaybackStatus,
    dir: &Path,
) -> anyhow::Result<()> {
    let algorithm = control.algorithm().await;
    let input = control.input().await;
    let options = control.options().await;

    let sequence = record(&input, algorithm, &options)?;
    let transcript = Transcript::builder()
        .sequence(sequence)
        .input(input)
        .start_node(options.start_node)
        .status(status)
        .build()?;

    let (md_path, json_path): (PathBuf, PathBuf) = transcript.write_to_dir(dir)?;
    println!();
    println!("Transcripts written:");
    println!("  Markdown: {}", md_path.display());
    println!("  JSON: {}", json_path.display());
    Ok(())
}
