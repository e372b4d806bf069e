//! Algoviz server
//!
//! Exposes one visualization session over HTTP (control actions, JSON) and a
//! WebSocket that streams playback events.

pub mod api;
pub mod websocket;

pub use api::{
    create_router, AlgorithmRequest, AppState, ControlResponse, ErrorResponse, InputRequest,
    SeekRequest, SpeedRequest, StartNodeRequest, TextInputRequest,
};
pub use websocket::{ws_handler, HEARTBEAT_INTERVAL, MAX_MISSED_PONGS};
