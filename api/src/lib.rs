//! Mempulse API - Real-time push layer for blockchain and mempool updates.
//!
//! Clients connect over WebSocket, say which topics they want and which
//! transaction or address to follow, and receive only the matching part of
//! each upstream change.
//!
//! # Components
//!
//! - [`config`]: Server configuration
//! - [`ws`]: Sessions, inbound handling and the broadcast dispatcher
//! - [`server`]: Router and server loop
//! - [`health`]: Health endpoint

pub mod config;
pub mod error;
pub mod health;
pub mod server;
pub mod state;
pub mod ws;

pub use config::{read_git_commit, ConfigError, ServerConfig};
pub use error::ApiError;
pub use server::{router, Server};
pub use state::AppState;
pub use ws::{Dispatcher, WsState};
