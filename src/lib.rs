//! # fanout-relay
//!
//! Real-time WebSocket relay. Producer ("game") clients stream messages in;
//! every message is fanned out verbatim to all connected consumer ("web")
//! clients. A small HTTP endpoint serves the landing page, static assets,
//! and a liveness report.
//!
//! ## Architecture
//!
//! ```text
//! Producers (WS :GAME_PORT)      Consumers (WS :WS_PORT)      HTTP (:WEB_PORT)
//!     │                               ▲                          │
//!     ├── run_producer (ws/)          ├── run_consumer (ws/)     ├── /health (api/)
//!     │                               │                          │
//!     ├── BroadcastRelay (domain/) ───┘                          ├── LivenessReporter (service/)
//!     │                                                          │
//!     └────────────── ConnectionRegistry (domain/) ◀─────────────┘
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod ws;
