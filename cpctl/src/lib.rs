//! cpctl library
//!
//! Client for the deployment control-plane API: deployment and revision CRUD,
//! listener listing, and a bounded revision poller.

pub mod app;
pub mod config;
pub mod errors;
pub mod http;
pub mod logs;
pub mod utils;
pub mod wait;

pub use control_plane_api as models;
