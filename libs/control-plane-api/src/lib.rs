//! Control-plane API models
//!
//! Request and response bodies for the `/v2` deployment control-plane API.

pub mod models;

pub use models::*;
