//! Control-plane HTTP API

pub mod client;
pub mod deployments;
pub mod listeners;

pub use client::HttpClient;
