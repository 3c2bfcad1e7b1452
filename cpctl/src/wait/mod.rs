//! Waiting on asynchronous control-plane work

pub mod poller;
