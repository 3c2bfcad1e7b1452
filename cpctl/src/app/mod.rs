//! Deployment lifecycle runner

pub mod options;
pub mod run;
