//! Core services for planning, executing, and recording backup runs

pub mod execute;
pub mod format;
pub mod history;
pub mod orchestrator;
pub mod plan;
pub mod space;
