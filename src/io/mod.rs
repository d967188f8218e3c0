//! Persistence of configuration and run history

pub mod config;
