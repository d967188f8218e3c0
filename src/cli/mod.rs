//! Command line interface for the `nasbak` binary

pub mod args;
pub mod interrupt;
pub mod output;
