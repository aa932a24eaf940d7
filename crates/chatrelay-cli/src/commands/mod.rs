//! CLI commands

pub mod ask;
pub mod config;
pub mod serve;
