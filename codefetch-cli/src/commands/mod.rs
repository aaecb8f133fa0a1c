//! CLI command implementations.

pub mod config;
pub mod fetch;
pub mod forges;
pub mod resolve;
pub mod serve;
