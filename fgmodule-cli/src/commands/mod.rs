//! CLI command implementations.

pub mod build;
pub mod catalog;
pub mod common;
pub mod version;
