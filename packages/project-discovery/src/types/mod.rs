//! Domain types for the discovery pipeline.

pub mod candidate;
pub mod config;
pub mod extraction;
pub mod location;
pub mod project;
