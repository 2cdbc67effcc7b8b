//! Core trait abstractions for the discovery pipeline.
//!
//! These traits define the seams applications implement to provide the
//! project registry, page fetching and event observation.

pub mod fetcher;
pub mod registry;
pub mod sink;
