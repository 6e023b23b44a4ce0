//! Shared test utilities for latent-resolutions
//!
//! Integration tests run the real binary against an isolated temporary
//! catalog directory and config home.

pub mod assertions;
pub mod fixtures;
pub mod workspace;
