//! Latent Resolutions - a configuration-driven resolution catalog for image pipelines.
//!
//! This library loads resolution presets from a directory of JSON files, keeps them cached
//! until a source changes, tracks favorites and usage, and turns a selected resolution
//! into an empty latent shape with a fallback that never fails.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - Resolution catalog loading, caching, sorting and statistics
//! - Usage statistics, favorites and usage marks
//! - Latent allocation and the node facade
//! - Configuration, error handling and output helpers

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    // Catalog
    Catalog,
    CatalogStatistics,
    Category,
    // Configuration
    Config,
    EmptyLatent,
    GenerationResult,
    // Error handling
    LatentCatalogError,
    LatentAllocator,
    // Node facade
    LatentNode,
    LatentShape,
    LatentSource,
    MarkedKey,
    ResolutionCatalog,
    ResolutionEntry,
    Result,
    StandardLatentAllocator,
    UsageMark,
    // Usage statistics
    UsageStore,
};
