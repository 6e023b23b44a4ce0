//! Core functionality for the latent-resolutions tool.
//!
//! This module provides the resolution catalog, the usage store, latent allocation and
//! the node facade that ties them together, plus configuration, errors and output helpers.

pub mod catalog;
pub mod category;
pub mod command_init;
pub mod config;
pub mod dirs;
pub mod display_key;
pub mod error;
pub mod fs;
pub mod latent;
pub mod node;
pub mod output;
pub mod usage;

// === Error handling ===
// Core error types and result type used throughout the application
pub use error::{LatentCatalogError, Result};

// === Configuration ===
// Layered configuration passed explicitly to every component
pub use config::{
    BatchSettings, CatalogSettings, Config, DisplaySettings, LatentSettings, ResolutionLimits,
    UsageMarkSymbols, UsageSettings,
};

// === Resolution catalog ===
// Directory-backed preset catalog with modification-time cache
pub use catalog::{
    mark_keys, CacheToken, Catalog, CatalogStatistics, DuplicateReport, LoadStatus,
    ResolutionCatalog, ResolutionEntry,
};
pub use category::{Category, CategoryPattern};
pub use display_key::{decorate, format_display_key, strip_marks, MarkedKey, UsageMark};
pub use fs::{FileSystem, OsFileSystem};

// === Usage statistics ===
// Favorites, counters and recency list persisted as one JSON blob
pub use usage::{JsonFileStorage, UsageData, UsageStorage, UsageStore, UsageSummary};

// === Latent generation ===
pub use latent::{EmptyLatent, LatentAllocator, LatentShape, StandardLatentAllocator};
pub use node::{GenerationResult, GenerationState, LatentNode, LatentSource};

// === Command initialization ===
// Composition root shared by every CLI command
pub use command_init::{CliNode, CommandContext, GlobalOptions};

// === Output formatting ===
// Unified output formatting for consistent CLI presentation
pub use output::{print_error, print_info, print_section_header, print_success, print_warning};
