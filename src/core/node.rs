//! The empty-latent node: the single user-facing entry point.
//!
//! [`LatentNode`] wires a [`Catalog`], a [`UsageStore`] and a [`LatentAllocator`] together.
//! It hands the host a sorted, mark-decorated resolution list and turns a selection back
//! into a latent. Generation never fails from the caller's point of view:
//!
//! ```text
//! Idle -> Resolving -> Generating -> Done
//!             |             |
//!             +-------------+-> FallbackGenerating -> Done
//! ```
//!
//! 1. The selector is stripped of usage marks and looked up; the batch size is checked.
//! 2. On success usage is recorded (best-effort) and the latent is allocated.
//! 3. Any failure switches to the configured square fallback resolution.
//! 4. If that fails too, a hard-coded `[batch, 4, 128, 128]` latent is returned.

use crate::core::catalog::{mark_keys, Catalog, ResolutionEntry};
use crate::core::config::Config;
use crate::core::display_key::{strip_marks, MarkedKey};
use crate::core::error::{LatentCatalogError, Result};
use crate::core::latent::{EmptyLatent, LatentAllocator};
use crate::core::usage::{UsageStorage, UsageStore};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Resolving,
    Generating,
    FallbackGenerating,
    Done,
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            GenerationState::Idle => "idle",
            GenerationState::Resolving => "resolving",
            GenerationState::Generating => "generating",
            GenerationState::FallbackGenerating => "fallback-generating",
            GenerationState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Where the returned latent's dimensions came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LatentSource {
    Resolved { key: String, width: u32, height: u32 },
    Fallback { resolution: u32, reason: String },
    Minimal { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub latent: EmptyLatent,
    pub source: LatentSource,
}

impl GenerationResult {
    pub fn is_fallback(&self) -> bool {
        !matches!(self.source, LatentSource::Resolved { .. })
    }
}

pub struct LatentNode<'a, C: Catalog, S: UsageStorage, A: LatentAllocator> {
    catalog: &'a mut C,
    usage: &'a mut UsageStore<S>,
    allocator: A,
    config: &'a Config,
    state: GenerationState,
}

impl<'a, C: Catalog, S: UsageStorage, A: LatentAllocator> LatentNode<'a, C, S, A> {
    pub fn new(
        catalog: &'a mut C,
        usage: &'a mut UsageStore<S>,
        allocator: A,
        config: &'a Config,
    ) -> Self {
        Self {
            catalog,
            usage,
            allocator,
            config,
            state: GenerationState::Idle,
        }
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    pub fn usage(&self) -> &UsageStore<S> {
        &*self.usage
    }

    /// `(min, max, default)` batch sizes offered to the host
    pub fn batch_bounds(&self) -> (u32, u32, u32) {
        let batch = &self.config.batch_settings;
        (batch.min, batch.max, batch.default)
    }

    /// Sorted resolution keys for the host's selection list.
    pub fn available_resolutions(&mut self) -> Vec<MarkedKey> {
        self.catalog.load(false);
        mark_keys(
            self.catalog.sorted_keys(),
            self.usage,
            &self.config.display_settings,
        )
    }

    fn transition(&mut self, next: GenerationState) {
        log::debug!("Node state {} -> {}", self.state, next);
        self.state = next;
    }

    fn plain_key<'k>(&self, selector: &'k str) -> &'k str {
        strip_marks(selector, &self.config.display_settings.usage_marks)
    }

    /// Resolve a (possibly decorated) selector to a catalog entry.
    pub fn resolve(&mut self, selector: &str) -> Result<(String, ResolutionEntry)> {
        self.catalog.load(false);
        let key = self.plain_key(selector).to_string();
        match self.catalog.lookup(&key) {
            Some(entry) => Ok((key, entry.clone())),
            None => Err(LatentCatalogError::resolution_not_found(key)),
        }
    }

    /// Produce a latent for `selector`. Never fails.
    pub fn generate(&mut self, selector: &str, batch_size: u32) -> GenerationResult {
        self.transition(GenerationState::Resolving);

        let config = self.config;
        let batch = &config.batch_settings;
        let resolved = if batch.contains(batch_size) {
            self.resolve(selector)
        } else {
            Err(LatentCatalogError::batch_size_out_of_range(
                batch_size, batch.min, batch.max,
            ))
        };

        let (key, entry) = match resolved {
            Ok(found) => found,
            Err(e) => return self.generate_fallback(batch_size, e),
        };

        if let Err(e) = self.usage.record_usage(&key) {
            log::warn!("Could not record usage of '{key}': {e}");
        }

        self.transition(GenerationState::Generating);
        match self
            .allocator
            .allocate(entry.width, entry.height, batch_size)
        {
            Ok(latent) => {
                self.transition(GenerationState::Done);
                GenerationResult {
                    latent,
                    source: LatentSource::Resolved {
                        key,
                        width: entry.width,
                        height: entry.height,
                    },
                }
            }
            Err(e) => self.generate_fallback(batch_size, e),
        }
    }

    fn generate_fallback(&mut self, batch_size: u32, reason: LatentCatalogError) -> GenerationResult {
        self.transition(GenerationState::FallbackGenerating);

        let resolution = self.config.latent_settings.fallback_resolution;
        let batch_size = self.config.batch_settings.clamp(batch_size);
        log::warn!("{reason}; falling back to {resolution}x{resolution}");

        let result = match self.allocator.allocate(resolution, resolution, batch_size) {
            Ok(latent) => GenerationResult {
                latent,
                source: LatentSource::Fallback {
                    resolution,
                    reason: reason.to_string(),
                },
            },
            Err(e) => {
                log::error!("Fallback generation failed: {e}; using minimal latent");
                GenerationResult {
                    latent: EmptyLatent::minimal(batch_size),
                    source: LatentSource::Minimal {
                        reason: e.to_string(),
                    },
                }
            }
        };

        self.transition(GenerationState::Done);
        result
    }

    /// Mark a resolution as favorite. Returns whether anything changed.
    pub fn add_favorite(&mut self, selector: &str) -> Result<bool> {
        let (key, _) = self.resolve(selector)?;
        Ok(self.usage.add_favorite(&key))
    }

    pub fn remove_favorite(&mut self, selector: &str) -> Result<bool> {
        // Removal does not require the key to still exist in the catalog
        let key = self.plain_key(selector).to_string();
        Ok(self.usage.remove_favorite(&key))
    }
}
