//! Centralized initialization shared by every command.
//!
//! [`CommandContext`] is the composition root: it builds the configuration once, opens the
//! catalog and the usage store, and lends them to a [`LatentNode`] on demand.
//!
//! # Initialization Steps
//! 1. **Configuration**: defaults, then the config file, then environment overrides
//! 2. **CLI overrides**: `--catalog-dir` replaces the configured directory
//! 3. **Validation**: inconsistent settings are logged, not fatal
//! 4. **Catalog and usage store**: opened against the resolved directory

use crate::core::{
    catalog::ResolutionCatalog,
    config::Config,
    error::Result,
    latent::StandardLatentAllocator,
    node::LatentNode,
    usage::{JsonFileStorage, UsageStore},
};
use std::path::PathBuf;

/// Options shared by all subcommands
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config_path: Option<PathBuf>,
    pub catalog_dir: Option<PathBuf>,
}

pub type CliNode<'a> = LatentNode<'a, ResolutionCatalog, JsonFileStorage, StandardLatentAllocator>;

pub struct CommandContext {
    pub config: Config,
    pub catalog: ResolutionCatalog,
    pub usage: UsageStore<JsonFileStorage>,
}

impl CommandContext {
    pub fn initialize(options: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load(options.config_path.as_deref());
        if let Some(dir) = &options.catalog_dir {
            config.catalog_settings.directory = Some(dir.clone());
        }

        if let Err(e) = config.validate() {
            log::warn!("{e}");
        }

        let directory = config.catalog_directory()?;
        let stats_path = directory.join(&config.usage_settings.stats_file);
        log::debug!(
            "Using catalog directory {} and usage stats {}",
            directory.display(),
            stats_path.display()
        );

        let catalog = ResolutionCatalog::open(&directory, &config);
        let usage = UsageStore::new(
            JsonFileStorage::new(stats_path),
            config.usage_settings.recent_capacity,
        );

        Ok(Self {
            config,
            catalog,
            usage,
        })
    }

    /// Borrow the catalog and usage store as a node
    pub fn node(&mut self) -> CliNode<'_> {
        let allocator = StandardLatentAllocator::from_settings(&self.config.latent_settings);
        LatentNode::new(&mut self.catalog, &mut self.usage, allocator, &self.config)
    }
}
