//! Isolated workspace management for integration tests
//!
//! Each [`TestWorkspace`] owns a temporary directory holding a catalog
//! directory and a config home, so tests never touch the user's files.

#![allow(dead_code)]

use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// The TempDir must be kept alive for the duration of the test.
pub struct TestWorkspace {
    pub temp_dir: TempDir,
    pub catalog_dir: PathBuf,
    pub config_home: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let catalog_dir = temp_dir.path().join("resolutions");
        let config_home = temp_dir.path().join("config");
        fs::create_dir_all(&catalog_dir)?;
        fs::create_dir_all(config_home.join("latent-resolutions"))?;
        Ok(Self {
            temp_dir,
            catalog_dir,
            config_home,
        })
    }

    pub fn catalog_dir(&self) -> &Path {
        &self.catalog_dir
    }

    /// Write a preset file from `(width, height)` pairs
    pub fn write_preset(&self, name: &str, sizes: &[(u32, u32)]) -> anyhow::Result<PathBuf> {
        let records: Vec<_> = sizes
            .iter()
            .map(|(w, h)| serde_json::json!({ "width": w, "height": h }))
            .collect();
        self.write_raw(name, &serde_json::to_string_pretty(&records)?)
    }

    /// Write arbitrary content into the catalog directory
    pub fn write_raw(&self, name: &str, content: &str) -> anyhow::Result<PathBuf> {
        let path = self.catalog_dir.join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Push a file's modification time into the future
    pub fn touch(&self, name: &str, seconds_ahead: u64) -> anyhow::Result<()> {
        let later = SystemTime::now() + Duration::from_secs(seconds_ahead);
        fs::File::options()
            .write(true)
            .open(self.catalog_dir.join(name))?
            .set_modified(later)?;
        Ok(())
    }

    /// Write `config.json` into the isolated config home
    pub fn write_config(&self, json: &str) -> anyhow::Result<()> {
        fs::write(
            self.config_home.join("latent-resolutions").join("config.json"),
            json,
        )?;
        Ok(())
    }

    pub fn usage_stats(&self) -> anyhow::Result<serde_json::Value> {
        let content = fs::read_to_string(self.catalog_dir.join("usage_stats.json"))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Binary invocation pointed at this workspace
    pub fn cmd(&self) -> anyhow::Result<Command> {
        let mut cmd = Command::cargo_bin("latent-resolutions")?;
        cmd.env("XDG_CONFIG_HOME", &self.config_home)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .arg("--catalog-dir")
            .arg(&self.catalog_dir);
        Ok(cmd)
    }

    /// Run `generate --json` and parse the result
    pub fn generate_json(&self, resolution: &str, batch_size: u32) -> anyhow::Result<serde_json::Value> {
        let output = self
            .cmd()?
            .args(["generate", resolution, "--batch-size"])
            .arg(batch_size.to_string())
            .arg("--json")
            .output()?;
        anyhow::ensure!(output.status.success(), "generate exited with {}", output.status);
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}
