//! Resolution catalog: preset discovery, validation, caching and sorted views.
//!
//! This module provides [`ResolutionCatalog`], the in-memory mapping from display key to
//! [`ResolutionEntry`], together with the loading and cache logic that keeps it in sync
//! with a directory of JSON preset files.
//!
//! # Public API
//! - [`Catalog`]: Capability trait used by the node facade
//! - [`ResolutionCatalog`]: Directory-backed implementation
//! - [`ResolutionEntry`], [`CatalogStatistics`], [`DuplicateReport`]: Data views
//!
//! # Loading
//! - Eligible sources are regular files with a configured extension, excluding the usage
//!   stats file. They are read in file-name order.
//! - A source that cannot be read, is not valid JSON or is not a JSON array is skipped.
//! - A record without a usable `width`/`height` pair, or outside the configured limits, is
//!   skipped. Nothing aborts the load; an empty catalog is a valid result.
//! - On key collision the later record wins and the collision is kept for statistics.
//!
//! # Cache Strategy
//! The catalog is valid while the `path -> modification time` map of eligible sources is
//! identical to the one observed at the last load. Adding, removing or touching a source
//! triggers a full rescan on the next access.

use crate::core::category::{category_rank, infer_category, Category};
use crate::core::config::{
    CatalogSettings, Config, DisplaySettings, ResolutionLimits, UsageMarkSymbols,
};
use crate::core::display_key::{format_display_key, strip_marks, MarkedKey};
use crate::core::error::{LatentCatalogError, Result};
use crate::core::fs::{FileSystem, OsFileSystem};
use crate::core::usage::{UsageStorage, UsageStore};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionEntry {
    pub width: u32,
    pub height: u32,
    pub category: Category,
    /// File name the entry was loaded from
    pub source_file: String,
}

impl ResolutionEntry {
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Modification times of every eligible source at the time of a scan
pub type CacheToken = BTreeMap<PathBuf, SystemTime>;

/// A display key that more than one record produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateReport {
    pub key: String,
    /// Source files in load order; the last one supplied the kept entry
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStatistics {
    pub total_count: usize,
    pub per_category: BTreeMap<Category, usize>,
    pub min_pixel_count: Option<u64>,
    pub max_pixel_count: Option<u64>,
    pub avg_pixel_count: Option<f64>,
    pub duplicates: Vec<DuplicateReport>,
}

/// Whether a call to [`Catalog::load`] rescanned the sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Cached,
    Reloaded,
}

/// Operations the node facade needs from a resolution catalog
pub trait Catalog {
    fn load(&mut self, force_reload: bool) -> LoadStatus;

    /// Display keys grouped by category order, then by ascending aspect ratio
    fn sorted_keys(&self) -> Vec<String>;

    /// Look up a plain or mark-decorated key
    fn lookup(&self, key: &str) -> Option<&ResolutionEntry>;

    fn statistics(&self) -> CatalogStatistics;

    /// Entries whose category matches `name` case-insensitively; `None` or an empty name
    /// returns everything
    fn filter_by_category(&self, name: Option<&str>) -> Vec<(&str, &ResolutionEntry)>;
}

pub struct ResolutionCatalog<F: FileSystem = OsFileSystem> {
    directory: PathBuf,
    fs: F,
    limits: ResolutionLimits,
    display: DisplaySettings,
    settings: CatalogSettings,
    excluded_file: String,
    entries: Vec<(String, ResolutionEntry)>,
    index: HashMap<String, usize>,
    duplicates: Vec<DuplicateReport>,
    token: Option<CacheToken>,
}

impl ResolutionCatalog<OsFileSystem> {
    pub fn open(directory: impl Into<PathBuf>, config: &Config) -> Self {
        Self::with_file_system(directory, OsFileSystem, config)
    }
}

impl<F: FileSystem> ResolutionCatalog<F> {
    pub fn with_file_system(directory: impl Into<PathBuf>, fs: F, config: &Config) -> Self {
        Self {
            directory: directory.into(),
            fs,
            limits: config.resolution_limits.clone(),
            display: config.display_settings.clone(),
            settings: config.catalog_settings.clone(),
            excluded_file: config.usage_settings.stats_file.clone(),
            entries: Vec::new(),
            index: HashMap::new(),
            duplicates: Vec::new(),
            token: None,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_system(&self) -> &F {
        &self.fs
    }

    pub fn file_system_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cache_token(&self) -> Option<&CacheToken> {
        self.token.as_ref()
    }

    /// Entries in display order
    pub fn entries(&self) -> Vec<(&str, &ResolutionEntry)> {
        let mut entries: Vec<(&str, &ResolutionEntry)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.as_str(), entry))
            .collect();
        let order = &self.display.category_order;
        entries.sort_by(|(_, a), (_, b)| compare_entries(a, b, order));
        entries
    }

    /// Entries with `min <= aspect ratio <= max`, in load order
    pub fn filter_by_aspect_ratio(&self, min: f64, max: f64) -> Vec<(&str, &ResolutionEntry)> {
        self.entries
            .iter()
            .filter(|(_, entry)| (min..=max).contains(&entry.aspect_ratio()))
            .map(|(key, entry)| (key.as_str(), entry))
            .collect()
    }

    /// Strip usage marks from a key using the configured symbols
    pub fn strip_marks<'a>(&self, key: &'a str) -> &'a str {
        strip_marks(key, &self.display.usage_marks)
    }

    pub fn mark_symbols(&self) -> &UsageMarkSymbols {
        &self.display.usage_marks
    }

    /// Sorted keys decorated with the usage marks that apply to each.
    ///
    /// Returns undecorated keys when mark display is disabled. Decoration never changes
    /// the order.
    pub fn marked_keys<S: UsageStorage>(&self, usage: &UsageStore<S>) -> Vec<MarkedKey> {
        mark_keys(self.sorted_keys(), usage, &self.display)
    }

    fn is_eligible(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name == self.excluded_file {
            return false;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.settings
                    .extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Observe the current modification times of all eligible sources.
    fn scan_sources(&self) -> Result<CacheToken> {
        let files = self
            .fs
            .list_files(&self.directory)
            .map_err(|e| LatentCatalogError::catalog_scan_failed(&self.directory, e))?;

        let mut token = CacheToken::new();
        for path in files.into_iter().filter(|p| self.is_eligible(p)) {
            match self.fs.modified(&path) {
                Ok(mtime) => {
                    token.insert(path, mtime);
                }
                Err(e) => log::warn!("Skipping '{}': cannot read mtime: {e}", path.display()),
            }
        }
        Ok(token)
    }

    fn read_source(&self, path: &Path) -> Result<Vec<Value>> {
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| LatentCatalogError::source_read_failed(path, e))?;
        let json: Value = serde_json::from_str(&content)
            .map_err(|e| LatentCatalogError::source_parse_failed(path, e))?;
        match json {
            Value::Array(records) => Ok(records),
            other => Err(LatentCatalogError::source_not_a_list(
                path,
                json_kind(&other),
            )),
        }
    }

    fn rebuild(&mut self, token: &CacheToken) {
        let mut entries: Vec<(String, ResolutionEntry)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut sources: Vec<(String, Vec<String>)> = Vec::new();
        let mut source_index: HashMap<String, usize> = HashMap::new();

        for path in token.keys() {
            let source_file = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let category = infer_category(&source_file, &self.display.category_patterns);

            let records = match self.read_source(path) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("Skipping source: {e}");
                    continue;
                }
            };

            let mut accepted = 0usize;
            for (position, record) in records.iter().enumerate() {
                let (width, height) = match parse_record(record, &self.limits) {
                    Ok(dims) => dims,
                    Err(e) => {
                        log::warn!("Skipping record {position} in '{source_file}': {e}");
                        continue;
                    }
                };

                let key = format_display_key(width, height, category, &self.display);
                let entry = ResolutionEntry {
                    width,
                    height,
                    category,
                    source_file: source_file.clone(),
                };

                match index.get(&key) {
                    Some(&slot) => entries[slot].1 = entry,
                    None => {
                        index.insert(key.clone(), entries.len());
                        entries.push((key.clone(), entry));
                    }
                }

                match source_index.get(&key) {
                    Some(&slot) => sources[slot].1.push(source_file.clone()),
                    None => {
                        source_index.insert(key.clone(), sources.len());
                        sources.push((key, vec![source_file.clone()]));
                    }
                }
                accepted += 1;
            }

            log::debug!(
                "Loaded {accepted} of {} records from '{source_file}' ({category})",
                records.len()
            );
        }

        self.duplicates = sources
            .into_iter()
            .filter(|(_, files)| files.len() > 1)
            .map(|(key, sources)| DuplicateReport { key, sources })
            .collect();
        for report in &self.duplicates {
            log::debug!(
                "Duplicate key '{}' from {}",
                report.key,
                report.sources.join(", ")
            );
        }

        self.entries = entries;
        self.index = index;
    }
}

impl<F: FileSystem> Catalog for ResolutionCatalog<F> {
    fn load(&mut self, force_reload: bool) -> LoadStatus {
        let token = match self.scan_sources() {
            Ok(token) => token,
            Err(e) => {
                log::warn!("{e}; catalog is empty");
                CacheToken::new()
            }
        };

        if !force_reload && self.token.as_ref() == Some(&token) {
            log::debug!("Catalog cache is valid ({} entries)", self.entries.len());
            return LoadStatus::Cached;
        }

        log::debug!(
            "Rescanning {} source(s) in {}",
            token.len(),
            self.directory.display()
        );
        self.rebuild(&token);
        self.token = Some(token);
        LoadStatus::Reloaded
    }

    fn sorted_keys(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .map(|(key, _)| key.to_string())
            .collect()
    }

    fn lookup(&self, key: &str) -> Option<&ResolutionEntry> {
        let plain = self.strip_marks(key);
        self.index.get(plain).map(|&slot| &self.entries[slot].1)
    }

    fn statistics(&self) -> CatalogStatistics {
        let mut per_category = BTreeMap::new();
        for (_, entry) in &self.entries {
            *per_category.entry(entry.category).or_insert(0) += 1;
        }

        let pixels: Vec<u64> = self.entries.iter().map(|(_, e)| e.pixel_count()).collect();
        let avg_pixel_count = if pixels.is_empty() {
            None
        } else {
            Some(pixels.iter().sum::<u64>() as f64 / pixels.len() as f64)
        };

        CatalogStatistics {
            total_count: self.entries.len(),
            per_category,
            min_pixel_count: pixels.iter().min().copied(),
            max_pixel_count: pixels.iter().max().copied(),
            avg_pixel_count,
            duplicates: self.duplicates.clone(),
        }
    }

    fn filter_by_category(&self, name: Option<&str>) -> Vec<(&str, &ResolutionEntry)> {
        let wanted = name.map(str::trim).filter(|n| !n.is_empty());
        self.entries
            .iter()
            .filter(|(_, entry)| match wanted {
                Some(n) => entry.category.as_str().eq_ignore_ascii_case(n),
                None => true,
            })
            .map(|(key, entry)| (key.as_str(), entry))
            .collect()
    }
}

/// Attach usage marks to already sorted keys, preserving their order.
pub fn mark_keys<S: UsageStorage>(
    keys: Vec<String>,
    usage: &UsageStore<S>,
    display: &DisplaySettings,
) -> Vec<MarkedKey> {
    keys.into_iter()
        .map(|key| {
            if display.show_usage_marks {
                let marks = usage.marks_for(&key, display);
                MarkedKey::new(key, marks, &display.usage_marks)
            } else {
                MarkedKey::plain(key)
            }
        })
        .collect()
}

fn compare_entries(a: &ResolutionEntry, b: &ResolutionEntry, order: &[Category]) -> Ordering {
    category_rank(a.category, order)
        .cmp(&category_rank(b.category, order))
        .then_with(|| {
            a.aspect_ratio()
                .partial_cmp(&b.aspect_ratio())
                .unwrap_or(Ordering::Equal)
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate one preset record and return its `(width, height)`.
fn parse_record(record: &Value, limits: &ResolutionLimits) -> Result<(u32, u32)> {
    let object = record
        .as_object()
        .ok_or(LatentCatalogError::RecordNotAnObject)?;
    let width = dimension(object.get("width"), "width", limits)?;
    let height = dimension(object.get("height"), "height", limits)?;
    Ok((width, height))
}

fn dimension(value: Option<&Value>, field: &'static str, limits: &ResolutionLimits) -> Result<u32> {
    let value = value.ok_or(LatentCatalogError::MissingField { field })?;
    let number = coerce_integer(value)
        .ok_or_else(|| LatentCatalogError::non_numeric_field(field, value.to_string()))?;

    if number <= 0 {
        return Err(LatentCatalogError::NonPositiveDimension {
            field,
            value: number,
        });
    }

    let number = u32::try_from(number).unwrap_or(u32::MAX);
    if number < limits.min || number > limits.max {
        return Err(LatentCatalogError::dimension_out_of_bounds(
            field, number, limits.min, limits.max,
        ));
    }
    Ok(number)
}

/// Integers, finite floats (truncated) and integer strings are accepted.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
