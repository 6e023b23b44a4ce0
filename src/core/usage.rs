//! Usage statistics, favorites and recency tracking for display keys.
//!
//! [`UsageStore`] keeps three collections in one persisted blob:
//! - **favorites**: set of keys, kept in insertion order for display
//! - **usage_stats**: per-key counters with first/last use timestamps
//! - **recent_usage**: most-recent-first list, unique per key, bounded in length
//!
//! The blob is read once when the store is built and rewritten in full after every
//! mutation. Persistence failures never lose the in-memory update; they are reported to
//! the caller (or logged) and the next successful write catches up.

use crate::core::config::DisplaySettings;
use crate::core::display_key::UsageMark;
use crate::core::error::{LatentCatalogError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub count: u64,
    #[serde(with = "timestamp")]
    pub first_used: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub last_used: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub resolution: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// ISO-8601 timestamps, written as RFC 3339.
///
/// Values without an offset (`2024-05-02T10:00:00.123456`) are read as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{text}'")))
    }

    pub(super) fn parse(text: &str) -> Option<DateTime<Utc>> {
        if let Ok(value) = DateTime::parse_from_rfc3339(text) {
            return Some(value.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|naive| naive.and_utc())
    }
}

/// Persisted form of the usage store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageData {
    pub favorites: Vec<String>,
    pub usage_stats: BTreeMap<String, UsageRecord>,
    pub recent_usage: Vec<RecentEntry>,
}

/// Aggregate view over the whole store
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSummary {
    pub total_usage: u64,
    pub unique_resolutions: usize,
    pub favorites_count: usize,
    pub most_used: Option<(String, u64)>,
}

/// Load/save blob store backing a [`UsageStore`]
pub trait UsageStorage {
    /// `Ok(None)` when nothing has been persisted yet
    fn load(&self) -> Result<Option<UsageData>>;

    fn save(&mut self, data: &UsageData) -> Result<()>;
}

/// Pretty-printed JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UsageStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<UsageData>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| LatentCatalogError::usage_load_failed(&self.path, e.to_string()))?;
        let data = serde_json::from_str(&content)
            .map_err(|e| LatentCatalogError::usage_load_failed(&self.path, e.to_string()))?;
        Ok(Some(data))
    }

    fn save(&mut self, data: &UsageData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| LatentCatalogError::usage_save_failed(&self.path, e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| LatentCatalogError::usage_save_failed(&self.path, e.to_string()))?;

        // Replace the file in one rename so a failed write never truncates it
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(directory)
            .map_err(|e| LatentCatalogError::usage_save_failed(&self.path, e.to_string()))?;
        staged
            .write_all(json.as_bytes())
            .map_err(|e| LatentCatalogError::usage_save_failed(&self.path, e.to_string()))?;
        staged
            .persist(&self.path)
            .map_err(|e| LatentCatalogError::usage_save_failed(&self.path, e.error.to_string()))?;
        Ok(())
    }
}

pub struct UsageStore<S: UsageStorage> {
    storage: S,
    data: UsageData,
    recent_capacity: usize,
}

impl<S: UsageStorage> UsageStore<S> {
    /// Build the store, reading persisted data once.
    ///
    /// Unreadable data degrades to an empty store.
    pub fn new(storage: S, recent_capacity: usize) -> Self {
        let data = match storage.load() {
            Ok(Some(data)) => data,
            Ok(None) => UsageData::default(),
            Err(e) => {
                log::warn!("{e}; starting with empty usage stats");
                UsageData::default()
            }
        };
        Self {
            storage,
            data,
            recent_capacity,
        }
    }

    pub fn data(&self) -> &UsageData {
        &self.data
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) -> Result<()> {
        self.storage.save(&self.data)
    }

    fn persist_or_log(&mut self) {
        if let Err(e) = self.persist() {
            log::warn!("{e}");
        }
    }

    /// Record one use of `key` at the current time.
    pub fn record_usage(&mut self, key: &str) -> Result<()> {
        self.record_usage_at(key, Utc::now())
    }

    pub fn record_usage_at(&mut self, key: &str, now: DateTime<Utc>) -> Result<()> {
        let record = self
            .data
            .usage_stats
            .entry(key.to_string())
            .or_insert_with(|| UsageRecord {
                count: 0,
                first_used: now,
                last_used: now,
            });
        record.count += 1;
        record.last_used = now;

        let recent = &mut self.data.recent_usage;
        recent.retain(|entry| entry.resolution != key);
        recent.insert(
            0,
            RecentEntry {
                resolution: key.to_string(),
                timestamp: now,
            },
        );
        recent.truncate(self.recent_capacity);

        log::debug!("Recorded usage of '{key}'");
        self.persist()
    }

    /// Returns `false` when `key` was already a favorite.
    pub fn add_favorite(&mut self, key: &str) -> bool {
        if self.is_favorite(key) {
            return false;
        }
        self.data.favorites.push(key.to_string());
        self.persist_or_log();
        true
    }

    /// Returns `false` when `key` was not a favorite.
    pub fn remove_favorite(&mut self, key: &str) -> bool {
        let before = self.data.favorites.len();
        self.data.favorites.retain(|f| f != key);
        if self.data.favorites.len() == before {
            return false;
        }
        self.persist_or_log();
        true
    }

    pub fn is_favorite(&self, key: &str) -> bool {
        self.data.favorites.iter().any(|f| f == key)
    }

    pub fn favorites(&self) -> &[String] {
        &self.data.favorites
    }

    pub fn usage_count(&self, key: &str) -> u64 {
        self.data
            .usage_stats
            .get(key)
            .map(|record| record.count)
            .unwrap_or(0)
    }

    /// Most recently used keys, newest first
    pub fn recent(&self, limit: usize) -> Vec<&str> {
        self.data
            .recent_usage
            .iter()
            .take(limit)
            .map(|entry| entry.resolution.as_str())
            .collect()
    }

    /// Keys used at least `min_count` times, most used first.
    ///
    /// Ties keep the store's iteration order; callers must not rely on it.
    pub fn frequently_used(&self, limit: usize, min_count: u64) -> Vec<&str> {
        let mut frequent: Vec<(&str, u64)> = self
            .data
            .usage_stats
            .iter()
            .filter(|(_, record)| record.count >= min_count)
            .map(|(key, record)| (key.as_str(), record.count))
            .collect();
        frequent.sort_by(|a, b| b.1.cmp(&a.1));
        frequent
            .into_iter()
            .take(limit)
            .map(|(key, _)| key)
            .collect()
    }

    pub fn most_used(&self) -> Option<(&str, u64)> {
        let mut best: Option<(&str, u64)> = None;
        for (key, record) in &self.data.usage_stats {
            if best.map_or(true, |(_, count)| record.count > count) {
                best = Some((key.as_str(), record.count));
            }
        }
        best
    }

    /// Marks that apply to `key`, in decoration order.
    pub fn marks_for(&self, key: &str, settings: &DisplaySettings) -> Vec<UsageMark> {
        let mut marks = Vec::new();
        if self.is_favorite(key) {
            marks.push(UsageMark::Favorite);
        }
        let count = self.usage_count(key);
        if count > 0 && count >= u64::from(settings.frequent_threshold) {
            marks.push(UsageMark::Frequent);
        }
        if self.recent(settings.recent_limit).contains(&key) {
            marks.push(UsageMark::Recent);
        }
        marks
    }

    pub fn usage_summary(&self) -> UsageSummary {
        UsageSummary {
            total_usage: self.data.usage_stats.values().map(|r| r.count).sum(),
            unique_resolutions: self.data.usage_stats.len(),
            favorites_count: self.data.favorites.len(),
            most_used: self.most_used().map(|(key, count)| (key.to_string(), count)),
        }
    }

    /// Drop recent-usage entries older than `days`; counters are kept.
    ///
    /// Returns how many entries were removed. Persists only when something changed.
    pub fn cleanup_older_than(&mut self, days: i64, now: DateTime<Utc>) -> Result<usize> {
        if days < 0 {
            return Err(LatentCatalogError::invalid_cleanup_age(days));
        }
        // A cutoff before the earliest representable time matches nothing
        let Some(cutoff) = Duration::try_days(days).and_then(|age| now.checked_sub_signed(age))
        else {
            return Ok(0);
        };
        let before = self.data.recent_usage.len();
        self.data
            .recent_usage
            .retain(|entry| entry.timestamp > cutoff);
        let removed = before - self.data.recent_usage.len();
        if removed > 0 {
            log::debug!("Removed {removed} recent entries older than {days} days");
            self.persist()?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::{UsageData, UsageStorage};
    use crate::core::error::{LatentCatalogError, Result};

    /// In-memory storage that records every save
    #[derive(Debug, Default)]
    pub struct MemoryStorage {
        pub saved: Option<UsageData>,
        pub saves: usize,
        pub fail_writes: bool,
    }

    impl MemoryStorage {
        pub fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }
    }

    impl UsageStorage for MemoryStorage {
        fn load(&self) -> Result<Option<UsageData>> {
            Ok(self.saved.clone())
        }

        fn save(&mut self, data: &UsageData) -> Result<()> {
            if self.fail_writes {
                return Err(LatentCatalogError::usage_save_failed("memory", "read-only"));
            }
            self.saved = Some(data.clone());
            self.saves += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStorage;
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const KEY_A: &str = "1024 x 1024 (1.00)";
    const KEY_B: &str = "832 x 1216 (0.68)";

    fn store() -> UsageStore<MemoryStorage> {
        UsageStore::new(MemoryStorage::default(), 10)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_record_usage_creates_and_increments() -> Result<()> {
        let mut store = store();
        store.record_usage_at(KEY_A, at(0))?;
        store.record_usage_at(KEY_A, at(10))?;

        let record = &store.data().usage_stats[KEY_A];
        assert_eq!(record.count, 2);
        assert_eq!(record.first_used, at(0));
        assert_eq!(record.last_used, at(10));
        assert_eq!(store.storage().saves, 2);
        Ok(())
    }

    #[test]
    fn test_recent_list_moves_to_front_and_is_unique() -> Result<()> {
        let mut store = store();
        store.record_usage_at(KEY_A, at(0))?;
        store.record_usage_at(KEY_B, at(1))?;
        store.record_usage_at(KEY_A, at(2))?;

        assert_eq!(store.recent(10), vec![KEY_A, KEY_B]);
        Ok(())
    }

    #[test]
    fn test_recent_list_is_bounded() -> Result<()> {
        let mut store = UsageStore::new(MemoryStorage::default(), 3);
        for i in 0..5 {
            store.record_usage_at(&format!("{} x 512 (1.00)", 512 + i), at(i))?;
        }
        assert_eq!(store.data().recent_usage.len(), 3);
        assert_eq!(store.recent(1), vec!["516 x 512 (1.00)"]);
        Ok(())
    }

    #[test]
    fn test_add_favorite_is_idempotent() {
        let mut store = store();
        assert!(store.add_favorite(KEY_A));
        assert!(!store.add_favorite(KEY_A));
        assert_eq!(store.favorites(), &[KEY_A.to_string()]);
        assert_eq!(store.storage().saves, 1);
    }

    #[test]
    fn test_remove_favorite() {
        let mut store = store();
        assert!(!store.remove_favorite(KEY_A));
        store.add_favorite(KEY_A);
        assert!(store.remove_favorite(KEY_A));
        assert!(!store.is_favorite(KEY_A));
        assert_eq!(store.storage().saves, 2);
    }

    #[test]
    fn test_frequent_threshold_boundary() -> Result<()> {
        let settings = DisplaySettings::default();
        let threshold = u64::from(settings.frequent_threshold);
        let mut store = store();

        for i in 0..threshold - 1 {
            store.record_usage_at(KEY_A, at(i as i64))?;
        }
        assert!(!store.frequently_used(20, threshold).contains(&KEY_A));
        assert!(!store.marks_for(KEY_A, &settings).contains(&UsageMark::Frequent));

        store.record_usage_at(KEY_A, at(100))?;
        assert!(store.frequently_used(20, threshold).contains(&KEY_A));
        assert!(store.marks_for(KEY_A, &settings).contains(&UsageMark::Frequent));
        Ok(())
    }

    #[test]
    fn test_frequently_used_sorted_by_count() -> Result<()> {
        let mut store = store();
        store.record_usage_at(KEY_A, at(0))?;
        for i in 0..3 {
            store.record_usage_at(KEY_B, at(i))?;
        }
        assert_eq!(store.frequently_used(5, 1), vec![KEY_B, KEY_A]);
        assert_eq!(store.frequently_used(1, 1), vec![KEY_B]);
        Ok(())
    }

    #[test]
    fn test_marks_for_in_fixed_order() -> Result<()> {
        let settings = DisplaySettings::default();
        let mut store = store();
        assert!(store.marks_for(KEY_A, &settings).is_empty());

        store.add_favorite(KEY_A);
        for i in 0..3 {
            store.record_usage_at(KEY_A, at(i))?;
        }
        assert_eq!(
            store.marks_for(KEY_A, &settings),
            vec![UsageMark::Favorite, UsageMark::Frequent, UsageMark::Recent]
        );
        Ok(())
    }

    #[test]
    fn test_recent_mark_respects_recent_limit() -> Result<()> {
        let settings = DisplaySettings {
            recent_limit: 1,
            ..DisplaySettings::default()
        };
        let mut store = store();
        store.record_usage_at(KEY_A, at(0))?;
        store.record_usage_at(KEY_B, at(1))?;
        assert!(!store.marks_for(KEY_A, &settings).contains(&UsageMark::Recent));
        assert!(store.marks_for(KEY_B, &settings).contains(&UsageMark::Recent));
        Ok(())
    }

    #[test]
    fn test_most_used_and_summary() -> Result<()> {
        let mut store = store();
        assert_eq!(store.most_used(), None);

        store.record_usage_at(KEY_A, at(0))?;
        store.record_usage_at(KEY_B, at(1))?;
        store.record_usage_at(KEY_B, at(2))?;
        store.add_favorite(KEY_A);

        assert_eq!(store.most_used(), Some((KEY_B, 2)));
        let summary = store.usage_summary();
        assert_eq!(summary.total_usage, 3);
        assert_eq!(summary.unique_resolutions, 2);
        assert_eq!(summary.favorites_count, 1);
        assert_eq!(summary.most_used, Some((KEY_B.to_string(), 2)));
        Ok(())
    }

    #[test]
    fn test_cleanup_drops_only_old_recent_entries() -> Result<()> {
        let mut store = store();
        let now = at(0) + Duration::days(40);
        store.record_usage_at(KEY_A, at(0))?;
        store.record_usage_at(KEY_B, now)?;

        let removed = store.cleanup_older_than(30, now)?;
        assert_eq!(removed, 1);
        assert_eq!(store.recent(10), vec![KEY_B]);
        assert_eq!(store.usage_count(KEY_A), 1);
        Ok(())
    }

    #[test]
    fn test_cleanup_with_huge_age_removes_nothing() -> Result<()> {
        let mut store = store();
        store.record_usage_at(KEY_A, at(0))?;

        assert_eq!(store.cleanup_older_than(100_000_000, at(10))?, 0);
        assert_eq!(store.cleanup_older_than(1_000_000_000_000_000, at(10))?, 0);
        assert_eq!(store.recent(10), vec![KEY_A]);
        Ok(())
    }

    #[test]
    fn test_cleanup_rejects_negative_age() -> Result<()> {
        let mut store = store();
        store.record_usage_at(KEY_A, at(0))?;

        assert!(matches!(
            store.cleanup_older_than(-1, at(10)),
            Err(LatentCatalogError::InvalidCleanupAge { days: -1 })
        ));
        assert_eq!(store.recent(10), vec![KEY_A]);
        Ok(())
    }

    #[test]
    fn test_write_failure_keeps_in_memory_state() {
        let mut store = UsageStore::new(MemoryStorage::failing(), 10);
        assert!(store.record_usage_at(KEY_A, at(0)).is_err());
        assert_eq!(store.usage_count(KEY_A), 1);
        assert!(store.add_favorite(KEY_A));
        assert!(store.is_favorite(KEY_A));
    }

    #[test]
    fn test_json_file_storage_round_trip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested").join("usage_stats.json");

        {
            let mut store = UsageStore::new(JsonFileStorage::new(&path), 10);
            store.record_usage_at(KEY_A, at(0))?;
            store.add_favorite(KEY_B);
        }

        let reloaded = UsageStore::new(JsonFileStorage::new(&path), 10);
        assert_eq!(reloaded.usage_count(KEY_A), 1);
        assert!(reloaded.is_favorite(KEY_B));
        assert_eq!(reloaded.recent(5), vec![KEY_A]);

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert!(raw["usage_stats"][KEY_A]["count"].is_u64());
        assert_eq!(raw["recent_usage"][0]["resolution"], KEY_A);
        Ok(())
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty_store() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("usage_stats.json");
        fs::write(&path, "{ nope")?;

        let store = UsageStore::new(JsonFileStorage::new(&path), 10);
        assert_eq!(store.data(), &UsageData::default());
        Ok(())
    }

    #[test]
    fn test_missing_sections_merge_with_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("usage_stats.json");
        fs::write(&path, format!(r#"{{"favorites": ["{KEY_A}"]}}"#))?;

        let store = UsageStore::new(JsonFileStorage::new(&path), 10);
        assert!(store.is_favorite(KEY_A));
        assert!(store.data().usage_stats.is_empty());
        Ok(())
    }

    #[test]
    fn test_timestamps_without_offset_are_read_as_utc() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("usage_stats.json");
        fs::write(
            &path,
            format!(
                r#"{{
  "favorites": ["{KEY_A}"],
  "usage_stats": {{
    "{KEY_A}": {{
      "count": 4,
      "first_used": "2024-05-01T09:30:00",
      "last_used": "2024-05-02T10:00:00.123456"
    }}
  }},
  "recent_usage": [
    {{"resolution": "{KEY_A}", "timestamp": "2024-05-02T10:00:00.123456"}}
  ]
}}"#
            ),
        )?;

        let mut store = UsageStore::new(JsonFileStorage::new(&path), 10);
        assert!(store.is_favorite(KEY_A));
        assert_eq!(store.usage_count(KEY_A), 4);
        let last_used = Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap()
            + Duration::microseconds(123_456);
        assert_eq!(store.data().usage_stats[KEY_A].last_used, last_used);

        store.record_usage_at(KEY_B, last_used + Duration::minutes(1))?;
        let reloaded = UsageStore::new(JsonFileStorage::new(&path), 10);
        assert!(reloaded.is_favorite(KEY_A));
        assert_eq!(reloaded.usage_count(KEY_A), 4);
        assert_eq!(reloaded.recent(10), vec![KEY_B, KEY_A]);
        Ok(())
    }

    #[test]
    fn test_timestamp_formats() {
        let utc = Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap();
        assert_eq!(timestamp::parse("2024-05-02T10:00:00Z"), Some(utc));
        assert_eq!(timestamp::parse("2024-05-02T12:00:00+02:00"), Some(utc));
        assert_eq!(timestamp::parse("2024-05-02T10:00:00"), Some(utc));
        assert_eq!(timestamp::parse("2024-05-02 10:00:00"), Some(utc));
        assert_eq!(timestamp::parse("yesterday"), None);
    }

    #[test]
    fn test_save_replaces_file_in_place() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("usage_stats.json");
        fs::write(&path, "{ truncated")?;

        let mut store = UsageStore::new(JsonFileStorage::new(&path), 10);
        store.record_usage_at(KEY_A, at(0))?;

        let names: Vec<_> = fs::read_dir(temp_dir.path())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name())
            .collect();
        assert_eq!(names, vec!["usage_stats.json"]);

        let reloaded = UsageStore::new(JsonFileStorage::new(&path), 10);
        assert_eq!(reloaded.usage_count(KEY_A), 1);
        Ok(())
    }
}
