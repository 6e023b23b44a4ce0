//! Resolution categories and file-name based category inference.
//!
//! This module defines [`Category`] and [`CategoryPattern`]. A preset file's category is
//! inferred from its file name by walking an ordered list of substring patterns; the first
//! matching pattern wins and unmatched files fall back to [`Category::Custom`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Model family a resolution preset belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sdxl,
    Sd15,
    Custom,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Sdxl, Category::Sd15, Category::Custom];

    /// Lowercase name used in configuration and filters
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sdxl => "sdxl",
            Category::Sd15 => "sd15",
            Category::Custom => "custom",
        }
    }

    /// Uppercase label used for the optional `[SDXL]` key prefix
    pub fn label(&self) -> &'static str {
        match self {
            Category::Sdxl => "SDXL",
            Category::Sd15 => "SD15",
            Category::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sdxl" => Ok(Category::Sdxl),
            "sd15" => Ok(Category::Sd15),
            "custom" => Ok(Category::Custom),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// Substring patterns that map a source file name to a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPattern {
    pub category: Category,
    pub patterns: Vec<String>,
}

impl CategoryPattern {
    pub fn new(category: Category, patterns: &[&str]) -> Self {
        Self {
            category,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Default inference rules: anything mentioning "xl" is SDXL, then SD 1.5 markers.
pub fn default_category_patterns() -> Vec<CategoryPattern> {
    vec![
        CategoryPattern::new(Category::Sdxl, &["sdxl", "xl"]),
        CategoryPattern::new(Category::Sd15, &["sd15", "sd1.5", "1.5", "15", "sd"]),
    ]
}

/// Infer the category of a source file from its name.
///
/// Matching is case-insensitive and ordered: rules are tried in list order and the
/// patterns within each rule in their own order.
pub fn infer_category(file_name: &str, rules: &[CategoryPattern]) -> Category {
    let name = file_name.to_lowercase();
    rules
        .iter()
        .find(|rule| {
            rule.patterns
                .iter()
                .filter(|p| !p.is_empty())
                .any(|p| name.contains(&p.to_lowercase()))
        })
        .map(|rule| rule.category)
        .unwrap_or(Category::Custom)
}

/// Rank of a category within a configured ordering.
///
/// Categories missing from the ordering sort after every listed one.
pub fn category_rank(category: Category, order: &[Category]) -> usize {
    order
        .iter()
        .position(|c| *c == category)
        .unwrap_or(order.len())
}
