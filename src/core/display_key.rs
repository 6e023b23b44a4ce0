//! Display keys and reversible usage-mark decoration.
//!
//! A display key is the string identity of a catalog entry, e.g. `"1024 x 1024 (1.00)"`
//! or `"[SDXL] 1024 x 1024 (1.00)"` when category prefixes are enabled. The UI shows
//! [`MarkedKey`]s: the display key plus zero or more mark symbols separated by single
//! spaces, always in the order favorite, frequent, recent.
//!
//! # Round-trip
//! [`strip_marks`] removes exactly the tokens [`decorate`] appended, using the configured
//! symbol table rather than guessing from trailing characters. For every display key `k`
//! and every mark combination, `strip_marks(decorate(k, marks)) == k`.

use crate::core::category::Category;
use crate::core::config::{DisplaySettings, UsageMarkSymbols};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Build the display key for one resolution.
pub fn format_display_key(
    width: u32,
    height: u32,
    category: Category,
    settings: &DisplaySettings,
) -> String {
    let ratio = f64::from(width) / f64::from(height);
    let key = format!(
        "{width} x {height} ({ratio:.prec$})",
        prec = settings.aspect_ratio_precision
    );
    if settings.show_category_prefix {
        format!("[{}] {key}", category.label())
    } else {
        key
    }
}

/// Usage indicator that can decorate a display key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageMark {
    Favorite,
    Frequent,
    Recent,
}

impl UsageMark {
    /// Fixed decoration order
    pub const ORDER: [UsageMark; 3] = [UsageMark::Favorite, UsageMark::Frequent, UsageMark::Recent];

    pub fn symbol<'a>(&self, symbols: &'a UsageMarkSymbols) -> &'a str {
        match self {
            UsageMark::Favorite => &symbols.favorite,
            UsageMark::Frequent => &symbols.frequent,
            UsageMark::Recent => &symbols.recent,
        }
    }
}

/// A display key together with the marks that apply to it.
///
/// Marks travel out-of-band; [`MarkedKey::label`] is the decorated text for the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedKey {
    pub key: String,
    pub marks: Vec<UsageMark>,
    label: String,
}

impl MarkedKey {
    pub fn new(key: impl Into<String>, marks: Vec<UsageMark>, symbols: &UsageMarkSymbols) -> Self {
        let key = key.into();
        let label = decorate(&key, &marks, symbols);
        Self { key, marks, label }
    }

    /// Key without any decoration
    pub fn plain(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            marks: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn has_mark(&self, mark: UsageMark) -> bool {
        self.marks.contains(&mark)
    }
}

impl fmt::Display for MarkedKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Append mark symbols to a display key.
///
/// Marks are emitted in the fixed order regardless of the order given; duplicates and
/// marks with an empty symbol are skipped.
pub fn decorate(key: &str, marks: &[UsageMark], symbols: &UsageMarkSymbols) -> String {
    let mut label = key.to_string();
    for mark in UsageMark::ORDER {
        if !marks.contains(&mark) {
            continue;
        }
        let symbol = mark.symbol(symbols);
        if symbol.is_empty() {
            continue;
        }
        label.push(' ');
        label.push_str(symbol);
    }
    label
}

/// Remove decoration added by [`decorate`].
///
/// Walks the marks in reverse order and removes each at most once, so a key whose text
/// merely resembles a symbol is never eaten. Labels decorated with the default symbols
/// are still recognized after the configured symbols change.
pub fn strip_marks<'a>(label: &'a str, symbols: &UsageMarkSymbols) -> &'a str {
    let rest = strip_symbols(label, symbols);
    if rest.len() < label.len() {
        return rest;
    }

    let defaults = UsageMarkSymbols::default();
    if *symbols == defaults {
        rest
    } else {
        strip_symbols(label, &defaults)
    }
}

fn strip_symbols<'a>(label: &'a str, symbols: &UsageMarkSymbols) -> &'a str {
    let mut rest = label;
    for mark in UsageMark::ORDER.iter().rev() {
        let symbol = mark.symbol(symbols);
        if symbol.is_empty() {
            continue;
        }
        if let Some(stripped) = rest
            .strip_suffix(symbol)
            .and_then(|head| head.strip_suffix(' '))
        {
            rest = stripped;
        }
    }
    rest
}
