//! Common assertion helpers for output validation

#![allow(dead_code)]

use predicates::prelude::*;

/// Checks for a numbered list entry
pub fn has_index(index: u32) -> impl Predicate<str> {
    predicates::str::contains(format!("[{index}]"))
}

/// Checks that a resolution key is listed, with or without marks
pub fn has_resolution(key: &str) -> impl Predicate<str> {
    predicates::str::contains(key.to_string())
}

pub fn has_fallback_warning() -> impl Predicate<str> {
    predicates::str::contains("Warning:").and(predicates::str::contains("fallback"))
}

pub fn has_shape(shape: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("Shape: {shape}"))
}
