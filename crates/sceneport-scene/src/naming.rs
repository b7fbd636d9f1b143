//! Entity name helpers
//!
//! Authoring tools keep names unique by appending a suffix after a
//! delimiter ("car", "car.001", "car.002"). The part before the first
//! delimiter is the logical name used for grouping.

/// Delimiter used when none is configured
pub const DEFAULT_DELIMITER: char = '.';

/// Split `name` at the first `delimiter` into base and suffix
pub fn split_name(name: &str, delimiter: char) -> (&str, Option<&str>) {
    match name.split_once(delimiter) {
        Some((base, suffix)) => (base, Some(suffix)),
        None => (name, None),
    }
}

/// Base component of `name`
pub fn logical_name(name: &str, delimiter: char) -> &str {
    split_name(name, delimiter).0
}
