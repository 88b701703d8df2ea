//! Field-checking primitives shared by the entity validators.
//!
//! Each accessor reads one field out of an untyped `serde_yaml::Value`
//! mapping, records any violated constraint into the shared sink, and
//! returns as much of the value as it could produce. The contract that
//! makes multi-error reporting work:
//!
//! - A helper returns `None` only when no usable value exists at all
//!   (field missing, wrong type). Range and shape problems are recorded
//!   but the value is still returned, so later checks on the same field
//!   and sibling fields keep running.
//! - Callers evaluate every field before constructing the typed struct,
//!   then bail with `?` only at construction time. A missing `title`
//!   never hides a malformed `duration`.
//! - The top-level `parse` functions treat a non-empty sink as failure
//!   even when construction succeeded, so a recorded range violation is
//!   never silently accepted.
//!
//! YAML `null` is treated the same as an absent field. Unknown keys are
//! ignored; the schemas are deliberately open.

use crate::schema::{Violation, Violations};
use chrono::{DateTime, Utc};
use serde_yaml::Value;

/// Run an entity checker over a document root.
///
/// Every helper that returns `None` records at least one violation
/// first, so the `Err` arm always carries a non-empty list. The sink is
/// also consulted when construction succeeded, because range and shape
/// problems keep the value alive for further checking.
pub(crate) fn parse_entity<T>(
    value: &Value,
    check: impl FnOnce(&Value, &str, &mut Vec<Violation>) -> Option<T>,
) -> Result<T, Violations> {
    let mut sink = Vec::new();
    match check(value, "", &mut sink) {
        Some(entity) if sink.is_empty() => Ok(entity),
        _ => Err(Violations(sink)),
    }
}

/// Dotted child path: `join("lessons.0", "id")` is `lessons.0.id`.
pub(crate) fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Dotted element path: `index("choices", 2)` is `choices.2`.
pub(crate) fn index(parent: &str, i: usize) -> String {
    if parent.is_empty() {
        i.to_string()
    } else {
        format!("{parent}.{i}")
    }
}

pub(crate) fn record(sink: &mut Vec<Violation>, path: &str, message: impl Into<String>) {
    sink.push(Violation::new(path, message));
}

/// Fetch a required field. Absent and explicit `null` both count as missing.
pub(crate) fn require<'a>(
    map: &'a Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
) -> Option<&'a Value> {
    match map.get(key) {
        Some(value) if !value.is_null() => Some(value),
        _ => {
            record(sink, &join(parent, key), "is required");
            None
        }
    }
}

/// Fetch an optional field; `null` reads as absent. No violation recorded.
pub(crate) fn optional<'a>(map: &'a Value, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn str_value<'a>(value: &'a Value, path: &str, sink: &mut Vec<Violation>) -> Option<&'a str> {
    match value.as_str() {
        Some(s) => Some(s),
        None => {
            record(sink, path, "must be a string");
            None
        }
    }
}

/// Character-count bounds. Records but never discards the value.
fn check_str_len(s: &str, path: &str, sink: &mut Vec<Violation>, min: usize, max: Option<usize>) {
    let len = s.chars().count();
    if len < min {
        if min == 1 {
            record(sink, path, "must not be empty");
        } else {
            record(sink, path, format!("must be at least {min} characters"));
        }
    }
    if let Some(max) = max
        && len > max
    {
        record(sink, path, format!("must be at most {max} characters"));
    }
}

pub(crate) fn req_string(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
    min: usize,
    max: Option<usize>,
) -> Option<String> {
    let path = join(parent, key);
    let value = require(map, key, parent, sink)?;
    let s = str_value(value, &path, sink)?;
    check_str_len(s, &path, sink, min, max);
    Some(s.to_string())
}

pub(crate) fn opt_string(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
    min: usize,
    max: Option<usize>,
) -> Option<Option<String>> {
    let Some(value) = optional(map, key) else {
        return Some(None);
    };
    let path = join(parent, key);
    let s = str_value(value, &path, sink)?;
    check_str_len(s, &path, sink, min, max);
    Some(Some(s.to_string()))
}

pub(crate) fn req_bool(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
) -> Option<bool> {
    let value = require(map, key, parent, sink)?;
    match value.as_bool() {
        Some(b) => Some(b),
        None => {
            record(sink, &join(parent, key), "must be a boolean");
            None
        }
    }
}

/// Optional boolean with a default, the common shape for flags.
pub(crate) fn bool_or(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
    default: bool,
) -> Option<bool> {
    let Some(value) = optional(map, key) else {
        return Some(default);
    };
    match value.as_bool() {
        Some(b) => Some(b),
        None => {
            record(sink, &join(parent, key), "must be a boolean");
            None
        }
    }
}

fn u32_value(
    value: &Value,
    path: &str,
    sink: &mut Vec<Violation>,
    min: u32,
    max: Option<u32>,
) -> Option<u32> {
    let Some(n) = value.as_i64() else {
        record(sink, path, "must be an integer");
        return None;
    };
    if n < i64::from(min) {
        record(sink, path, format!("must be at least {min}"));
        return None;
    }
    let cap = max.unwrap_or(u32::MAX);
    if n > i64::from(cap) {
        record(sink, path, format!("must be at most {cap}"));
        return None;
    }
    Some(n as u32)
}

pub(crate) fn req_u32(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
    min: u32,
    max: Option<u32>,
) -> Option<u32> {
    let path = join(parent, key);
    let value = require(map, key, parent, sink)?;
    u32_value(value, &path, sink, min, max)
}

pub(crate) fn opt_u32(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
    min: u32,
    max: Option<u32>,
) -> Option<Option<u32>> {
    let Some(value) = optional(map, key) else {
        return Some(None);
    };
    u32_value(value, &join(parent, key), sink, min, max).map(Some)
}

fn f64_value(
    value: &Value,
    path: &str,
    sink: &mut Vec<Violation>,
    min: f64,
    max: Option<f64>,
) -> Option<f64> {
    let Some(n) = value.as_f64() else {
        record(sink, path, "must be a number");
        return None;
    };
    if !n.is_finite() {
        record(sink, path, "must be a finite number");
        return None;
    }
    if n < min {
        record(sink, path, format!("must be at least {min}"));
        return None;
    }
    if let Some(max) = max
        && n > max
    {
        record(sink, path, format!("must be at most {max}"));
        return None;
    }
    Some(n)
}

pub(crate) fn req_f64(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
    min: f64,
    max: Option<f64>,
) -> Option<f64> {
    let path = join(parent, key);
    let value = require(map, key, parent, sink)?;
    f64_value(value, &path, sink, min, max)
}

pub(crate) fn opt_f64(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
    min: f64,
    max: Option<f64>,
) -> Option<Option<f64>> {
    let Some(value) = optional(map, key) else {
        return Some(None);
    };
    f64_value(value, &join(parent, key), sink, min, max).map(Some)
}

/// A closed string vocabulary. Implementors list every accepted token.
pub(crate) trait Token: Copy {
    const TOKENS: &'static [(&'static str, Self)];

    fn from_token(s: &str) -> Option<Self> {
        Self::TOKENS.iter().find(|(t, _)| *t == s).map(|(_, v)| *v)
    }

    fn expected() -> String {
        Self::TOKENS
            .iter()
            .map(|(t, _)| *t)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn token_value<T: Token>(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<T> {
    let s = str_value(value, path, sink)?;
    match T::from_token(s) {
        Some(token) => Some(token),
        None => {
            record(sink, path, format!("must be one of: {}", T::expected()));
            None
        }
    }
}

pub(crate) fn req_token<T: Token>(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
) -> Option<T> {
    let path = join(parent, key);
    let value = require(map, key, parent, sink)?;
    token_value(value, &path, sink)
}

pub(crate) fn opt_token<T: Token>(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
) -> Option<Option<T>> {
    let Some(value) = optional(map, key) else {
        return Some(None);
    };
    token_value(value, &join(parent, key), sink).map(Some)
}

fn check_seq_len(
    items: &[Value],
    path: &str,
    sink: &mut Vec<Violation>,
    min_items: usize,
    max_items: Option<usize>,
) {
    if items.len() < min_items {
        if min_items == 1 {
            record(sink, path, "must not be empty");
        } else {
            record(sink, path, format!("must have at least {min_items} items"));
        }
    }
    if let Some(max) = max_items
        && items.len() > max
    {
        record(sink, path, format!("must have at most {max} items"));
    }
}

/// Required list. Length problems are recorded but the items are still
/// returned so every element gets walked.
pub(crate) fn req_seq<'a>(
    map: &'a Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
    min_items: usize,
    max_items: Option<usize>,
) -> Option<&'a [Value]> {
    let path = join(parent, key);
    let value = require(map, key, parent, sink)?;
    let Some(items) = value.as_sequence() else {
        record(sink, &path, "must be a list");
        return None;
    };
    check_seq_len(items, &path, sink, min_items, max_items);
    Some(items)
}

pub(crate) fn opt_seq<'a>(
    map: &'a Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
) -> Option<Option<&'a [Value]>> {
    let Some(value) = optional(map, key) else {
        return Some(None);
    };
    match value.as_sequence() {
        Some(items) => Some(Some(items.as_slice())),
        None => {
            record(sink, &join(parent, key), "must be a list");
            None
        }
    }
}

/// Walk every element before folding, so one bad item never hides the
/// problems in the items after it.
pub(crate) fn items<T>(
    seq: &[Value],
    path: &str,
    sink: &mut Vec<Violation>,
    mut check: impl FnMut(&Value, &str, &mut Vec<Violation>) -> Option<T>,
) -> Option<Vec<T>> {
    let mut out = Vec::with_capacity(seq.len());
    let mut complete = true;
    for (i, item) in seq.iter().enumerate() {
        match check(item, &index(path, i), sink) {
            Some(value) => out.push(value),
            None => complete = false,
        }
    }
    complete.then_some(out)
}

pub(crate) fn req_str_seq(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
    min_items: usize,
    item_min: usize,
    item_max: Option<usize>,
) -> Option<Vec<String>> {
    let seq = req_seq(map, key, parent, sink, min_items, None)?;
    items(seq, &join(parent, key), sink, |value, path, sink| {
        let s = str_value(value, path, sink)?;
        check_str_len(s, path, sink, item_min, item_max);
        Some(s.to_string())
    })
}

pub(crate) fn opt_str_seq(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
    item_min: usize,
) -> Option<Option<Vec<String>>> {
    let Some(seq) = opt_seq(map, key, parent, sink)? else {
        return Some(None);
    };
    items(seq, &join(parent, key), sink, |value, path, sink| {
        let s = str_value(value, path, sink)?;
        check_str_len(s, path, sink, item_min, None);
        Some(s.to_string())
    })
    .map(Some)
}

pub(crate) fn req_token_seq<T: Token>(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
    min_items: usize,
) -> Option<Vec<T>> {
    let seq = req_seq(map, key, parent, sink, min_items, None)?;
    items(seq, &join(parent, key), sink, |value, path, sink| {
        token_value::<T>(value, path, sink)
    })
}

fn datetime_value(value: &Value, path: &str, sink: &mut Vec<Violation>) -> Option<DateTime<Utc>> {
    let s = str_value(value, path, sink)?;
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(_) => {
            record(sink, path, "must be an RFC 3339 timestamp");
            None
        }
    }
}

pub(crate) fn req_datetime(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
) -> Option<DateTime<Utc>> {
    let path = join(parent, key);
    let value = require(map, key, parent, sink)?;
    datetime_value(value, &path, sink)
}

pub(crate) fn opt_datetime(
    map: &Value,
    key: &str,
    parent: &str,
    sink: &mut Vec<Violation>,
) -> Option<Option<DateTime<Utc>>> {
    let Some(value) = optional(map, key) else {
        return Some(None);
    };
    datetime_value(value, &join(parent, key), sink).map(Some)
}
