//! Offset pagination with `limit + 1` over-fetch.

use serde::{Deserialize, Deserializer};
use std::{fmt::Display, str::FromStr};

/// Upper bound on `limit` for every list endpoint.
pub const MAX_LIMIT: u32 = 200;
pub const DEFAULT_SCHOOL_LIMIT: u32 = 100;
pub const DEFAULT_STUDENT_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    offset: u32,
}

impl PageRequest {
    /// `limit` falls back to `default_limit` and is capped at [`MAX_LIMIT`];
    /// `offset` defaults to 0.
    pub fn new(limit: Option<u32>, offset: Option<u32>, default_limit: u32) -> Self {
        Self {
            limit: limit.unwrap_or(default_limit).min(MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Rows to ask storage for: one more than the page so `has_more` needs no
    /// second query.
    pub fn fetch_limit(&self) -> i64 {
        i64::from(self.limit) + 1
    }

    pub fn sql_offset(&self) -> i64 {
        i64::from(self.offset)
    }

    /// Strip the over-fetched row and record whether it existed.
    pub fn finish<T>(&self, mut rows: Vec<T>, total: i64) -> Page<T> {
        let limit = self.limit as usize;
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        Page {
            items: rows,
            total,
            has_more,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Full filtered count, independent of `limit`/`offset`.
    pub total: i64,
    pub has_more: bool,
}

/// Treat `?grade=` the same as an absent `grade`.
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}
