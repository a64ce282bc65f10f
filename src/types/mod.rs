pub mod pagination;
pub mod school;
pub mod student;

pub use pagination::{Page, PageRequest};

/// `Some(trimmed)` for a non-blank string, `None` otherwise.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
