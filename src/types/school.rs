use serde::{Deserialize, Serialize};

use super::non_blank;
use super::pagination::{DEFAULT_SCHOOL_LIMIT, Page, PageRequest, empty_string_as_none};
use crate::db::models::SchoolSummary;

/// Query string of `GET /api/schools`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub offset: Option<u32>,
}

impl SchoolListQuery {
    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.offset, DEFAULT_SCHOOL_LIMIT)
    }
}

/// Body of `POST /api/schools/favorites`. A missing `schoolIds` key is an empty set.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesRequest {
    #[serde(default)]
    pub school_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolListResponse {
    pub schools: Vec<SchoolSummary>,
    pub total: i64,
    pub has_more: bool,
}

impl From<Page<SchoolSummary>> for SchoolListResponse {
    fn from(page: Page<SchoolSummary>) -> Self {
        Self {
            schools: page.items,
            total: page.total,
            has_more: page.has_more,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteSchoolsResponse {
    pub schools: Vec<SchoolSummary>,
}

/// Distinct values present among one school's students, each ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub grades: Vec<i64>,
    pub genders: Vec<String>,
    pub ethnicities: Vec<String>,
}
