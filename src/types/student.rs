use serde::{Deserialize, Serialize};

use super::non_blank;
use super::pagination::{DEFAULT_STUDENT_LIMIT, Page, PageRequest, empty_string_as_none};
use crate::db::models::{SchoolRef, SearchHit, StudentDetail, StudentRecord};

/// Query string of `GET /api/schools/{id}/students`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentListQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub offset: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub grade: Option<i64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Normalized per-school student filters; blank strings are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilters {
    pub grade: Option<i64>,
    pub gender: Option<String>,
    pub ethnicity: Option<String>,
    pub search: Option<String>,
}

impl StudentListQuery {
    pub fn filters(&self) -> StudentFilters {
        StudentFilters {
            grade: self.grade,
            gender: non_blank(self.gender.as_deref()).map(str::to_string),
            ethnicity: non_blank(self.ethnicity.as_deref()).map(str::to_string),
            search: non_blank(self.search.as_deref()).map(str::to_string),
        }
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.offset, DEFAULT_STUDENT_LIMIT)
    }
}

/// Query string of `GET /api/search/students`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub school_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub offset: Option<u32>,
}

impl StudentSearchQuery {
    pub fn text(&self) -> Option<&str> {
        non_blank(self.q.as_deref())
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.limit, self.offset, DEFAULT_STUDENT_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolStudentsResponse {
    pub students: Vec<StudentRecord>,
    pub total: i64,
    pub has_more: bool,
    pub school: SchoolRef,
}

impl SchoolStudentsResponse {
    pub fn new(school: SchoolRef, page: Page<StudentRecord>) -> Self {
        Self {
            students: page.items,
            total: page.total,
            has_more: page.has_more,
            school,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentResponse {
    pub student: StudentDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSearchResponse {
    pub students: Vec<SearchHit>,
    pub total: i64,
    pub has_more: bool,
}

impl From<Page<SearchHit>> for StudentSearchResponse {
    fn from(page: Page<SearchHit>) -> Self {
        Self {
            students: page.items,
            total: page.total,
            has_more: page.has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_dropped() {
        let q: StudentListQuery = serde_json::from_str(
            r#"{"grade":"","gender":"Male","ethnicity":"  ","search":" Kim "}"#,
        )
        .unwrap();
        assert_eq!(
            q.filters(),
            StudentFilters {
                grade: None,
                gender: Some("Male".into()),
                ethnicity: None,
                search: Some("Kim".into()),
            }
        );
        assert_eq!(q.page().limit(), DEFAULT_STUDENT_LIMIT);
    }

    #[test]
    fn search_query_reads_camel_case_school_id() {
        let q: StudentSearchQuery =
            serde_json::from_str(r#"{"q":"  ","schoolId":"4","limit":"500"}"#).unwrap();
        assert_eq!(q.text(), None);
        assert_eq!(q.school_id, Some(4));
        assert_eq!(q.page().limit(), 200);
    }

    #[test]
    fn search_hit_serializes_flat() {
        let hit = SearchHit {
            student: StudentRecord {
                student_id: "10000001".into(),
                first_name: "Mei".into(),
                last_name: "Chen".into(),
                grade: 11,
                gender: "Female".into(),
                ethnicity: "Asian".into(),
                address: None,
                zip_code: Some("60614".into()),
            },
            school: "Lane Tech College Prep".into(),
            school_id: 5,
        };
        let value = serde_json::to_value(&hit).unwrap();
        assert_eq!(value["studentId"], "10000001");
        assert_eq!(value["zipCode"], "60614");
        assert_eq!(value["schoolId"], 5);
        assert_eq!(value["school"], "Lane Tech College Prep");
    }
}
