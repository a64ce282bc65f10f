use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// School listing row: `schools` joined with the derived student count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SchoolSummary {
    pub id: i64,
    pub name: String,
    pub student_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct SchoolRef {
    pub id: i64,
    pub name: String,
}

/// Student columns exposed by the API, in their stored form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub grade: i64,
    pub gender: String,
    pub ethnicity: String,
    pub address: Option<String>,
    pub zip_code: Option<String>,
}

/// A student joined with the name of its school.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct StudentDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub student: StudentRecord,
    pub school: String,
}

/// Global search hit: the student plus the owning school's id and name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub student: StudentRecord,
    pub school: String,
    pub school_id: i64,
}

/// One entry of the bulk-import JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub grade: i64,
    pub gender: String,
    pub ethnicity: String,
    pub school: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

impl From<ImportRecord> for StudentDetail {
    fn from(r: ImportRecord) -> Self {
        StudentDetail {
            student: StudentRecord {
                student_id: r.student_id,
                first_name: r.first_name,
                last_name: r.last_name,
                grade: r.grade,
                gender: r.gender,
                ethnicity: r.ethnicity,
                address: r.address,
                zip_code: r.zip_code,
            },
            school: r.school,
        }
    }
}
