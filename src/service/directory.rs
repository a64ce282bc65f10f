//! Read-side query service behind the directory API.
//!
//! Every list operation builds one [`FilterSet`], counts the filtered universe
//! with it, then fetches `limit + 1` rows with the very same predicates.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::db::filter::FilterSet;
use crate::db::models::{SchoolSummary, SearchHit, StudentDetail, StudentRecord};
use crate::db::sqlite::{DirectoryStorage, SCHOOL_SELECT};
use crate::error::AspenError;
use crate::types::school::FilterOptions;
use crate::types::student::{SchoolStudentsResponse, StudentFilters};
use crate::types::{Page, PageRequest};

const SCHOOL_NAME_MATCH: &str = r"s.name LIKE ? ESCAPE '\'";
const STUDENT_NAME_OR_ID_MATCH: &str = r"(s.first_name LIKE ? ESCAPE '\' OR s.last_name LIKE ? ESCAPE '\' OR s.student_id LIKE ? ESCAPE '\')";

const SCHOOL_COUNT_FROM: &str = "FROM schools s";
const STUDENT_COUNT_FROM: &str = "FROM students s";

const STUDENT_SELECT: &str = "SELECT s.student_id, s.first_name, s.last_name, s.grade, \
     s.gender, s.ethnicity, s.address, s.zip_code FROM students s";
const SEARCH_SELECT: &str = "SELECT s.student_id, s.first_name, s.last_name, s.grade, \
     s.gender, s.ethnicity, s.address, s.zip_code, sc.name AS school, sc.id AS school_id \
     FROM students s JOIN schools sc ON s.school_id = sc.id";

const BY_SCHOOL_NAME: &str = "s.name";
const BY_STUDENT_NAME: &str = "s.last_name, s.first_name, s.id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub students_count: i64,
    pub schools_count: i64,
}

#[derive(Clone)]
pub struct DirectoryService {
    storage: DirectoryStorage,
}

impl DirectoryService {
    pub fn new(storage: DirectoryStorage) -> Self {
        Self { storage }
    }

    pub async fn list_schools(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<SchoolSummary>, AspenError> {
        let mut filters = FilterSet::new();
        if let Some(term) = search {
            filters.and_contains(SCHOOL_NAME_MATCH, term);
        }
        self.paginate(SCHOOL_COUNT_FROM, SCHOOL_SELECT, BY_SCHOOL_NAME, &filters, page)
            .await
    }

    /// Unknown ids are dropped silently; an empty set never reaches storage.
    pub async fn favorite_schools(&self, ids: &[i64]) -> Result<Vec<SchoolSummary>, AspenError> {
        let ids: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.storage.schools_by_ids(&ids).await
    }

    /// Not Found when the school does not exist; an existing school with no
    /// matching students is an empty page.
    pub async fn school_students(
        &self,
        school_id: i64,
        filters: &StudentFilters,
        page: PageRequest,
    ) -> Result<SchoolStudentsResponse, AspenError> {
        let school = self
            .storage
            .school_ref(school_id)
            .await?
            .ok_or_else(AspenError::school_not_found)?;

        let filter_set = student_filters(school_id, filters);
        let page = self
            .paginate::<StudentRecord>(
                STUDENT_COUNT_FROM,
                STUDENT_SELECT,
                BY_STUDENT_NAME,
                &filter_set,
                page,
            )
            .await?;
        Ok(SchoolStudentsResponse::new(school, page))
    }

    pub async fn student(&self, student_id: &str) -> Result<StudentDetail, AspenError> {
        self.storage
            .student_by_external_id(student_id)
            .await?
            .ok_or_else(AspenError::student_not_found)
    }

    /// Distinct grade/gender/ethnicity values for a school. Unknown ids are
    /// not checked and simply produce three empty lists.
    pub async fn school_filters(&self, school_id: i64) -> Result<FilterOptions, AspenError> {
        Ok(FilterOptions {
            grades: self.storage.distinct_grades(school_id).await?,
            genders: self.storage.distinct_genders(school_id).await?,
            ethnicities: self.storage.distinct_ethnicities(school_id).await?,
        })
    }

    pub async fn search_students(
        &self,
        text: Option<&str>,
        school_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Page<SearchHit>, AspenError> {
        let text = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AspenError::Validation("Search query required".to_string()))?;

        let mut filters = FilterSet::new();
        filters
            .and_contains(STUDENT_NAME_OR_ID_MATCH, text)
            .and_opt("s.school_id = ?", school_id);
        self.paginate(STUDENT_COUNT_FROM, SEARCH_SELECT, BY_STUDENT_NAME, &filters, page)
            .await
    }

    /// Storage failure here means the service is down.
    pub async fn health(&self) -> Result<HealthReport, AspenError> {
        let (students_count, schools_count) = self
            .storage
            .table_counts()
            .await
            .map_err(|e| AspenError::StorageUnavailable(e.to_string()))?;
        Ok(HealthReport {
            status: "ok",
            students_count,
            schools_count,
        })
    }

    async fn paginate<T>(
        &self,
        count_from: &str,
        select: &str,
        order_by: &str,
        filters: &FilterSet,
        page: PageRequest,
    ) -> Result<Page<T>, AspenError>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> + Send + Unpin,
    {
        let total = self.storage.count(count_from, filters).await?;
        let rows = self
            .storage
            .fetch_page::<T>(select, filters, order_by, page)
            .await?;
        debug!(
            total,
            fetched = rows.len(),
            limit = page.limit(),
            offset = page.offset(),
            "paginated query"
        );
        Ok(page.finish(rows, total))
    }
}

/// Predicates for one school's student list, in a fixed order.
pub fn student_filters(school_id: i64, filters: &StudentFilters) -> FilterSet {
    let mut set = FilterSet::new();
    set.and("s.school_id = ?", school_id)
        .and_opt("s.grade = ?", filters.grade)
        .and_opt("s.gender = ?", filters.gender.as_deref())
        .and_opt("s.ethnicity = ?", filters.ethnicity.as_deref());
    if let Some(term) = filters.search.as_deref() {
        set.and_contains(STUDENT_NAME_OR_ID_MATCH, term);
    }
    set
}
