use axum::extract::{Path, Query, State};

use crate::middleware::Cached;
use crate::types::student::{StudentResponse, StudentSearchQuery, StudentSearchResponse};
use crate::{AspenError, router::AspenState};

/// GET /api/students/{studentId}
pub async fn get_student(
    State(state): State<AspenState>,
    Path(student_id): Path<String>,
) -> Result<Cached<StudentResponse>, AspenError> {
    let student = state.directory.student(&student_id).await?;
    Ok(Cached::new(state.cache.student(), StudentResponse { student }))
}

/// GET /api/search/students
pub async fn search_students(
    State(state): State<AspenState>,
    Query(query): Query<StudentSearchQuery>,
) -> Result<Cached<StudentSearchResponse>, AspenError> {
    let page = state
        .directory
        .search_students(query.text(), query.school_id, query.page())
        .await?;
    Ok(Cached::new(state.cache.students(), page.into()))
}
