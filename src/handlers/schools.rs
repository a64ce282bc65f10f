use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::debug;

use crate::middleware::Cached;
use crate::types::school::{
    FavoriteSchoolsResponse, FavoritesRequest, FilterOptions, SchoolListQuery, SchoolListResponse,
};
use crate::types::student::{SchoolStudentsResponse, StudentListQuery};
use crate::{AspenError, router::AspenState};

/// GET /api/schools
pub async fn list_schools(
    State(state): State<AspenState>,
    Query(query): Query<SchoolListQuery>,
) -> Result<Cached<SchoolListResponse>, AspenError> {
    let page = state
        .directory
        .list_schools(query.search_term(), query.page())
        .await?;
    Ok(Cached::new(state.cache.schools(), page.into()))
}

/// POST /api/schools/favorites
pub async fn favorite_schools(
    State(state): State<AspenState>,
    Json(body): Json<FavoritesRequest>,
) -> Result<Cached<FavoriteSchoolsResponse>, AspenError> {
    debug!(requested = body.school_ids.len(), "favorite schools lookup");
    let schools = state.directory.favorite_schools(&body.school_ids).await?;
    Ok(Cached::new(
        state.cache.schools(),
        FavoriteSchoolsResponse { schools },
    ))
}

/// GET /api/schools/{id}/students
pub async fn school_students(
    State(state): State<AspenState>,
    Path(school_id): Path<i64>,
    Query(query): Query<StudentListQuery>,
) -> Result<Cached<SchoolStudentsResponse>, AspenError> {
    let resp = state
        .directory
        .school_students(school_id, &query.filters(), query.page())
        .await?;
    Ok(Cached::new(state.cache.students(), resp))
}

/// GET /api/schools/{id}/filters
pub async fn school_filters(
    State(state): State<AspenState>,
    Path(school_id): Path<i64>,
) -> Result<Cached<FilterOptions>, AspenError> {
    let options = state.directory.school_filters(school_id).await?;
    Ok(Cached::new(state.cache.filters(), options))
}
