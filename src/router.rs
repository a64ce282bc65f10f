use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::config::CacheConfig;
use crate::db::DirectoryStorage;
use crate::handlers::{health, schools, students};
use crate::service::directory::DirectoryService;

#[derive(Clone)]
pub struct AspenState {
    pub directory: DirectoryService,
    pub cache: CacheConfig,
}

impl AspenState {
    pub fn new(storage: DirectoryStorage, cache: CacheConfig) -> Self {
        Self {
            directory: DirectoryService::new(storage),
            cache,
        }
    }
}

pub fn aspen_router(state: AspenState) -> Router {
    Router::new()
        .route("/api/schools", get(schools::list_schools))
        .route("/api/schools/favorites", post(schools::favorite_schools))
        .route("/api/schools/{id}/students", get(schools::school_students))
        .route("/api/schools/{id}/filters", get(schools::school_filters))
        .route("/api/students/{student_id}", get(students::get_student))
        .route("/api/search/students", get(students::search_students))
        .route("/api/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
