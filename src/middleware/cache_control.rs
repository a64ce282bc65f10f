use axum::{
    Json,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use headers::CacheControl;
use serde::Serialize;
use std::time::Duration;

/// JSON body sent with `Cache-Control: public, max-age=N`.
///
/// Only handlers' `Ok` values are wrapped, so error responses never carry the
/// header.
pub struct Cached<T> {
    max_age: Duration,
    body: T,
}

impl<T> Cached<T> {
    pub fn new(max_age: Duration, body: T) -> Self {
        Self { max_age, body }
    }
}

pub fn public_max_age(max_age: Duration) -> CacheControl {
    CacheControl::new().with_public().with_max_age(max_age)
}

impl<T> IntoResponse for Cached<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (TypedHeader(public_max_age(self.max_age)), Json(self.body)).into_response()
    }
}
