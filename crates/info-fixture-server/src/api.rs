//! Request handlers
//!
//! Every request is answered by path prefix:
//! - `/info/{id}` - echoes the last `/`-separated piece of the request target
//!   (query string included) with the seeded rows
//! - `/randint/{n}` - a random number between 0 and 100
//! - anything else - `{"non-existing": true}`

use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Response},
    Json,
};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::storage::{QueryRow, INFO_QUERY};
use crate::AppState;

/// Where a request target leads
#[derive(Debug, PartialEq)]
pub enum Route<'a> {
    Info { result_id: &'a str },
    RandInt,
    NonExisting,
}

impl<'a> Route<'a> {
    /// Resolve a raw request target (path plus optional `?query`)
    pub fn resolve(target: &'a str) -> Self {
        if target.starts_with("/info/") {
            let result_id = target.rsplit('/').next().unwrap_or_default();
            Route::Info { result_id }
        } else if target.starts_with("/randint/") {
            Route::RandInt
        } else {
            Route::NonExisting
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub result_id: String,
    pub query_result: Vec<QueryRow>,
}

#[derive(Debug, Serialize)]
pub struct RandIntResponse {
    pub num: Generated,
}

#[derive(Debug, Serialize)]
pub struct Generated {
    pub generated: String,
}

#[derive(Debug, Serialize)]
pub struct NonExistingResponse {
    #[serde(rename = "non-existing")]
    pub non_existing: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check for test harnesses waiting on startup
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Answer a GET request according to its path prefix
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, ApiError> {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let request_id = Uuid::new_v4();
    let route = Route::resolve(target);

    tracing::debug!(
        request_id = %request_id,
        target = %target,
        route = ?route,
        "Incoming request"
    );

    let response = match route {
        Route::Info { result_id } => {
            let query_result = state.storage.query(INFO_QUERY).await?;
            Json(InfoResponse {
                result_id: result_id.to_string(),
                query_result,
            })
            .into_response()
        }
        Route::RandInt => Json(random_number()).into_response(),
        Route::NonExisting => Json(NonExistingResponse { non_existing: true }).into_response(),
    };

    Ok(response)
}

fn random_number() -> RandIntResponse {
    let n: u8 = rand::thread_rng().gen_range(0..=100);
    RandIntResponse {
        num: Generated { generated: n.to_string() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_resolution() {
        assert_eq!(Route::resolve("/info/42"), Route::Info { result_id: "42" });
        assert_eq!(Route::resolve("/info/a/b"), Route::Info { result_id: "b" });
        assert_eq!(Route::resolve("/info/"), Route::Info { result_id: "" });
        assert_eq!(Route::resolve("/randint/10"), Route::RandInt);
        assert_eq!(Route::resolve("/randint/"), Route::RandInt);
        assert_eq!(Route::resolve("/info"), Route::NonExisting);
        assert_eq!(Route::resolve("/"), Route::NonExisting);
        assert_eq!(Route::resolve("/other/info/1"), Route::NonExisting);
        assert_eq!(Route::resolve("/randint"), Route::NonExisting);
        assert_eq!(Route::resolve("/randintx/1"), Route::NonExisting);
    }

    #[test]
    fn test_route_keeps_query_string() {
        assert_eq!(
            Route::resolve("/info/7?verbose=1"),
            Route::Info { result_id: "7?verbose=1" }
        );
        assert_eq!(
            Route::resolve("/info/7?next=/a/b"),
            Route::Info { result_id: "b" }
        );
        assert_eq!(Route::resolve("/info?x=/1"), Route::NonExisting);
        assert_eq!(Route::resolve("/randint/5?seed=1"), Route::RandInt);
    }

    #[test]
    fn test_random_number_in_range() {
        for _ in 0..200 {
            let n: u32 = random_number().num.generated.parse().unwrap();
            assert!(n <= 100);
        }
    }

    #[test]
    fn test_non_existing_shape() {
        let body = serde_json::to_value(NonExistingResponse { non_existing: true }).unwrap();
        assert_eq!(body, serde_json::json!({ "non-existing": true }));
    }
}
