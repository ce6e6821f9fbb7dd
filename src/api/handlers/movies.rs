//! Handlers for the movie catalog endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::movie::{
    CreateMovieRequest, MessageResponse, MovieEnvelope, MovieListResponse, UpdateMovieRequest,
};
use crate::api::dto::pagination::{Metadata, MovieListParams};
use crate::application::services::movie_service::MOVIE_NOT_FOUND;
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the version a client last read, for conditional updates.
pub const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

/// Parses the `{id}` path segment. Anything but a positive integer is a 404.
fn movie_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    match path {
        Ok(Path(id)) if id >= 1 => Ok(id),
        _ => Err(AppError::not_found(MOVIE_NOT_FOUND, json!({}))),
    }
}

fn expected_version(headers: &HeaderMap) -> Result<Option<i32>, AppError> {
    let Some(raw) = headers.get(EXPECTED_VERSION_HEADER) else {
        return Ok(None);
    };

    raw.to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i32>().ok())
        .filter(|v| *v >= 1)
        .map(Some)
        .ok_or_else(|| {
            AppError::bad_request(
                "Invalid expected version",
                json!({ "header": "X-Expected-Version", "reason": "must be a positive integer" }),
            )
        })
}

/// Lists movies with filtering, sorting and pagination.
///
/// # Endpoint
///
/// `GET /v1/movies?title=&genres=&page=&page_size=&sort=`
///
/// # Errors
///
/// Returns 400 Bad Request if a query parameter is invalid.
pub async fn list_movies_handler(
    State(state): State<AppState>,
    params: Result<Query<MovieListParams>, QueryRejection>,
) -> Result<Json<MovieListResponse>, AppError> {
    let Query(params) = params.map_err(|e| {
        AppError::bad_request("Invalid query string", json!({ "reason": e.body_text() }))
    })?;

    let (filter, page, page_size) = params.into_filter()?;
    let (movies, total) = state.movie_service.list(&filter).await?;

    Ok(Json(MovieListResponse {
        movies: movies.into_iter().map(Into::into).collect(),
        metadata: Metadata::calculate(total, page, page_size),
    }))
}

/// Returns a single movie.
///
/// # Endpoint
///
/// `GET /v1/movies/{id}`
pub async fn show_movie_handler(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MovieEnvelope>, AppError> {
    let id = movie_id(path)?;
    let movie = state.movie_service.get(id).await?;

    Ok(Json(movie.into()))
}

/// Creates a movie.
///
/// # Endpoint
///
/// `POST /v1/movies`
///
/// # Request Body
///
/// ```json
/// {"title": "Moana", "year": 2016, "runtime": "107 mins", "genres": ["animation", "adventure"]}
/// ```
///
/// # Response
///
/// `201 Created` with a `Location` header pointing at the new movie.
pub async fn create_movie_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateMovieRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;

    let movie = state.movie_service.create(payload.into()).await?;

    let location = HeaderValue::from_str(&format!("/v1/movies/{}", movie.id))
        .map_err(|e| AppError::internal(format!("invalid location header: {e}")))?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(MovieEnvelope::from(movie)),
    )
        .into_response())
}

/// Partially updates a movie under optimistic locking.
///
/// # Endpoint
///
/// `PATCH /v1/movies/{id}`
///
/// # Headers
///
/// `X-Expected-Version` (optional) - the version the client last read. When
/// omitted, the version read by this request is used.
///
/// # Errors
///
/// - 404 Not Found if the movie doesn't exist
/// - 409 Conflict if the movie changed since it was read
/// - 400 Bad Request if the patched movie is invalid
pub async fn update_movie_handler(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    headers: HeaderMap,
    payload: Result<Json<UpdateMovieRequest>, JsonRejection>,
) -> Result<Json<MovieEnvelope>, AppError> {
    let id = movie_id(path)?;
    let expected = expected_version(&headers)?;
    let Json(payload) = payload?;

    let movie = state
        .movie_service
        .update_versioned(id, expected, payload.into())
        .await?;

    Ok(Json(movie.into()))
}

/// Deletes a movie.
///
/// # Endpoint
///
/// `DELETE /v1/movies/{id}`
pub async fn delete_movie_handler(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = movie_id(path)?;
    state.movie_service.delete(id).await?;

    Ok(Json(MessageResponse {
        message: "movie successfully deleted",
    }))
}
