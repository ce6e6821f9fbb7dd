//! DTOs for the movie endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Movie, MoviePatch, NewMovie, Runtime};

/// Request body for `POST /v1/movies`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMovieRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub runtime: Runtime,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl From<CreateMovieRequest> for NewMovie {
    fn from(req: CreateMovieRequest) -> Self {
        NewMovie {
            title: req.title,
            year: req.year,
            runtime: req.runtime,
            genres: req.genres,
        }
    }
}

/// Request body for `PATCH /v1/movies/{id}`.
///
/// All fields are optional. Only provided fields are changed.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

impl From<UpdateMovieRequest> for MoviePatch {
    fn from(req: UpdateMovieRequest) -> Self {
        MoviePatch {
            title: req.title,
            year: req.year,
            runtime: req.runtime,
            genres: req.genres,
        }
    }
}

/// JSON representation of a movie.
#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub id: i64,
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
    pub version: i32,
}

impl From<Movie> for MovieResponse {
    fn from(movie: Movie) -> Self {
        MovieResponse {
            id: movie.id,
            title: movie.title,
            year: movie.year,
            runtime: movie.runtime,
            genres: movie.genres,
            version: movie.version,
        }
    }
}

/// `{"movie": {...}}`
#[derive(Debug, Serialize)]
pub struct MovieEnvelope {
    pub movie: MovieResponse,
}

impl From<Movie> for MovieEnvelope {
    fn from(movie: Movie) -> Self {
        MovieEnvelope {
            movie: movie.into(),
        }
    }
}

/// Response body for `GET /v1/movies`.
#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<MovieResponse>,
    pub metadata: super::pagination::Metadata,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
