//! Movie catalog service with optimistic concurrency.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{Movie, MoviePatch, NewMovie};
use crate::domain::repositories::{MovieFilter, MovieRepository};
use crate::error::AppError;

/// Message used for every missing movie.
pub const MOVIE_NOT_FOUND: &str = "the requested resource could not be found";

/// Service for reading and writing catalog movies.
///
/// Every update is a read-modify-write cycle guarded by the movie's version:
/// the write succeeds only if nobody changed the record since it was read.
pub struct MovieService<M: MovieRepository + ?Sized> {
    repository: Arc<M>,
}

impl<M: MovieRepository + ?Sized> MovieService<M> {
    pub fn new(repository: Arc<M>) -> Self {
        Self { repository }
    }

    /// Validates and stores a new movie.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] with per-field messages if any field is invalid.
    pub async fn create(&self, new_movie: NewMovie) -> Result<Movie, AppError> {
        new_movie.validate()?;

        let movie = self.repository.insert(new_movie).await?;
        tracing::info!(movie_id = movie.id, "Movie created");

        Ok(movie)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no movie has this id.
    pub async fn get(&self, id: i64) -> Result<Movie, AppError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn list(&self, filter: &MovieFilter) -> Result<(Vec<Movie>, i64), AppError> {
        self.repository.list(filter).await
    }

    /// Applies `patch` to the movie, guarded by its version.
    ///
    /// The movie is read first; a missing record is [`AppError::NotFound`]. When
    /// the client states `expected_version` and it differs from the stored
    /// version, the call fails with [`AppError::EditConflict`] without writing.
    /// The conditional write itself also reports [`AppError::EditConflict`]
    /// when another writer got there first.
    ///
    /// On success the returned movie carries the incremented version.
    pub async fn update_versioned(
        &self,
        id: i64,
        expected_version: Option<i32>,
        patch: MoviePatch,
    ) -> Result<Movie, AppError> {
        let mut movie = self.get(id).await?;

        if let Some(expected) = expected_version
            && expected != movie.version
        {
            tracing::debug!(
                movie_id = id,
                expected,
                stored = movie.version,
                "Stale version supplied"
            );
            return Err(AppError::EditConflict);
        }

        movie.apply(patch);
        movie.validate()?;

        match self.repository.update(&movie).await? {
            Some(version) => {
                movie.version = version;
                Ok(movie)
            }
            None => {
                tracing::info!(movie_id = id, "Edit conflict on movie update");
                Err(AppError::EditConflict)
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if nothing was deleted.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repository.delete(id).await? {
            return Err(not_found(id));
        }

        tracing::info!(movie_id = id, "Movie deleted");
        Ok(())
    }
}

fn not_found(id: i64) -> AppError {
    AppError::not_found(MOVIE_NOT_FOUND, json!({ "id": id }))
}
