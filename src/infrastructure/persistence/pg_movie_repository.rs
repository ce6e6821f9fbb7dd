//! PostgreSQL implementation of movie repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use super::with_timeout;
use crate::domain::entities::{Movie, NewMovie, Runtime};
use crate::domain::repositories::{MovieFilter, MovieRepository};
use crate::error::AppError;

/// PostgreSQL repository for the movie catalog.
///
/// Updates are conditional on the stored version, so two writers that read
/// the same version can never both succeed.
pub struct PgMovieRepository {
    pool: Arc<PgPool>,
    timeout: Duration,
}

impl PgMovieRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: i64,
    created_at: DateTime<Utc>,
    title: String,
    year: i32,
    runtime: i32,
    genres: Vec<String>,
    version: i32,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            created_at: row.created_at,
            title: row.title,
            year: row.year,
            runtime: Runtime(row.runtime),
            genres: row.genres,
            version: row.version,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ListedMovieRow {
    total: i64,
    #[sqlx(flatten)]
    movie: MovieRow,
}

#[async_trait]
impl MovieRepository for PgMovieRepository {
    async fn insert(&self, new_movie: NewMovie) -> Result<Movie, AppError> {
        let row = with_timeout(
            self.timeout,
            sqlx::query_as::<_, MovieRow>(
                r#"
                INSERT INTO movies (title, year, runtime, genres)
                VALUES ($1, $2, $3, $4)
                RETURNING id, created_at, title, year, runtime, genres, version
                "#,
            )
            .bind(&new_movie.title)
            .bind(new_movie.year)
            .bind(new_movie.runtime.0)
            .bind(&new_movie.genres)
            .fetch_one(self.pool.as_ref()),
        )
        .await?;

        Ok(row.into())
    }

    async fn get(&self, id: i64) -> Result<Option<Movie>, AppError> {
        if id < 1 {
            return Ok(None);
        }

        let row = with_timeout(
            self.timeout,
            sqlx::query_as::<_, MovieRow>(
                r#"
                SELECT id, created_at, title, year, runtime, genres, version
                FROM movies
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        Ok(row.map(Movie::from))
    }

    async fn list(&self, filter: &MovieFilter) -> Result<(Vec<Movie>, i64), AppError> {
        let direction = if filter.sort.descending { "DESC" } else { "ASC" };

        // Sort column comes from a closed enum, never from user text.
        let query = format!(
            r#"
            SELECT COUNT(*) OVER() AS total,
                   id, created_at, title, year, runtime, genres, version
            FROM movies
            WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
              AND (genres @> $2 OR $2 = '{{}}')
            ORDER BY {} {}, id ASC
            LIMIT $3 OFFSET $4
            "#,
            filter.sort.column.as_sql(),
            direction
        );

        let rows = with_timeout(
            self.timeout,
            sqlx::query_as::<_, ListedMovieRow>(&query)
                .bind(&filter.title)
                .bind(&filter.genres)
                .bind(filter.limit)
                .bind(filter.offset)
                .fetch_all(self.pool.as_ref()),
        )
        .await?;

        let total = rows.first().map(|r| r.total).unwrap_or(0);
        let movies = rows.into_iter().map(|r| Movie::from(r.movie)).collect();

        Ok((movies, total))
    }

    async fn update(&self, movie: &Movie) -> Result<Option<i32>, AppError> {
        let version = with_timeout(
            self.timeout,
            sqlx::query_scalar::<_, i32>(
                r#"
                UPDATE movies
                SET title = $1, year = $2, runtime = $3, genres = $4, version = version + 1
                WHERE id = $5 AND version = $6
                RETURNING version
                "#,
            )
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.runtime.0)
            .bind(&movie.genres)
            .bind(movie.id)
            .bind(movie.version)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        Ok(version)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        if id < 1 {
            return Ok(false);
        }

        let result = with_timeout(
            self.timeout,
            sqlx::query("DELETE FROM movies WHERE id = $1")
                .bind(id)
                .execute(self.pool.as_ref()),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
