//! Repository trait for the movie catalog.

use crate::domain::entities::{Movie, NewMovie};
use crate::error::AppError;
use async_trait::async_trait;

/// Column a movie listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Title,
    Year,
    Runtime,
}

impl SortColumn {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Title => "title",
            SortColumn::Year => "year",
            SortColumn::Runtime => "runtime",
        }
    }
}

/// Listing order. Ties are always broken by ascending `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieSort {
    pub column: SortColumn,
    pub descending: bool,
}

impl Default for MovieSort {
    fn default() -> Self {
        Self {
            column: SortColumn::Id,
            descending: false,
        }
    }
}

impl MovieSort {
    /// Parses a sort key such as `title` or `-year`.
    ///
    /// Returns `None` for keys outside the allowed list.
    pub fn parse(key: &str) -> Option<Self> {
        let (descending, name) = match key.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, key),
        };

        let column = match name {
            "id" => SortColumn::Id,
            "title" => SortColumn::Title,
            "year" => SortColumn::Year,
            "runtime" => SortColumn::Runtime,
            _ => return None,
        };

        Some(Self { column, descending })
    }
}

/// Filters and paging for [`MovieRepository::list`].
#[derive(Debug, Clone, PartialEq)]
pub struct MovieFilter {
    /// Title search terms. Empty matches everything.
    pub title: String,
    /// Every listed genre must be present on the movie. Empty matches everything.
    pub genres: Vec<String>,
    pub sort: MovieSort,
    pub limit: i64,
    pub offset: i64,
}

/// Repository interface for the catalog store.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMovieRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Inserts a movie and returns it with its id, creation time and version 1.
    async fn insert(&self, new_movie: NewMovie) -> Result<Movie, AppError>;

    /// Finds a movie by id.
    async fn get(&self, id: i64) -> Result<Option<Movie>, AppError>;

    /// Returns one page of movies and the total number of matching records.
    async fn list(&self, filter: &MovieFilter) -> Result<(Vec<Movie>, i64), AppError>;

    /// Writes `movie` if and only if the stored version still equals `movie.version`.
    ///
    /// The match on id and version and the increment happen in one statement.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(new_version))` when a row was updated
    /// - `Ok(None)` when no row matched
    async fn update(&self, movie: &Movie) -> Result<Option<i32>, AppError>;

    /// Deletes a movie. Returns `Ok(false)` when nothing was deleted.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
