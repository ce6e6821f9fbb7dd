//! Movie entity, the versioned catalog record.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::{ValidationError, ValidationErrors};

/// Earliest year accepted for a movie (first known motion picture).
pub const MIN_YEAR: i32 = 1888;
pub const MAX_TITLE_BYTES: usize = 500;
pub const MAX_GENRES: usize = 5;

/// A catalog movie.
///
/// `version` starts at 1 and increases by exactly one on every successful update.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
    pub version: i32,
}

impl Movie {
    /// Applies the provided patch fields, leaving the rest untouched.
    pub fn apply(&mut self, patch: MoviePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(runtime) = patch.runtime {
            self.runtime = runtime;
        }
        if let Some(genres) = patch.genres {
            self.genres = genres;
        }
    }

    /// Validates the editable fields of a stored movie (e.g. after a patch).
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_fields(&self.title, self.year, self.runtime, &self.genres)
    }
}

/// Input data for creating a movie.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
}

impl NewMovie {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_fields(&self.title, self.year, self.runtime, &self.genres)
    }
}

/// Partial update for an existing movie. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

fn check(errors: &mut ValidationErrors, ok: bool, field: &'static str, message: &'static str) {
    if !ok {
        errors.add(
            field,
            ValidationError::new("invalid").with_message(Cow::Borrowed(message)),
        );
    }
}

fn validate_fields(
    title: &str,
    year: i32,
    runtime: Runtime,
    genres: &[String],
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check(&mut errors, !title.is_empty(), "title", "must be provided");
    check(
        &mut errors,
        title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    check(&mut errors, year != 0, "year", "must be provided");
    check(
        &mut errors,
        year >= MIN_YEAR,
        "year",
        "must be greater than 1888",
    );
    check(
        &mut errors,
        year <= Utc::now().year(),
        "year",
        "must not be in the future",
    );

    check(&mut errors, runtime.0 != 0, "runtime", "must be provided");
    check(
        &mut errors,
        runtime.0 > 0,
        "runtime",
        "must be a positive integer",
    );

    check(
        &mut errors,
        !genres.is_empty(),
        "genres",
        "must contain at least 1 genre",
    );
    check(
        &mut errors,
        genres.len() <= MAX_GENRES,
        "genres",
        "must not contain more than 5 genres",
    );
    let unique: HashSet<&String> = genres.iter().collect();
    check(
        &mut errors,
        unique.len() == genres.len(),
        "genres",
        "must not contain duplicate values",
    );

    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Movie running time in minutes.
///
/// On the wire it is the string `"<n> mins"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Runtime(pub i32);

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mins", self.0)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        let minutes = raw
            .strip_suffix(" mins")
            .and_then(|n| n.parse::<i32>().ok())
            .ok_or_else(|| serde::de::Error::custom("invalid runtime format"))?;

        Ok(Runtime(minutes))
    }
}
