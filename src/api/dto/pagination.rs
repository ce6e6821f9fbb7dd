//! Listing query parameters and pagination metadata.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::repositories::{MovieFilter, MovieSort};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE: u32 = 10_000_000;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for `GET /v1/movies`.
///
/// Uses `serde_with` to parse page numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MovieListParams {
    #[serde(default)]
    pub title: Option<String>,

    /// Comma-separated genre list.
    #[serde(default)]
    pub genres: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(range(min = 1, max = 10_000_000, message = "must be between 1 and 10000000"))]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub page_size: Option<u32>,

    #[serde(default)]
    pub sort: Option<String>,
}

impl MovieListParams {
    /// Validates the parameters and converts them to a repository filter.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `page_size`: 20
    /// - `sort`: `id`
    pub fn into_filter(self) -> Result<(MovieFilter, u32, u32), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let sort = match self.sort.as_deref() {
            None | Some("") => Some(MovieSort::default()),
            Some(key) => MovieSort::parse(key),
        };
        if sort.is_none() {
            errors.add(
                "sort",
                ValidationError::new("invalid").with_message(Cow::Borrowed("invalid sort value")),
            );
        }

        let (Some(sort), true) = (sort, errors.errors().is_empty()) else {
            return Err(errors);
        };

        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        let genres = self
            .genres
            .as_deref()
            .map(|g| {
                g.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let filter = MovieFilter {
            title: self.title.unwrap_or_default(),
            genres,
            sort,
            limit: i64::from(page_size),
            offset: (i64::from(page) - 1) * i64::from(page_size),
        };

        Ok((filter, page, page_size))
    }
}

/// Pagination metadata. Serializes as `{}` when there are no records.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

impl Metadata {
    pub fn calculate(total_records: i64, page: u32, page_size: u32) -> Self {
        if total_records == 0 {
            return Self::default();
        }

        let page_size = i64::from(page_size);

        Self {
            current_page: i64::from(page),
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}
