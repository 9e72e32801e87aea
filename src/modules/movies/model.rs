//! Movie entities and DTOs.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Utc};
use reelvault_core::Metadata;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Movie runtime in minutes, with the JSON form `"<n> mins"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Runtime(pub i32);

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{} mins", self.0))
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let minutes = text
            .strip_suffix(" mins")
            .and_then(|n| n.parse::<i32>().ok())
            .ok_or_else(|| serde::de::Error::custom("must be of the format \"<minutes> mins\""))?;
        Ok(Runtime(minutes))
    }
}

/// A catalog record.
///
/// `version` is the optimistic-concurrency stamp: it starts at 1 and goes up
/// by exactly one on every successful update, which is how concurrent edits
/// are detected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
    pub version: i32,
}

/// Payload for POST /v1/movies.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMovieDto {
    #[validate(length(min = 1, max = 500, message = "must be between 1 and 500 characters"))]
    pub title: String,
    #[validate(custom(function = validate_year))]
    pub year: i32,
    #[validate(custom(function = validate_runtime))]
    pub runtime: Runtime,
    #[validate(
        length(min = 1, max = 5, message = "must contain between 1 and 5 genres"),
        custom(function = validate_genres)
    )]
    pub genres: Vec<String>,
}

/// Payload for PATCH /v1/movies/{id}. Absent fields keep their stored value.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMovieDto {
    #[validate(length(min = 1, max = 500, message = "must be between 1 and 500 characters"))]
    pub title: Option<String>,
    #[validate(custom(function = validate_year))]
    pub year: Option<i32>,
    #[validate(custom(function = validate_runtime))]
    pub runtime: Option<Runtime>,
    #[validate(
        length(min = 1, max = 5, message = "must contain between 1 and 5 genres"),
        custom(function = validate_genres)
    )]
    pub genres: Option<Vec<String>>,
}

/// Response body for GET /v1/movies.
#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<Movie>,
    pub metadata: Metadata,
}

fn validation_error(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("invalid");
    err.message = Some(message.into());
    err
}

fn validate_year(year: i32) -> Result<(), ValidationError> {
    if year < 1888 {
        return Err(validation_error("must be greater than 1888"));
    }
    if year > Utc::now().year() {
        return Err(validation_error("must not be in the future"));
    }
    Ok(())
}

fn validate_runtime(runtime: &Runtime) -> Result<(), ValidationError> {
    if runtime.0 <= 0 {
        return Err(validation_error("must be a positive integer"));
    }
    Ok(())
}

fn validate_genres(genres: &[String]) -> Result<(), ValidationError> {
    let unique: HashSet<&str> = genres.iter().map(String::as_str).collect();
    if unique.len() != genres.len() {
        return Err(validation_error("must not contain duplicate values"));
    }
    if genres.iter().any(|genre| genre.is_empty()) {
        return Err(validation_error("must not contain empty values"));
    }
    Ok(())
}
