use axum::{
    Json,
    extract::{FromRequestParts, Path, Query, State},
    http::{StatusCode, header, request::Parts},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use reelvault_core::{Filters, RawFilters};

use crate::modules::movies::model::{CreateMovieDto, Movie, MovieListResponse, UpdateMovieDto};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Path id extractor that reads parse failures as 404: an id that does not
/// parse can never name a record, and it must reject before the body is
/// touched.
pub struct MovieId(pub Uuid);

impl<S> FromRequestParts<S> for MovieId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found())?;
        raw.parse().map(MovieId).map_err(|_| AppError::not_found())
    }
}

/// POST /v1/movies
pub async fn create_movie(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateMovieDto>,
) -> Result<impl IntoResponse, AppError> {
    let movie = state.movies.insert(dto).await?;

    let location = format!("/v1/movies/{}", movie.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(movie),
    ))
}

/// GET /v1/movies/{id}
pub async fn show_movie(
    State(state): State<AppState>,
    MovieId(id): MovieId,
) -> Result<Json<Movie>, AppError> {
    let movie = state.movies.get(id).await?;
    Ok(Json(movie))
}

/// PATCH /v1/movies/{id}
///
/// Partial update under optimistic concurrency: the record is re-read, the
/// supplied fields are merged in, and the write is guarded by the version
/// observed at the read. A racing writer makes this a 409.
pub async fn update_movie(
    State(state): State<AppState>,
    MovieId(id): MovieId,
    ValidatedJson(dto): ValidatedJson<UpdateMovieDto>,
) -> Result<Json<Movie>, AppError> {
    let mut movie = state.movies.get(id).await?;

    if let Some(title) = dto.title {
        movie.title = title;
    }
    if let Some(year) = dto.year {
        movie.year = year;
    }
    if let Some(runtime) = dto.runtime {
        movie.runtime = runtime;
    }
    if let Some(genres) = dto.genres {
        movie.genres = genres;
    }

    movie.version = state.movies.update(&movie).await?;
    Ok(Json(movie))
}

/// DELETE /v1/movies/{id}
pub async fn delete_movie(
    State(state): State<AppState>,
    MovieId(id): MovieId,
) -> Result<Json<serde_json::Value>, AppError> {
    state.movies.delete(id).await?;
    Ok(Json(json!({ "message": "movie successfully deleted" })))
}

/// GET /v1/movies
pub async fn list_movies(
    State(state): State<AppState>,
    Query(raw): Query<RawFilters>,
) -> Result<Json<MovieListResponse>, AppError> {
    let filters = Filters::parse(raw).map_err(AppError::failed_validation)?;
    let (movies, metadata) = state.movies.list(&filters).await?;

    Ok(Json(MovieListResponse { movies, metadata }))
}
