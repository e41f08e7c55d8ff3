//! Movie handlers.
//!
//! # Data Flow
//! ```text
//! POST   /v1/movies       → StrictJson<MovieInput> → validate → insert → 201
//! GET    /v1/movies/{id}  → get → 200
//! PATCH  /v1/movies/{id}  → get → decode → apply → validate → update → 200
//! DELETE /v1/movies/{id}  → delete → 200
//! ```

use axum::body::Body;
use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;

use crate::data::{validate_movie, Movie, MovieInput};
use crate::http::error::ApiError;
use crate::http::extract::{MovieId, StrictJson};
use crate::http::server::AppState;
use crate::jsonio::{write_json, Envelope};

fn check(movie: &Movie, state: &AppState) -> Result<(), ApiError> {
    let v = validate_movie(movie, state.clock.as_ref());
    if v.is_valid() {
        Ok(())
    } else {
        Err(ApiError::FailedValidation(v.into_errors()))
    }
}

fn movie_response(
    status: StatusCode,
    movie: &Movie,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let envelope = Envelope::wrap("movie", movie)?;
    Ok(write_json(status, &envelope, headers)?)
}

pub async fn create_movie(
    State(state): State<AppState>,
    StrictJson(input): StrictJson<MovieInput>,
) -> Result<Response, ApiError> {
    let mut movie = input.into_movie();
    check(&movie, &state)?;

    state.movies.insert(&mut movie)?;
    tracing::info!(id = movie.id, title = %movie.title, "Movie created");

    let location = HeaderValue::try_from(format!("/v1/movies/{}", movie.id))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, location);

    movie_response(StatusCode::CREATED, &movie, headers)
}

pub async fn show_movie(
    State(state): State<AppState>,
    MovieId(id): MovieId,
) -> Result<Response, ApiError> {
    let movie = state.movies.get(id)?;
    movie_response(StatusCode::OK, &movie, HeaderMap::new())
}

/// Partial update. The record is looked up before the body is read, so a
/// missing id is a 404 whatever the body holds.
pub async fn update_movie(
    State(state): State<AppState>,
    MovieId(id): MovieId,
    body: Body,
) -> Result<Response, ApiError> {
    let mut movie = state.movies.get(id)?;

    let input: MovieInput = state.decoder.decode_body(body).await?;
    input.apply_to(&mut movie);
    check(&movie, &state)?;

    state.movies.update(&mut movie)?;
    tracing::info!(id = movie.id, version = movie.version, "Movie updated");

    movie_response(StatusCode::OK, &movie, HeaderMap::new())
}

pub async fn delete_movie(
    State(state): State<AppState>,
    MovieId(id): MovieId,
) -> Result<Response, ApiError> {
    state.movies.delete(id)?;
    tracing::info!(id, "Movie deleted");

    let envelope = Envelope::wrap("message", "movie successfully deleted")?;
    Ok(write_json(StatusCode::OK, &envelope, HeaderMap::new())?)
}
