use crate::error::{AppError, Result};
use crate::model::{CreateLinkRequest, CreateLinkResponse, LinkResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::debug;

/// `POST /v1/links`
///
/// Answers `200 OK` for both new and already known URLs.
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<Json<CreateLinkResponse>> {
    let Json(request) = payload?;

    let short_code = state.shortener().submit(&request.url).await?;

    Ok(Json(CreateLinkResponse {
        short_url: state.short_url(&short_code),
        short_code,
        original_url: request.url,
    }))
}

/// `GET /v1/links/{short_code}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> Result<Json<LinkResponse>> {
    let link = state.shortener().lookup(&short_code).await?;
    Ok(Json(link.into()))
}

/// `GET /{short_code}`, answered with `307 Temporary Redirect`.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> Result<Response> {
    let url = state.shortener().resolve(&short_code).await?;

    let location = HeaderValue::from_bytes(url.as_bytes())
        .map_err(|_| AppError::InvalidLocation(url.clone()))?;

    debug!(code = %short_code, url = %url, "redirecting");
    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}
