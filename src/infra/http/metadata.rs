use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::application::{error::AppError, scope::RequestScope, seo::PostHead};

use super::{AppState, error::ApiError};

pub async fn post_metadata(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .content
        .get_post(&scope, &slug)
        .await?
        .ok_or(AppError::NotFound)?;

    let site = state.env.site(&state.site);
    Ok(Json(PostHead::for_post(&post, &site)))
}
