use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header::AUTHORIZATION},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::info;

use crate::application::error::AppError;

use super::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct RevalidateRequest {
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevalidateResponse {
    pub revalidated: Vec<String>,
    pub evicted: usize,
    pub revalidated_at: String,
}

/// Out-of-band tag invalidation, e.g. from a CMS publish webhook.
pub async fn revalidate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RevalidateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(expected) = state.revalidate_token.as_deref() else {
        return Err(ApiError::not_found("Revalidation is disabled"));
    };
    let provided = extract_token(headers.get(AUTHORIZATION)).ok_or_else(ApiError::unauthorized)?;
    if provided.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() == 0 {
        return Err(ApiError::unauthorized());
    }

    let tags: Vec<String> = payload
        .tags
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();
    if tags.is_empty() {
        return Err(ApiError::bad_request(
            "No tags to revalidate",
            Some("provide at least one non-empty tag".to_string()),
        ));
    }

    let evicted = state
        .content
        .invalidate_tags(tags.iter().map(String::as_str));
    let revalidated_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| ApiError::from(AppError::unexpected(err.to_string())))?;

    info!(
        target: "presswire::http::revalidate",
        tags = ?tags,
        evicted,
        "Revalidated cache tags"
    );

    Ok(Json(RevalidateResponse {
        revalidated: tags,
        evicted,
        revalidated_at,
    }))
}

fn extract_token(header: Option<&HeaderValue>) -> Option<&str> {
    header?.to_str().ok()?.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bearer_token() {
        let value = HeaderValue::from_static("Bearer abc");
        assert_eq!(extract_token(Some(&value)), Some("abc"));
    }

    #[test]
    fn rejects_other_schemes() {
        let value = HeaderValue::from_static("Basic abc");
        assert_eq!(extract_token(Some(&value)), None);
        assert_eq!(extract_token(None), None);
    }
}
