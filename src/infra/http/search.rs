use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;

use crate::application::queries::ListPostsParams;
use crate::domain::taxonomy::TaxonomyFilter;

use super::{AppState, error::ApiError};

const DEFAULT_HOW_MANY: u32 = 2;
const MAX_HOW_MANY: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub end_cursor: String,
    pub taxonomy: TaxonomyFilter,
    pub how_many: u32,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            end_cursor: String::new(),
            taxonomy: TaxonomyFilter::None,
            how_many: DEFAULT_HOW_MANY,
        }
    }
}

impl SearchRequest {
    fn into_params(self) -> Result<ListPostsParams, ApiError> {
        if !(1..=MAX_HOW_MANY).contains(&self.how_many) {
            return Err(ApiError::bad_request(
                "Invalid page size",
                Some(format!(
                    "howMany must be between 1 and {MAX_HOW_MANY}, got {}",
                    self.how_many
                )),
            ));
        }

        Ok(ListPostsParams {
            end_cursor: self.end_cursor,
            taxonomy: self.taxonomy,
            how_many: self.how_many,
            search: Some(self.query),
            cache: None,
        })
    }
}

/// Returns the listing page as-is; an empty query is a plain listing.
pub async fn search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let params = payload.into_params()?;
    let page = state.content.get_posts(&params).await?;
    Ok(Json(page))
}
