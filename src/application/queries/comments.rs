use serde_json::{Value, json};

use crate::application::error::ContentError;
use crate::application::transport::{ContentTransport, GraphqlRequest};
use crate::cache::CachePolicy;
use crate::domain::comments::PostComments;

use super::wire::{WirePostComments, decode};

pub const OPERATION: &str = "getComments";

/// Comments per page; threads are paged backwards from `before`.
pub const PAGE_SIZE: u32 = 10;

const QUERY: &str = r#"
query getComments($slug: ID!, $before: String, $first: Int) {
  post(id: $slug, idType: SLUG) {
    commentCount
    comments(where: { order: ASC, orderby: COMMENT_DATE }, first: $first, before: $before) {
      nodes {
        content
        author { node { name } }
        date
        parentId
        id
      }
      pageInfo { endCursor hasNextPage hasPreviousPage startCursor }
    }
  }
}
"#;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentsParams {
    pub slug: String,
    pub start_cursor: String,
}

impl CommentsParams {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            start_cursor: String::new(),
        }
    }

    fn variables(&self) -> Value {
        let before = (!self.start_cursor.is_empty()).then_some(self.start_cursor.as_str());
        json!({
            "slug": self.slug,
            "before": before,
            "first": PAGE_SIZE,
        })
    }
}

/// Comments are always fetched fresh.
pub async fn post_comments(
    transport: &dyn ContentTransport,
    params: &CommentsParams,
) -> Result<Option<PostComments>, ContentError> {
    let request = GraphqlRequest::new(OPERATION, QUERY, params.variables());
    let mut response = transport.execute(request, &CachePolicy::DYNAMIC).await?;

    response
        .take_field("post")
        .map(|post| decode::<WirePostComments>(OPERATION, post).map(PostComments::from))
        .transpose()
}
