//! Posts sharing a category with the current one.

use serde_json::{Value, json};
use tracing::error;

use crate::application::error::ContentError;
use crate::application::transport::{ContentTransport, GraphqlRequest};
use crate::cache::CachePolicy;
use crate::domain::entities::PostSummary;
use crate::domain::pagination::PostConnection;

use super::wire::{WireConnection, WirePostNode, decode};

pub const OPERATION: &str = "getRelatedPosts";

pub const DEFAULT_PAGE_SIZE: u32 = 2;

const QUERY: &str = r#"
query getRelatedPosts($endCursor: String, $first: Int, $categories: [String], $exclude: [String]) {
  posts(
    after: $endCursor
    first: $first
    where: {
      orderby: { field: DATE, order: DESC }
      categoryNameIn: $categories
      notIn: $exclude
    }
  ) {
    nodes {
      date
      slug
      excerpt
      databaseId
      author { node { name } }
      featuredImage {
        node {
          mediaDetails {
            file
            sizes { sourceUrl height width }
          }
          altText
        }
      }
      categories { nodes { name slug } }
      title
    }
    pageInfo { endCursor hasPreviousPage hasNextPage startCursor }
  }
}
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedPostsParams {
    pub end_cursor: String,
    pub category_slugs: Vec<String>,
    pub how_many: u32,
    pub exclude_slug: String,
}

impl RelatedPostsParams {
    pub fn new(exclude_slug: impl Into<String>, category_slugs: Vec<String>) -> Self {
        Self {
            end_cursor: String::new(),
            category_slugs,
            how_many: DEFAULT_PAGE_SIZE,
            exclude_slug: exclude_slug.into(),
        }
    }

    fn variables(&self) -> Value {
        json!({
            "endCursor": self.end_cursor,
            "first": self.how_many,
            "categories": self.category_slugs,
            "exclude": [self.exclude_slug],
        })
    }
}

/// Same degradation rules as the main listing: a response without usable
/// posts becomes an empty page.
pub async fn related_posts(
    transport: &dyn ContentTransport,
    params: &RelatedPostsParams,
) -> Result<PostConnection, ContentError> {
    let request = GraphqlRequest::new(OPERATION, QUERY, params.variables());
    let mut response = transport
        .execute(request, &CachePolicy::RELATED_POSTS)
        .await?;

    let decoded = response
        .take_field("posts")
        .map(|posts| decode::<WireConnection<WirePostNode>>(OPERATION, posts));

    match decoded {
        Some(Ok(connection)) => Ok(connection.normalize(PostSummary::from)),
        Some(Err(err)) => {
            error!(
                target: "presswire::queries",
                operation = OPERATION,
                error = %err,
                "Related posts response was malformed; returning an empty page"
            );
            Ok(PostConnection::empty())
        }
        None => {
            error!(
                target: "presswire::queries",
                operation = OPERATION,
                errors = ?response.error_messages(),
                "Related posts response carried no posts; returning an empty page"
            );
            Ok(PostConnection::empty())
        }
    }
}
