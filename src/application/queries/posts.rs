//! Paginated post listing with optional taxonomy filter and search.

use serde_json::{Map, Value, json};
use tracing::error;

use crate::application::error::ContentError;
use crate::application::transport::{ContentTransport, GraphqlRequest};
use crate::cache::CachePolicy;
use crate::domain::entities::PostSummary;
use crate::domain::pagination::PostConnection;
use crate::domain::taxonomy::TaxonomyFilter;

use super::wire::{WireConnection, WirePostNode, decode};

pub const OPERATION: &str = "getAllPosts";

pub const DEFAULT_PAGE_SIZE: u32 = 5;

const QUERY: &str = r#"
query getAllPosts(
  $endCursor: String
  $first: Int
  $search: String
  $categoryName: String
  $tag: String
) {
  posts(
    after: $endCursor
    first: $first
    where: {
      orderby: { field: DATE, order: DESC }
      search: $search
      categoryName: $categoryName
      tag: $tag
    }
  ) {
    nodes {
      date
      slug
      excerpt
      author { node { name } }
      databaseId
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

#[derive(Debug, Clone, PartialEq)]
pub struct ListPostsParams {
    pub end_cursor: String,
    pub taxonomy: TaxonomyFilter,
    pub how_many: u32,
    pub search: Option<String>,
    /// Caller preference; ignored whenever a search term is present.
    pub cache: Option<CachePolicy>,
}

impl Default for ListPostsParams {
    fn default() -> Self {
        Self {
            end_cursor: String::new(),
            taxonomy: TaxonomyFilter::None,
            how_many: DEFAULT_PAGE_SIZE,
            search: None,
            cache: None,
        }
    }
}

impl ListPostsParams {
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|term| !term.is_empty())
    }

    /// Search results are never served from cache.
    pub fn policy(&self) -> CachePolicy {
        if self.search_term().is_some() {
            return CachePolicy::DYNAMIC;
        }
        self.cache.clone().unwrap_or(CachePolicy::POSTS)
    }

    pub fn variables(&self) -> Value {
        let mut variables = Map::new();
        variables.insert("endCursor".into(), json!(self.end_cursor));
        variables.insert("first".into(), json!(self.how_many));
        if let Some(term) = self.search_term() {
            variables.insert("search".into(), json!(term));
        }
        match &self.taxonomy {
            TaxonomyFilter::None => {}
            TaxonomyFilter::Category(name) => {
                variables.insert("categoryName".into(), json!(name));
            }
            TaxonomyFilter::Tag(slug) => {
                variables.insert("tag".into(), json!(slug));
            }
        }
        Value::Object(variables)
    }
}

/// Fetch one page of posts.
///
/// Transport failures propagate. A response without a usable `posts` field
/// yields an empty page instead.
pub async fn list_posts(
    transport: &dyn ContentTransport,
    params: &ListPostsParams,
) -> Result<PostConnection, ContentError> {
    let request = GraphqlRequest::new(OPERATION, QUERY, params.variables());
    let mut response = transport.execute(request, &params.policy()).await?;

    let Some(posts) = response.take_field("posts") else {
        error!(
            target: "presswire::queries",
            operation = OPERATION,
            errors = ?response.error_messages(),
            "Listing response carried no posts; returning an empty page"
        );
        return Ok(PostConnection::empty());
    };

    match decode::<WireConnection<WirePostNode>>(OPERATION, posts) {
        Ok(connection) => Ok(connection.normalize(PostSummary::from)),
        Err(err) => {
            error!(
                target: "presswire::queries",
                operation = OPERATION,
                error = %err,
                "Listing response was malformed; returning an empty page"
            );
            Ok(PostConnection::empty())
        }
    }
}
