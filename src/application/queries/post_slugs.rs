//! Post slug enumeration for static path generation and existence probes.

use serde_json::json;

use crate::application::error::ContentError;
use crate::application::transport::{ContentTransport, GraphqlRequest};
use crate::cache::CachePolicy;
use crate::domain::entities::SlugRef;

use super::wire::{NodesOf, WireSlug, decode};

pub const PROBE_OPERATION: &str = "getPostSlug";
pub const ALL_OPERATION: &str = "getAllPostSlugs";

/// Upper bound on slugs returned by a full enumeration.
pub const ENUMERATION_LIMIT: u32 = 100;

const PROBE_QUERY: &str = r#"
query getPostSlug($slug: ID!) {
  post(id: $slug, idType: SLUG) {
    slug
  }
}
"#;

const ALL_QUERY: &str = r#"
query getAllPostSlugs($first: Int) {
  posts(first: $first) {
    nodes {
      slug
    }
  }
}
"#;

/// With a probe, `Some([slug])` if the post exists. Without one, up to
/// [`ENUMERATION_LIMIT`] slugs. `None` when the API returned nothing usable.
pub async fn post_slugs(
    transport: &dyn ContentTransport,
    probe: Option<&str>,
) -> Result<Option<Vec<SlugRef>>, ContentError> {
    match probe.filter(|slug| !slug.is_empty()) {
        Some(slug) => {
            let request =
                GraphqlRequest::new(PROBE_OPERATION, PROBE_QUERY, json!({ "slug": slug }));
            let mut response = transport.execute(request, &CachePolicy::POST_SLUGS).await?;
            response
                .take_field("post")
                .map(|post| {
                    decode::<WireSlug>(PROBE_OPERATION, post).map(|wire| vec![SlugRef::from(wire)])
                })
                .transpose()
        }
        None => {
            let request = GraphqlRequest::new(
                ALL_OPERATION,
                ALL_QUERY,
                json!({ "first": ENUMERATION_LIMIT }),
            );
            let mut response = transport.execute(request, &CachePolicy::POST_SLUGS).await?;
            response
                .take_field("posts")
                .map(|posts| {
                    decode::<NodesOf<WireSlug>>(ALL_OPERATION, posts)
                        .map(|list| list.nodes.into_iter().map(SlugRef::from).collect())
                })
                .transpose()
        }
    }
}
