//! Category slug enumeration. Probes address a category by display name.

use serde_json::json;

use crate::application::error::ContentError;
use crate::application::transport::{ContentTransport, GraphqlRequest};
use crate::cache::CachePolicy;
use crate::domain::entities::SlugRef;

use super::post_slugs::ENUMERATION_LIMIT;
use super::wire::{NodesOf, WireSlug, decode};

pub const PROBE_OPERATION: &str = "getCategorySlug";
pub const ALL_OPERATION: &str = "getAllCategorySlugs";

const PROBE_QUERY: &str = r#"
query getCategorySlug($name: ID!) {
  category(id: $name, idType: NAME) {
    slug
  }
}
"#;

const ALL_QUERY: &str = r#"
query getAllCategorySlugs($first: Int) {
  categories(first: $first) {
    nodes {
      slug
    }
  }
}
"#;

pub async fn category_slugs(
    transport: &dyn ContentTransport,
    probe: Option<&str>,
) -> Result<Option<Vec<SlugRef>>, ContentError> {
    let Some(name) = probe.filter(|name| !name.is_empty()) else {
        let request = GraphqlRequest::new(
            ALL_OPERATION,
            ALL_QUERY,
            json!({ "first": ENUMERATION_LIMIT }),
        );
        let mut response = transport
            .execute(request, &CachePolicy::CATEGORY_SLUGS)
            .await?;
        return response
            .take_field("categories")
            .map(|categories| {
                decode::<NodesOf<WireSlug>>(ALL_OPERATION, categories)
                    .map(|list| list.nodes.into_iter().map(SlugRef::from).collect())
            })
            .transpose();
    };

    let request = GraphqlRequest::new(PROBE_OPERATION, PROBE_QUERY, json!({ "name": name }));
    let mut response = transport
        .execute(request, &CachePolicy::CATEGORY_SLUGS)
        .await?;
    response
        .take_field("category")
        .map(|category| {
            decode::<WireSlug>(PROBE_OPERATION, category).map(|wire| vec![SlugRef::from(wire)])
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::application::transport::testing::RecordingTransport;

    #[tokio::test]
    async fn probe_by_name() {
        let transport = RecordingTransport::new();
        transport.respond_with(json!({"category": {"slug": "world-news"}}));

        let slugs = category_slugs(&transport, Some("World News"))
            .await
            .expect("request");
        assert_eq!(slugs, Some(vec![SlugRef::new("world-news")]));

        let (request, policy) = transport.last_call();
        assert_eq!(request.variables, json!({"name": "World News"}));
        assert_eq!(policy, CachePolicy::CATEGORY_SLUGS);
    }

    #[tokio::test]
    async fn enumeration_without_data_is_none() {
        let transport = RecordingTransport::new();
        transport.respond_with(json!({}));

        assert_eq!(category_slugs(&transport, None).await.expect("request"), None);
        let (request, _) = transport.last_call();
        assert_eq!(request.operation, ALL_OPERATION);
        assert_eq!(request.variables["first"], json!(100));
    }
}
