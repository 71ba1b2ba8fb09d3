use serde_json::json;

use crate::application::error::ContentError;
use crate::application::transport::{ContentTransport, GraphqlRequest};
use crate::cache::CachePolicy;
use crate::domain::entities::CategoryDetails;

use super::wire::{WireCategoryDetails, decode};

pub const OPERATION: &str = "getCategoryDetails";

const QUERY: &str = r#"
query getCategoryDetails($slug: ID!) {
  category(id: $slug, idType: SLUG) {
    count
    name
    slug
    description
  }
}
"#;

pub async fn category_details(
    transport: &dyn ContentTransport,
    slug: &str,
) -> Result<Option<CategoryDetails>, ContentError> {
    let request = GraphqlRequest::new(OPERATION, QUERY, json!({ "slug": slug }));
    let mut response = transport
        .execute(request, &CachePolicy::category(slug))
        .await?;

    response
        .take_field("category")
        .map(|category| {
            decode::<WireCategoryDetails>(OPERATION, category).map(CategoryDetails::from)
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::application::transport::testing::RecordingTransport;

    #[tokio::test]
    async fn loads_details_under_category_tag() {
        let transport = RecordingTransport::new();
        transport.respond_with(json!({
            "category": {"count": 4, "name": "News", "slug": "news", "description": null}
        }));

        let category = category_details(&transport, "news")
            .await
            .expect("request")
            .expect("category");
        assert_eq!(category.count, 4);
        assert_eq!(category.description, "");

        let (_, policy) = transport.last_call();
        assert_eq!(policy.tags().collect::<Vec<_>>(), vec!["category-news"]);
    }

    #[tokio::test]
    async fn unknown_category_is_none() {
        let transport = RecordingTransport::new();
        transport.respond_with(json!({"category": null}));

        let category = category_details(&transport, "ghost").await.expect("request");
        assert!(category.is_none());
    }
}
