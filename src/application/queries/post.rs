use serde_json::json;

use crate::application::error::ContentError;
use crate::application::transport::{ContentTransport, GraphqlRequest};
use crate::cache::CachePolicy;
use crate::domain::entities::Post;

use super::wire::{WirePost, decode};

pub const OPERATION: &str = "getSinglePost";

const QUERY: &str = r#"
query getSinglePost($slug: ID!) {
  post(id: $slug, idType: SLUG) {
    content(format: RENDERED)
    modified
    slug
    title(format: RENDERED)
    databaseId
    featuredImage {
      node {
        mediaDetails {
          sizes { sourceUrl width height }
        }
        altText
      }
    }
    commentCount
    categories { nodes { name slug link } }
    date
    excerpt(format: RENDERED)
    author { node { name } }
    seo {
      title
      metaDesc
      opengraphTitle
      opengraphDescription
      opengraphUrl
      opengraphType
      opengraphSiteName
      opengraphPublisher
      opengraphPublishedTime
      opengraphModifiedTime
      readingTime
    }
  }
}
"#;

/// Load one post by slug. `None` when the API knows no such post.
pub async fn single_post(
    transport: &dyn ContentTransport,
    slug: &str,
) -> Result<Option<Post>, ContentError> {
    let request = GraphqlRequest::new(OPERATION, QUERY, json!({ "slug": slug }));
    let mut response = transport
        .execute(request, &CachePolicy::post(slug))
        .await?;

    response
        .take_field("post")
        .map(|post| decode::<WirePost>(OPERATION, post).map(Post::from))
        .transpose()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::application::transport::testing::RecordingTransport;

    #[tokio::test]
    async fn tags_request_with_post_slug() {
        let transport = RecordingTransport::new();
        transport.respond_with(json!({
            "post": {
                "databaseId": 12,
                "slug": "hello-world",
                "title": "Hello",
                "content": "<p>Body</p>",
                "excerpt": "<p>Short</p>",
                "date": "2024-05-01T10:00:00",
                "modified": "2024-05-02T10:00:00",
                "commentCount": null,
                "author": {"node": {"name": "Ada"}},
                "featuredImage": null,
                "categories": {"nodes": [{"name": "News", "slug": "news", "link": "https://cms/news"}]},
                "seo": {"title": "Hello | Blog", "readingTime": 3}
            }
        }));

        let post = single_post(&transport, "hello-world")
            .await
            .expect("request")
            .expect("post present");

        assert_eq!(post.database_id, 12);
        assert_eq!(post.comment_count, 0);
        assert_eq!(post.categories[0].link.as_deref(), Some("https://cms/news"));
        assert_eq!(post.seo.and_then(|seo| seo.reading_time), Some(3));

        let (request, policy) = transport.last_call();
        assert_eq!(request.variables, json!({"slug": "hello-world"}));
        assert_eq!(policy.tags().collect::<Vec<_>>(), vec!["post-hello-world"]);
    }

    #[tokio::test]
    async fn absent_post_is_none() {
        let transport = RecordingTransport::new();
        transport.respond_with(json!({"post": null}));

        let post = single_post(&transport, "missing").await.expect("request");
        assert!(post.is_none());
    }

    #[tokio::test]
    async fn malformed_post_is_a_decode_error() {
        let transport = RecordingTransport::new();
        transport.respond_with(json!({"post": {"title": "no slug"}}));

        let result = single_post(&transport, "broken").await;
        assert!(matches!(result, Err(ContentError::Decode { .. })));
    }
}
