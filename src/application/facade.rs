//! Single entry point for page handlers and the CLI.

use std::sync::Arc;

use tracing::warn;

use crate::application::error::{AppError, ContentError};
use crate::application::queries::{self, CommentsParams, ListPostsParams, RelatedPostsParams};
use crate::application::scope::RequestScope;
use crate::application::transport::ContentTransport;
use crate::cache::FetchCache;
use crate::domain::comments::{NewComment, PostComments};
use crate::domain::entities::{CategoryDetails, Post, SlugRef};
use crate::domain::pagination::PostConnection;
use crate::domain::taxonomy::TaxonomyFilter;

const SOURCE: &str = "application::facade::ContentApi";

#[derive(Clone)]
pub struct ContentApi {
    transport: Arc<dyn ContentTransport>,
    cache: Arc<FetchCache>,
}

impl ContentApi {
    pub fn new(transport: Arc<dyn ContentTransport>, cache: Arc<FetchCache>) -> Self {
        Self { transport, cache }
    }

    pub async fn get_posts(
        &self,
        params: &ListPostsParams,
    ) -> Result<PostConnection, ContentError> {
        queries::list_posts(self.transport.as_ref(), params).await
    }

    /// Memoized within `scope`.
    pub async fn get_post(
        &self,
        scope: &RequestScope,
        slug: &str,
    ) -> Result<Option<Post>, ContentError> {
        let transport = self.transport.as_ref();
        scope
            .post(slug, move || queries::single_post(transport, slug))
            .await
    }

    pub async fn get_post_paths(
        &self,
        probe: Option<&str>,
    ) -> Result<Option<Vec<SlugRef>>, ContentError> {
        queries::post_slugs(self.transport.as_ref(), probe).await
    }

    pub async fn get_related_posts(
        &self,
        params: &RelatedPostsParams,
    ) -> Result<PostConnection, ContentError> {
        queries::related_posts(self.transport.as_ref(), params).await
    }

    /// Memoized within `scope`.
    pub async fn get_category(
        &self,
        scope: &RequestScope,
        slug: &str,
    ) -> Result<Option<CategoryDetails>, ContentError> {
        let transport = self.transport.as_ref();
        scope
            .category(slug, move || queries::category_details(transport, slug))
            .await
    }

    pub async fn get_category_paths(
        &self,
        probe: Option<&str>,
    ) -> Result<Option<Vec<SlugRef>>, ContentError> {
        queries::category_slugs(self.transport.as_ref(), probe).await
    }

    pub async fn get_posts_by_category(
        &self,
        category_slug: &str,
        options: ListPostsParams,
    ) -> Result<PostConnection, ContentError> {
        let params = ListPostsParams {
            taxonomy: TaxonomyFilter::category(category_slug),
            ..options
        };
        self.get_posts(&params).await
    }

    pub async fn get_posts_by_tag(
        &self,
        tag_slug: &str,
        options: ListPostsParams,
    ) -> Result<PostConnection, ContentError> {
        let params = ListPostsParams {
            taxonomy: TaxonomyFilter::tag(tag_slug),
            ..options
        };
        self.get_posts(&params).await
    }

    /// Free-text search across all posts. Never filtered by taxonomy.
    pub async fn search_posts(
        &self,
        query: &str,
        options: ListPostsParams,
    ) -> Result<PostConnection, ContentError> {
        let params = ListPostsParams {
            search: Some(query.to_string()),
            taxonomy: TaxonomyFilter::None,
            ..options
        };
        self.get_posts(&params).await
    }

    pub async fn get_post_comments(
        &self,
        params: &CommentsParams,
    ) -> Result<Option<PostComments>, ContentError> {
        queries::post_comments(self.transport.as_ref(), params).await
    }

    pub async fn submit_comment(&self, comment: &NewComment) -> Result<bool, AppError> {
        comment.validate()?;
        Ok(queries::create_comment(self.transport.as_ref(), comment).await?)
    }

    /// Any failure counts as "does not exist".
    pub async fn post_exists(&self, slug: &str) -> bool {
        match self.get_post_paths(Some(slug)).await {
            Ok(found) => found.is_some_and(|slugs| !slugs.is_empty()),
            Err(err) => {
                warn!(
                    target: "presswire::facade",
                    source = SOURCE,
                    slug,
                    error = %err,
                    "Post existence probe failed"
                );
                false
            }
        }
    }

    /// Categories are probed by display name.
    pub async fn category_exists(&self, name: &str) -> bool {
        match self.get_category_paths(Some(name)).await {
            Ok(found) => found.is_some_and(|slugs| !slugs.is_empty()),
            Err(err) => {
                warn!(
                    target: "presswire::facade",
                    source = SOURCE,
                    category = name,
                    error = %err,
                    "Category existence probe failed"
                );
                false
            }
        }
    }

    /// Drop cached responses carrying any of `tags`. Returns the number removed.
    pub fn invalidate_tags<'a>(&self, tags: impl IntoIterator<Item = &'a str>) -> usize {
        self.cache.invalidate_tags(tags)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::application::transport::testing::RecordingTransport;
    use crate::cache::{CacheConfig, CachePolicy};

    fn api() -> (ContentApi, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let api = ContentApi::new(
            transport.clone(),
            Arc::new(FetchCache::new(&CacheConfig::default())),
        );
        (api, transport)
    }

    #[tokio::test]
    async fn category_listing_sets_category_filter() {
        let (api, transport) = api();

        api.get_posts_by_category("news", ListPostsParams::default())
            .await
            .expect("listing");

        let (request, _) = transport.last_call();
        assert_eq!(request.variables["categoryName"], json!("news"));
    }

    #[tokio::test]
    async fn tag_listing_replaces_any_category_filter() {
        let (api, transport) = api();
        let options = ListPostsParams {
            taxonomy: TaxonomyFilter::category("ignored"),
            how_many: 3,
            ..Default::default()
        };

        api.get_posts_by_tag("rust", options).await.expect("listing");

        let (request, _) = transport.last_call();
        assert_eq!(request.variables["tag"], json!("rust"));
        assert_eq!(request.variables["first"], json!(3));
        assert!(request.variables.get("categoryName").is_none());
    }

    #[tokio::test]
    async fn search_clears_taxonomy_and_skips_cache() {
        let (api, transport) = api();
        let options = ListPostsParams {
            taxonomy: TaxonomyFilter::tag("rust"),
            cache: Some(CachePolicy::POSTS),
            ..Default::default()
        };

        api.search_posts("async", options).await.expect("search");

        let (request, policy) = transport.last_call();
        assert_eq!(request.variables["search"], json!("async"));
        assert!(request.variables.get("tag").is_none());
        assert_eq!(policy, CachePolicy::DYNAMIC);
    }

    #[tokio::test]
    async fn get_post_is_deduplicated_within_a_scope() {
        let (api, transport) = api();
        transport.respond_with(json!({"post": {"slug": "hello", "title": "Hello"}}));
        let scope = RequestScope::default();

        let first = api.get_post(&scope, "hello").await.expect("first");
        let second = api.get_post(&scope, "hello").await.expect("second");

        assert_eq!(first, second);
        assert_eq!(transport.calls().len(), 1);

        let other_scope = RequestScope::default();
        api.get_post(&other_scope, "hello").await.expect("fresh scope");
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn existence_probes_swallow_failures() {
        let (api, transport) = api();
        transport
            .respond_with(json!({"post": {"slug": "hello"}}))
            .push(Err(ContentError::MissingEndpoint))
            .respond_with(json!({"category": null}));

        assert!(api.post_exists("hello").await);
        assert!(!api.post_exists("hello").await);
        assert!(!api.category_exists("Ghost").await);
    }

    #[tokio::test]
    async fn invalid_comment_never_reaches_transport() {
        let (api, transport) = api();
        let comment = NewComment {
            author: String::new(),
            author_email: "a@example.com".to_string(),
            post_id: 1,
            content: "hi".to_string(),
        };

        let result = api.submit_comment(&comment).await;
        assert!(matches!(result, Err(AppError::Domain(_))));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn invalidating_unknown_tags_is_a_no_op() {
        let (api, _) = api();
        assert_eq!(api.invalidate_tags(["posts", "post-hello"]), 0);
    }
}
