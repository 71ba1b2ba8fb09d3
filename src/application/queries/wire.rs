//! Raw WPGraphQL response shapes and their normalization into domain types.
//!
//! The API nests single relations under `node` and lists under `nodes`, and
//! serializes image dimensions as strings on some installs. Everything here
//! is lenient about absent fields so one sparse record does not sink a page.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::application::error::ContentError;
use crate::domain::comments::{Comment, PostComments};
use crate::domain::entities::{
    CategoryDetails, CategoryRef, FeaturedImage, ImageVariant, Post, PostSummary, SeoOverrides,
    SlugRef,
};
use crate::domain::pagination::{Connection, PageInfo};

pub(crate) fn decode<T: DeserializeOwned>(
    operation: &'static str,
    value: Value,
) -> Result<T, ContentError> {
    serde_json::from_value(value).map_err(|source| ContentError::Decode { operation, source })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(0),
        Some(NumberOrText::Number(value)) => u32::try_from(value).map_err(de::Error::custom),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(0),
        Some(NumberOrText::Text(text)) => text.trim().parse().map_err(de::Error::custom),
    }
}

fn lenient_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => {
            u32::try_from(value).map(Some).map_err(de::Error::custom)
        }
        Some(NumberOrText::Text(text)) => Ok(text.trim().parse().ok()),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeOf<T> {
    pub node: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodesOf<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireName {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireSize {
    pub source_url: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub width: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub height: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMediaDetails {
    pub file: Option<String>,
    pub sizes: Option<Vec<WireSize>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireMediaItem {
    pub media_details: Option<WireMediaDetails>,
    pub alt_text: Option<String>,
}

impl WireMediaItem {
    fn into_featured_image(self) -> FeaturedImage {
        let (file, sizes) = match self.media_details {
            Some(details) => (details.file, details.sizes.unwrap_or_default()),
            None => (None, Vec::new()),
        };
        FeaturedImage {
            alt_text: self.alt_text.filter(|alt| !alt.is_empty()),
            file,
            sizes: sizes
                .into_iter()
                .map(|size| ImageVariant {
                    source_url: size.source_url,
                    width: size.width,
                    height: size.height,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCategory {
    pub name: String,
    pub slug: String,
    pub link: Option<String>,
}

impl From<WireCategory> for CategoryRef {
    fn from(category: WireCategory) -> Self {
        Self {
            name: category.name,
            slug: category.slug,
            link: category.link,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePageInfo {
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub has_previous_page: bool,
    #[serde(default)]
    pub has_next_page: bool,
    pub start_cursor: Option<String>,
}

impl From<WirePageInfo> for PageInfo {
    fn from(info: WirePageInfo) -> Self {
        Self {
            end_cursor: info.end_cursor.unwrap_or_default(),
            has_previous_page: info.has_previous_page,
            has_next_page: info.has_next_page,
            start_cursor: info.start_cursor.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireConnection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
    pub page_info: Option<WirePageInfo>,
}

impl<T> WireConnection<T> {
    pub fn normalize<U>(self, convert: impl FnMut(T) -> U) -> Connection<U> {
        Connection {
            nodes: self.nodes.into_iter().map(convert).collect(),
            page_info: self.page_info.unwrap_or_default().into(),
        }
    }
}

fn author_name(author: Option<NodeOf<WireName>>) -> Option<String> {
    author
        .and_then(|author| author.node)
        .and_then(|node| node.name)
}

fn featured_image(image: Option<NodeOf<WireMediaItem>>) -> Option<FeaturedImage> {
    image
        .and_then(|image| image.node)
        .map(WireMediaItem::into_featured_image)
}

fn categories(categories: Option<NodesOf<WireCategory>>) -> Vec<CategoryRef> {
    categories
        .map(|list| list.nodes.into_iter().map(CategoryRef::from).collect())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePostNode {
    #[serde(default)]
    pub database_id: i64,
    pub slug: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    pub author: Option<NodeOf<WireName>>,
    pub featured_image: Option<NodeOf<WireMediaItem>>,
    pub categories: Option<NodesOf<WireCategory>>,
}

impl From<WirePostNode> for PostSummary {
    fn from(node: WirePostNode) -> Self {
        Self {
            database_id: node.database_id,
            slug: node.slug,
            title: node.title.unwrap_or_default(),
            excerpt: node.excerpt.unwrap_or_default(),
            date: node.date.unwrap_or_default(),
            author_name: author_name(node.author),
            featured_image: featured_image(node.featured_image),
            categories: categories(node.categories),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireSeo {
    pub title: Option<String>,
    pub meta_desc: Option<String>,
    pub opengraph_title: Option<String>,
    pub opengraph_description: Option<String>,
    pub opengraph_url: Option<String>,
    pub opengraph_type: Option<String>,
    pub opengraph_site_name: Option<String>,
    pub opengraph_publisher: Option<String>,
    pub opengraph_published_time: Option<String>,
    pub opengraph_modified_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub reading_time: Option<u32>,
}

impl From<WireSeo> for SeoOverrides {
    fn from(seo: WireSeo) -> Self {
        let present = |value: Option<String>| value.filter(|text| !text.trim().is_empty());
        Self {
            title: present(seo.title),
            meta_desc: present(seo.meta_desc),
            opengraph_title: present(seo.opengraph_title),
            opengraph_description: present(seo.opengraph_description),
            opengraph_url: present(seo.opengraph_url),
            opengraph_type: present(seo.opengraph_type),
            opengraph_site_name: present(seo.opengraph_site_name),
            opengraph_publisher: present(seo.opengraph_publisher),
            opengraph_published_time: present(seo.opengraph_published_time),
            opengraph_modified_time: present(seo.opengraph_modified_time),
            reading_time: seo.reading_time,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePost {
    #[serde(default)]
    pub database_id: i64,
    pub slug: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub date: Option<String>,
    pub modified: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub comment_count: u32,
    pub author: Option<NodeOf<WireName>>,
    pub featured_image: Option<NodeOf<WireMediaItem>>,
    pub categories: Option<NodesOf<WireCategory>>,
    pub seo: Option<WireSeo>,
}

impl From<WirePost> for Post {
    fn from(post: WirePost) -> Self {
        Self {
            database_id: post.database_id,
            slug: post.slug,
            title: post.title.unwrap_or_default(),
            content: post.content.unwrap_or_default(),
            excerpt: post.excerpt.unwrap_or_default(),
            date: post.date.unwrap_or_default(),
            modified: post.modified.unwrap_or_default(),
            comment_count: post.comment_count,
            author_name: author_name(post.author),
            featured_image: featured_image(post.featured_image),
            categories: categories(post.categories),
            seo: post.seo.map(SeoOverrides::from),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCategoryDetails {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub count: u32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

impl From<WireCategoryDetails> for CategoryDetails {
    fn from(category: WireCategoryDetails) -> Self {
        Self {
            slug: category.slug,
            name: category.name,
            description: category.description.unwrap_or_default(),
            count: category.count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireSlug {
    pub slug: String,
}

impl From<WireSlug> for SlugRef {
    fn from(wire: WireSlug) -> Self {
        SlugRef::new(wire.slug)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireComment {
    pub id: String,
    pub content: Option<String>,
    pub date: Option<String>,
    pub parent_id: Option<String>,
    pub author: Option<NodeOf<WireName>>,
}

impl From<WireComment> for Comment {
    fn from(comment: WireComment) -> Self {
        Self {
            id: comment.id,
            content: comment.content.unwrap_or_default(),
            date: comment.date.unwrap_or_default(),
            parent_id: comment.parent_id,
            author_name: author_name(comment.author),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePostComments {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub comment_count: u32,
    pub comments: Option<WireConnection<WireComment>>,
}

impl From<WirePostComments> for PostComments {
    fn from(wire: WirePostComments) -> Self {
        Self {
            comment_count: wire.comment_count,
            comments: wire
                .comments
                .map(|connection| connection.normalize(Comment::from))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMutationResult {
    #[serde(default)]
    pub success: bool,
}
