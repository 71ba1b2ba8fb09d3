//! Content entities normalized from the remote content API.
//!
//! The remote API is the source of truth; these records carry no behaviour and
//! are rebuilt on every fetch.

use serde::{Deserialize, Serialize};

/// One rendition of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVariant {
    pub source_url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedImage {
    pub alt_text: Option<String>,
    pub file: Option<String>,
    pub sizes: Vec<ImageVariant>,
}

impl FeaturedImage {
    /// The largest rendition, which the API lists last.
    pub fn largest(&self) -> Option<&ImageVariant> {
        self.sizes.last()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A post as it appears in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub database_id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub date: String,
    pub author_name: Option<String>,
    pub featured_image: Option<FeaturedImage>,
    pub categories: Vec<CategoryRef>,
}

/// Search-engine overrides attached to a post by the CMS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoOverrides {
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
    pub reading_time: Option<u32>,
}

/// A fully loaded post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub database_id: i64,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub date: String,
    pub modified: String,
    pub comment_count: u32,
    pub author_name: Option<String>,
    pub featured_image: Option<FeaturedImage>,
    pub categories: Vec<CategoryRef>,
    pub seo: Option<SeoOverrides>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetails {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub count: u32,
}

/// A bare slug, as returned by slug enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlugRef {
    pub slug: String,
}

impl SlugRef {
    pub fn new(slug: impl Into<String>) -> Self {
        Self { slug: slug.into() }
    }
}
