//! Search-engine metadata: page titles, Open Graph, Twitter cards and JSON-LD.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::application::excerpt::excerpt;
use crate::domain::entities::Post;

const SCHEMA_CONTEXT: &str = "https://schema.org";
const TWITTER_CARD: &str = "summary_large_image";
const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Site-wide defaults used whenever a page does not supply its own values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub name: String,
    pub description: String,
    pub url: Url,
    pub author: String,
    pub keywords: String,
    pub locale: String,
    pub twitter_handle: Option<String>,
    pub default_image: String,
    pub default_image_width: u32,
    pub default_image_height: u32,
}

impl SiteSettings {
    /// Site root without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }

    pub fn page_url(&self, slug: &str) -> String {
        format!("{}/{}", self.base_url(), slug.trim_start_matches('/'))
    }

    pub fn default_title(&self) -> String {
        format!("{} - {}", self.name, self.description)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    #[default]
    Website,
    Article,
}

/// Page-specific values. Anything left `None` falls back to the site defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub kind: PageKind,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub author: Option<String>,
    pub keywords: Option<String>,
}

impl SeoInput {
    /// Metadata input for a post page. CMS overrides win over derived values.
    pub fn for_post(post: &Post, site: &SiteSettings) -> Self {
        let overrides = post.seo.clone().unwrap_or_default();
        let derived_description = non_blank(excerpt(&post.excerpt, true).trim().to_string());

        Self {
            title: overrides
                .opengraph_title
                .or_else(|| non_blank(post.title.clone())),
            description: overrides
                .meta_desc
                .or(overrides.opengraph_description)
                .or(derived_description),
            image: post
                .featured_image
                .as_ref()
                .and_then(|image| image.largest())
                .map(|size| size.source_url.clone()),
            url: Some(site.page_url(&post.slug)),
            kind: PageKind::Article,
            published_time: overrides
                .opengraph_published_time
                .or_else(|| non_blank(post.date.clone())),
            modified_time: overrides
                .opengraph_modified_time
                .or_else(|| non_blank(post.modified.clone())),
            author: Some(
                post.author_name
                    .clone()
                    .and_then(non_blank)
                    .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string()),
            ),
            keywords: None,
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraphImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraph {
    #[serde(rename = "type")]
    pub kind: PageKind,
    pub locale: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub site_name: String,
    pub images: Vec<OpenGraphImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitterCard {
    pub card: &'static str,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_graph: Option<OpenGraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<TwitterCard>,
}

impl PageMetadata {
    pub fn not_found() -> Self {
        Self {
            title: "Post Not Found".to_string(),
            description: "The requested post could not be found.".to_string(),
            keywords: None,
            canonical: None,
            open_graph: None,
            twitter: None,
        }
    }
}

pub fn build_metadata(site: &SiteSettings, input: SeoInput) -> PageMetadata {
    let title = match input.title {
        Some(title) => format!("{title} | {}", site.name),
        None => site.default_title(),
    };
    let description = input
        .description
        .unwrap_or_else(|| site.description.clone());
    let image = input
        .image
        .unwrap_or_else(|| site.default_image.clone());
    let url = input.url.unwrap_or_else(|| site.base_url().to_string());

    let (published_time, modified_time, authors) = match input.kind {
        PageKind::Article => (
            input.published_time,
            input.modified_time,
            vec![input.author.unwrap_or_else(|| site.author.clone())],
        ),
        PageKind::Website => (None, None, Vec::new()),
    };

    PageMetadata {
        open_graph: Some(OpenGraph {
            kind: input.kind,
            locale: site.locale.clone(),
            url: url.clone(),
            title: title.clone(),
            description: description.clone(),
            site_name: site.name.clone(),
            images: vec![OpenGraphImage {
                url: image.clone(),
                width: site.default_image_width,
                height: site.default_image_height,
                alt: title.clone(),
            }],
            published_time,
            modified_time,
            authors,
        }),
        twitter: Some(TwitterCard {
            card: TWITTER_CARD,
            title: title.clone(),
            description: description.clone(),
            images: vec![image],
            site: site.twitter_handle.clone(),
        }),
        keywords: Some(input.keywords.unwrap_or_else(|| site.keywords.clone())),
        canonical: Some(url),
        title,
        description,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredDataInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    /// Schema.org type; `WebPage` when absent.
    pub schema_type: Option<String>,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub author: Option<String>,
}

impl From<&SeoInput> for StructuredDataInput {
    fn from(input: &SeoInput) -> Self {
        Self {
            title: input.title.clone(),
            description: input.description.clone(),
            image: input.image.clone(),
            url: input.url.clone(),
            schema_type: match input.kind {
                PageKind::Article => Some("BlogPosting".to_string()),
                PageKind::Website => None,
            },
            published_time: input.published_time.clone(),
            modified_time: input.modified_time.clone(),
            author: input.author.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaEntity {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredData {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub author: SchemaEntity,
    pub publisher: SchemaEntity,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
}

pub fn build_structured_data(site: &SiteSettings, input: StructuredDataInput) -> StructuredData {
    StructuredData {
        context: SCHEMA_CONTEXT,
        kind: input.schema_type.unwrap_or_else(|| "WebPage".to_string()),
        name: input.title.unwrap_or_else(|| site.name.clone()),
        description: input
            .description
            .unwrap_or_else(|| site.description.clone()),
        url: input.url.unwrap_or_else(|| site.base_url().to_string()),
        author: SchemaEntity {
            kind: "Person",
            name: input.author.unwrap_or_else(|| site.author.clone()),
            url: None,
        },
        publisher: SchemaEntity {
            kind: "Organization",
            name: site.name.clone(),
            url: Some(site.base_url().to_string()),
        },
        image: input
            .image
            .unwrap_or_else(|| site.default_image.clone()),
        published_time: input.published_time,
        modified_time: input.modified_time,
    }
}

/// Everything a post page needs in its document head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostHead {
    pub metadata: PageMetadata,
    pub structured_data: StructuredData,
}

impl PostHead {
    pub fn for_post(post: &Post, site: &SiteSettings) -> Self {
        let input = SeoInput::for_post(post, site);
        let structured_data = build_structured_data(site, StructuredDataInput::from(&input));
        Self {
            metadata: build_metadata(site, input),
            structured_data,
        }
    }
}
