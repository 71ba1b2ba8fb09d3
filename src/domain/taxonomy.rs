//! Taxonomy filter applied to post listings.

use serde::{Deserialize, Serialize};

/// Restricts a listing to one category or one tag, never both.
///
/// On the wire this is `null` or `{"key": "categoryName" | "tag", "value": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<TaxonomyPair>", into = "Option<TaxonomyPair>")]
pub enum TaxonomyFilter {
    #[default]
    None,
    Category(String),
    Tag(String),
}

impl TaxonomyFilter {
    pub fn category(name: impl Into<String>) -> Self {
        Self::Category(name.into())
    }

    pub fn tag(slug: impl Into<String>) -> Self {
        Self::Tag(slug.into())
    }

    pub fn category_name(&self) -> Option<&str> {
        match self {
            TaxonomyFilter::Category(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn tag_slug(&self) -> Option<&str> {
        match self {
            TaxonomyFilter::Tag(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value")]
pub enum TaxonomyPair {
    #[serde(rename = "categoryName")]
    CategoryName(String),
    #[serde(rename = "tag")]
    Tag(String),
}

impl From<Option<TaxonomyPair>> for TaxonomyFilter {
    fn from(pair: Option<TaxonomyPair>) -> Self {
        match pair {
            None => TaxonomyFilter::None,
            Some(TaxonomyPair::CategoryName(value)) => TaxonomyFilter::Category(value),
            Some(TaxonomyPair::Tag(value)) => TaxonomyFilter::Tag(value),
        }
    }
}

impl From<TaxonomyFilter> for Option<TaxonomyPair> {
    fn from(filter: TaxonomyFilter) -> Self {
        match filter {
            TaxonomyFilter::None => None,
            TaxonomyFilter::Category(value) => Some(TaxonomyPair::CategoryName(value)),
            TaxonomyFilter::Tag(value) => Some(TaxonomyPair::Tag(value)),
        }
    }
}
