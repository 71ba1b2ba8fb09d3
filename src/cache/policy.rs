//! Named cache strategies.
//!
//! The table is compile-time constant data. Query modules pick one entry per
//! call; the per-entity generators only differ in the tag they attach.

use std::{borrow::Cow, time::Duration};

pub const ONE_HOUR: Duration = Duration::from_secs(3_600);
pub const ONE_DAY: Duration = Duration::from_secs(86_400);
pub const ONE_WEEK: Duration = Duration::from_secs(604_800);

pub const POSTS_TAG: &str = "posts";
pub const RELATED_POSTS_TAG: &str = "related-posts";
pub const POST_SLUGS_TAG: &str = "post-slugs";
pub const CATEGORY_SLUGS_TAG: &str = "category-slugs";

const POSTS_TAGS: &[Cow<'static, str>] = &[Cow::Borrowed(POSTS_TAG)];
const RELATED_POSTS_TAGS: &[Cow<'static, str>] = &[Cow::Borrowed(RELATED_POSTS_TAG)];
const POST_SLUGS_TAGS: &[Cow<'static, str>] = &[Cow::Borrowed(POST_SLUGS_TAG)];
const CATEGORY_SLUGS_TAGS: &[Cow<'static, str>] = &[Cow::Borrowed(CATEGORY_SLUGS_TAG)];
const NO_TAGS: &[Cow<'static, str>] = &[];

/// Process-wide policy table, indexed by `PolicyName`.
static POLICY_TABLE: [CachePolicy; 8] = [
    CachePolicy::DEFAULT,
    CachePolicy::DYNAMIC,
    CachePolicy::BUILD,
    CachePolicy::POSTS,
    CachePolicy::RELATED_POSTS,
    CachePolicy::POST_SLUGS,
    CachePolicy::CATEGORY_SLUGS,
    CachePolicy::PINNED,
];

/// How long a stored response stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revalidate {
    After(Duration),
    /// Fresh until evicted or invalidated by tag.
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Bypass the cache in both directions.
    NoStore,
    Revalidate(Revalidate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyName {
    Default,
    Dynamic,
    Build,
    Posts,
    RelatedPosts,
    PostSlugs,
    CategorySlugs,
    Pinned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    name: &'static str,
    mode: CacheMode,
    tags: Cow<'static, [Cow<'static, str>]>,
}

impl CachePolicy {
    /// Standard incremental cache: one hour, untagged.
    pub const DEFAULT: CachePolicy = CachePolicy::fixed("default", revalidate(ONE_HOUR), NO_TAGS);

    /// Always fresh. Used for search and comments.
    pub const DYNAMIC: CachePolicy = CachePolicy::fixed("dynamic", CacheMode::NoStore, NO_TAGS);

    /// Long-lived cache for static path generation.
    pub const BUILD: CachePolicy = CachePolicy::fixed("build", revalidate(ONE_DAY), NO_TAGS);

    pub const POSTS: CachePolicy = CachePolicy::fixed(
        "posts",
        revalidate(ONE_HOUR),
        POSTS_TAGS,
    );

    pub const RELATED_POSTS: CachePolicy = CachePolicy::fixed(
        "related-posts",
        revalidate(ONE_HOUR),
        RELATED_POSTS_TAGS,
    );

    pub const POST_SLUGS: CachePolicy = CachePolicy::fixed(
        "post-slugs",
        revalidate(ONE_DAY),
        POST_SLUGS_TAGS,
    );

    pub const CATEGORY_SLUGS: CachePolicy = CachePolicy::fixed(
        "category-slugs",
        revalidate(ONE_DAY),
        CATEGORY_SLUGS_TAGS,
    );

    /// Kept until evicted or dropped through `invalidate_all`.
    pub const PINNED: CachePolicy = CachePolicy::fixed(
        "pinned",
        CacheMode::Revalidate(Revalidate::Never),
        NO_TAGS,
    );

    const fn fixed(
        name: &'static str,
        mode: CacheMode,
        tags: &'static [Cow<'static, str>],
    ) -> Self {
        Self {
            name,
            mode,
            tags: Cow::Borrowed(tags),
        }
    }

    /// Look up a fixed policy by name.
    pub fn named(name: PolicyName) -> &'static CachePolicy {
        let index = match name {
            PolicyName::Default => 0,
            PolicyName::Dynamic => 1,
            PolicyName::Build => 2,
            PolicyName::Posts => 3,
            PolicyName::RelatedPosts => 4,
            PolicyName::PostSlugs => 5,
            PolicyName::CategorySlugs => 6,
            PolicyName::Pinned => 7,
        };
        &POLICY_TABLE[index]
    }

    /// One post, invalidated on its own through `post-<slug>`.
    pub fn post(slug: &str) -> Self {
        Self::tagged("post", revalidate(ONE_HOUR), post_tag(slug))
    }

    /// One category, invalidated on its own through `category-<slug>`.
    pub fn category(slug: &str) -> Self {
        Self::tagged("category", revalidate(ONE_HOUR), category_tag(slug))
    }

    fn tagged(name: &'static str, mode: CacheMode, tag: String) -> Self {
        Self {
            name,
            mode,
            tags: Cow::Owned(vec![Cow::Owned(tag)]),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|tag| &**tag)
    }

    pub fn is_no_store(&self) -> bool {
        matches!(self.mode, CacheMode::NoStore)
    }

    /// Freshness window for stored responses; `None` for no-store.
    pub fn revalidate(&self) -> Option<Revalidate> {
        match self.mode {
            CacheMode::NoStore => None,
            CacheMode::Revalidate(window) => Some(window),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const fn revalidate(duration: Duration) -> CacheMode {
    CacheMode::Revalidate(Revalidate::After(duration))
}

pub fn post_tag(slug: &str) -> String {
    format!("post-{slug}")
}

pub fn category_tag(slug: &str) -> String {
    format!("category-{slug}")
}
