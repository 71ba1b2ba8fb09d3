//! Per-request memoization of single-entity lookups.
//!
//! A scope lives exactly as long as one inbound request (or one CLI command).
//! Page rendering asks for the same post from several places; the scope makes
//! sure only the first ask reaches the content API. Concurrent asks share the
//! in-flight fetch. Failed fetches are not remembered, so a later ask retries.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::application::error::ContentError;
use crate::domain::entities::{CategoryDetails, Post};

type Cells<T> = DashMap<String, Arc<OnceCell<T>>>;

#[derive(Default)]
struct ScopeState {
    posts: Cells<Option<Post>>,
    categories: Cells<Option<CategoryDetails>>,
}

/// Request-scoped memo keyed by operation and slug. Cloning shares the memo.
#[derive(Clone)]
pub struct RequestScope {
    id: Uuid,
    state: Arc<ScopeState>,
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new(Uuid::new_v4())
    }
}

impl RequestScope {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            state: Arc::new(ScopeState::default()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) async fn post<F, Fut>(
        &self,
        slug: &str,
        fetch: F,
    ) -> Result<Option<Post>, ContentError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Post>, ContentError>>,
    {
        memoize(&self.state.posts, slug, fetch).await
    }

    pub(crate) async fn category<F, Fut>(
        &self,
        slug: &str,
        fetch: F,
    ) -> Result<Option<CategoryDetails>, ContentError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<CategoryDetails>, ContentError>>,
    {
        memoize(&self.state.categories, slug, fetch).await
    }

    /// Number of lookups already answered within this scope.
    pub fn memoized(&self) -> usize {
        settled(&self.state.posts) + settled(&self.state.categories)
    }
}

fn settled<T>(cells: &Cells<T>) -> usize {
    cells
        .iter()
        .filter(|entry| entry.value().initialized())
        .count()
}

async fn memoize<T, F, Fut>(cells: &Cells<T>, slug: &str, fetch: F) -> Result<T, ContentError>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ContentError>>,
{
    // The map guard must not be held across the await below.
    let cell = Arc::clone(&cells.entry(slug.to_string()).or_default());
    cell.get_or_try_init(fetch).await.cloned()
}
