//! Relay-style connection types shared by every list operation.
//!
//! Cursors are opaque and only meaningful to the query that produced them.

use serde::{Deserialize, Serialize};

use super::entities::PostSummary;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: String,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub start_cursor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub nodes: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// A well-formed page with no nodes and no neighbours.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            page_info: PageInfo::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self::empty()
    }
}

pub type PostConnection = Connection<PostSummary>;
