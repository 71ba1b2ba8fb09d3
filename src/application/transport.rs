//! Seam between the query modules and whatever executes GraphQL requests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::error::ContentError;
use crate::cache::CachePolicy;

/// One GraphQL operation ready to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    /// Operation name, used for logging and error context only.
    #[serde(skip)]
    pub operation: &'static str,
    pub query: &'static str,
    pub variables: Value,
}

impl GraphqlRequest {
    pub fn new(operation: &'static str, query: &'static str, variables: Value) -> Self {
        Self {
            operation,
            query,
            variables,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlErrorEntry {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<ErrorLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
}

/// Response envelope. `data` and `errors` may both be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlResponse<T = Value> {
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlErrorEntry>,
}

impl<T> Default for GraphqlResponse<T> {
    fn default() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
        }
    }
}

impl<T> GraphqlResponse<T> {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<&str> {
        self.errors.iter().map(|entry| entry.message.as_str()).collect()
    }
}

impl GraphqlResponse<Value> {
    /// Remove a top-level field from `data`. JSON `null` counts as absent.
    pub fn take_field(&mut self, name: &str) -> Option<Value> {
        match self.data.as_mut()?.get_mut(name)?.take() {
            Value::Null => None,
            value => Some(value),
        }
    }
}

/// Executes GraphQL requests against the content API.
#[async_trait]
pub trait ContentTransport: Send + Sync {
    async fn execute(
        &self,
        request: GraphqlRequest,
        policy: &CachePolicy,
    ) -> Result<GraphqlResponse, ContentError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Records every call and answers from a queue of canned results.
    #[derive(Default)]
    pub(crate) struct RecordingTransport {
        responses: Mutex<VecDeque<Result<GraphqlResponse, ContentError>>>,
        calls: Mutex<Vec<(GraphqlRequest, CachePolicy)>>,
    }

    impl RecordingTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond_with(&self, data: Value) -> &Self {
            self.push(Ok(GraphqlResponse {
                data: Some(data),
                errors: Vec::new(),
            }))
        }

        pub(crate) fn push(&self, result: Result<GraphqlResponse, ContentError>) -> &Self {
            self.responses
                .lock()
                .expect("responses lock")
                .push_back(result);
            self
        }

        pub(crate) fn calls(&self) -> Vec<(GraphqlRequest, CachePolicy)> {
            self.calls.lock().expect("calls lock").clone()
        }

        pub(crate) fn last_call(&self) -> (GraphqlRequest, CachePolicy) {
            self.calls()
                .pop()
                .expect("transport should have been called")
        }
    }

    #[async_trait]
    impl ContentTransport for RecordingTransport {
        async fn execute(
            &self,
            request: GraphqlRequest,
            policy: &CachePolicy,
        ) -> Result<GraphqlResponse, ContentError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push((request, policy.clone()));
            self.responses
                .lock()
                .expect("responses lock")
                .pop_front()
                .unwrap_or_else(|| Ok(GraphqlResponse::default()))
        }
    }
}
