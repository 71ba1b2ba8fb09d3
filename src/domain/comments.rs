use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::pagination::Connection;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub date: String,
    /// Present for replies; threads are rebuilt by the renderer.
    pub parent_id: Option<String>,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostComments {
    pub comment_count: u32,
    pub comments: Connection<Comment>,
}

/// A comment submission. The post is addressed by its numeric database id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub author: String,
    pub author_email: String,
    pub post_id: i64,
    pub content: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.author.trim().is_empty() {
            return Err(DomainError::validation("comment author must not be empty"));
        }
        if !self.author_email.contains('@') {
            return Err(DomainError::validation(
                "comment author email must be an address",
            ));
        }
        if self.post_id <= 0 {
            return Err(DomainError::validation("comment post id must be positive"));
        }
        if self.content.trim().is_empty() {
            return Err(DomainError::validation("comment content must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment() -> NewComment {
        NewComment {
            author: "Ada".to_string(),
            author_email: "ada@example.com".to_string(),
            post_id: 42,
            content: "Nice post".to_string(),
        }
    }

    #[test]
    fn accepts_complete_submission() {
        assert!(comment().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_post_id() {
        let mut input = comment();
        input.post_id = 0;
        assert!(matches!(
            input.validate(),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn rejects_blank_content() {
        let mut input = comment();
        input.content = "  ".to_string();
        assert!(input.validate().is_err());
    }
}
