use serde_json::json;
use tracing::error;

use crate::application::error::ContentError;
use crate::application::transport::{ContentTransport, GraphqlRequest};
use crate::cache::CachePolicy;
use crate::domain::comments::NewComment;

use super::wire::{WireMutationResult, decode};

pub const OPERATION: &str = "createComment";

const MUTATION: &str = r#"
mutation createComment($author: String!, $authorEmail: String!, $commentOn: Int!, $content: String!) {
  createComment(
    input: {
      author: $author
      authorEmail: $authorEmail
      clientMutationId: "uniqueId"
      content: $content
      commentOn: $commentOn
    }
  ) {
    success
  }
}
"#;

/// Submit a comment. Returns the API's `success` flag; a response without
/// mutation data counts as failure.
pub async fn create_comment(
    transport: &dyn ContentTransport,
    comment: &NewComment,
) -> Result<bool, ContentError> {
    let variables = json!({
        "author": comment.author,
        "authorEmail": comment.author_email,
        "commentOn": comment.post_id,
        "content": comment.content,
    });
    let request = GraphqlRequest::new(OPERATION, MUTATION, variables);
    let mut response = transport.execute(request, &CachePolicy::DYNAMIC).await?;

    let Some(result) = response.take_field("createComment") else {
        error!(
            target: "presswire::queries",
            operation = OPERATION,
            post_id = comment.post_id,
            errors = ?response.error_messages(),
            "Comment mutation returned no data"
        );
        return Ok(false);
    };

    Ok(decode::<WireMutationResult>(OPERATION, result)?.success)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::application::transport::testing::RecordingTransport;

    fn comment() -> NewComment {
        NewComment {
            author: "Ada".to_string(),
            author_email: "ada@example.com".to_string(),
            post_id: 42,
            content: "Great read".to_string(),
        }
    }

    #[tokio::test]
    async fn sends_numeric_post_id() {
        let transport = RecordingTransport::new();
        transport.respond_with(json!({"createComment": {"success": true}}));

        assert!(create_comment(&transport, &comment()).await.expect("request"));

        let (request, policy) = transport.last_call();
        assert_eq!(request.variables["commentOn"], json!(42));
        assert_eq!(request.variables["authorEmail"], json!("ada@example.com"));
        assert!(policy.is_no_store());
    }

    #[tokio::test]
    async fn missing_data_is_reported_as_failure() {
        let transport = RecordingTransport::new();

        assert!(!create_comment(&transport, &comment()).await.expect("request"));
    }
}
