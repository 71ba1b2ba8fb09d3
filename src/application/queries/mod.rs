//! One module per content API operation.
//!
//! Each module owns its query text, builds its variables, picks its cache
//! policy and normalizes the response into domain types.

pub mod category;
pub mod category_slugs;
pub mod comments;
pub mod create_comment;
pub mod post;
pub mod post_slugs;
pub mod posts;
pub mod related;
mod wire;

pub use category::category_details;
pub use category_slugs::category_slugs;
pub use comments::{CommentsParams, post_comments};
pub use create_comment::create_comment;
pub use post::single_post;
pub use post_slugs::post_slugs;
pub use posts::{ListPostsParams, list_posts};
pub use related::{RelatedPostsParams, related_posts};
