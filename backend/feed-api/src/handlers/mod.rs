/// HTTP handlers
///
/// - `auth`: signup
/// - `feed`: post listing, creation, fetch, update and deletion
/// - `health`: liveness and readiness probes
/// - `multipart`: post form parsing shared by create and update
pub mod auth;
pub mod feed;
pub mod health;
pub mod multipart;

pub use auth::signup;
pub use feed::{create_post, delete_post, get_post, get_posts, update_post, update_post_json};
pub use health::{liveness, readiness};
