/// Business logic layer
///
/// - `auth`: user signup
/// - `feed`: post listing, creation, fetch, update and deletion
pub mod auth;
pub mod feed;

pub use auth::AuthService;
pub use feed::{FeedPage, FeedService, ImageSource, POSTS_PER_PAGE};
