/// Data models for feed-api
///
/// - `user`: registered users and the signup payload
/// - `post`: posts, feed entries and the post payload
pub mod post;
pub mod user;

pub use post::{CreatorSummary, FeedPost, NewPost, Post, PostChanges, PostInput};
pub use user::{NewUser, SignupRequest, User};
