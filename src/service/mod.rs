//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services re-read the database for every decision; none holds state.

mod account;
mod media;
mod post;
mod relationship;

pub use account::{AccountService, NewAccount, ProfileUpdate};
pub use media::{MAX_FILES_PER_UPLOAD, MediaService, UploadFile, max_file_bytes};
pub use post::{NewPost, PostPatch, PostService, PostUpdate};
pub use relationship::{FollowState, RelationshipService, RequestAction, Visibility};
