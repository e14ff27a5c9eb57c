//! Domain entity definitions.

mod comment;
mod credentials;
mod media;
mod post;
mod tag;
mod user_profile;

pub use comment::Comment;
pub use credentials::Credentials;
pub use media::{DecodedImage, ImageId, ImageSource, ImageStatus, LoadedImage};
pub use post::{CategorizedTags, Post, PostId, Rating};
pub use tag::{Tag, TagKind};
pub use user_profile::UserProfile;
