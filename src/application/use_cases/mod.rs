//! Use case implementations.

mod login_use_case;
mod post_actions_use_case;
mod restore_session_use_case;
mod search_posts_use_case;

pub use login_use_case::LoginUseCase;
pub use post_actions_use_case::PostActionsUseCase;
pub use restore_session_use_case::{RestoreSessionUseCase, RestoredSession};
pub use search_posts_use_case::SearchPostsUseCase;
