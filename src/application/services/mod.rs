//! Application services shared by use cases and front ends.

mod progressive_image;
mod search_history_service;
mod session;

pub use progressive_image::{ImageSlot, SlotEvent};
pub use search_history_service::SearchHistoryService;
pub use session::{Session, SessionState};
