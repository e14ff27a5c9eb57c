//! Application layer with use cases, services and DTOs.

/// Data transfer objects.
pub mod dto;
/// Shared services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{CredentialSource, LoginRequest, LoginResponse};
pub use services::{ImageSlot, SearchHistoryService, Session, SessionState, SlotEvent};
pub use use_cases::{
    LoginUseCase, PostActionsUseCase, RestoreSessionUseCase, RestoredSession, SearchPostsUseCase,
};
