//! Progressive image resolution for a single display slot.
//!
//! A slot walks its candidate URLs in order (thumbnail, sample, original),
//! shows the first one that loads and then only ever upgrades to a strictly
//! larger image. Rebinding supersedes whatever the slot was doing.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, trace, warn};

use crate::domain::entities::{ImageStatus, LoadedImage};
use crate::domain::errors::ImageError;
use crate::domain::ports::ImageLoaderPort;

/// Notification emitted when a slot's visible state changes.
#[derive(Debug, Clone)]
pub enum SlotEvent {
    /// A new, better image should be shown.
    Displayed {
        /// Binding the image belongs to.
        generation: u64,
        /// The image.
        image: LoadedImage,
    },
    /// Every candidate was tried and the displayed image is final.
    Settled {
        /// Binding that settled.
        generation: u64,
    },
    /// Every candidate failed.
    Failed {
        /// Binding that failed.
        generation: u64,
        /// Last error seen.
        error: ImageError,
    },
}

#[derive(Default)]
struct SlotState {
    generation: u64,
    status: ImageStatus,
    current: Option<LoadedImage>,
    candidates: Vec<String>,
    task: Option<AbortHandle>,
}

impl SlotState {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
        self.current = None;
    }
}

/// One display context's progressive loader.
pub struct ImageSlot {
    loader: Arc<dyn ImageLoaderPort>,
    state: Arc<Mutex<SlotState>>,
    events: mpsc::UnboundedSender<SlotEvent>,
}

impl std::fmt::Debug for ImageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ImageSlot")
            .field("generation", &state.generation)
            .field("status", &state.status)
            .finish_non_exhaustive()
    }
}

impl ImageSlot {
    /// Creates an unbound slot and the receiver for its events.
    #[must_use]
    pub fn new(loader: Arc<dyn ImageLoaderPort>) -> (Self, mpsc::UnboundedReceiver<SlotEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let slot = Self {
            loader,
            state: Arc::new(Mutex::new(SlotState::default())),
            events,
        };
        (slot, rx)
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> ImageStatus {
        self.state.lock().status.clone()
    }

    /// Image currently displayed.
    #[must_use]
    pub fn current(&self) -> Option<LoadedImage> {
        self.state.lock().current.clone()
    }

    /// Identifier of the active binding.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Binds the slot to a candidate list, cancelling any previous binding.
    /// Returns the new binding's generation.
    ///
    /// Must be called within a Tokio runtime.
    pub fn bind(&self, candidates: Vec<String>) -> u64 {
        let mut state = self.state.lock();
        state.cancel();
        let generation = state.generation;
        state.candidates.clone_from(&candidates);

        if candidates.is_empty() {
            state.status = ImageStatus::Failed(ImageError::CannotLoad.to_string());
            let _ = self.events.send(SlotEvent::Failed {
                generation,
                error: ImageError::CannotLoad,
            });
            return generation;
        }

        state.status = ImageStatus::Loading;
        debug!(generation, candidates = candidates.len(), "Binding image slot");

        let task = tokio::spawn(resolve(
            Arc::clone(&self.loader),
            Arc::clone(&self.state),
            self.events.clone(),
            generation,
            candidates,
        ));
        state.task = Some(task.abort_handle());
        generation
    }

    /// Re-binds the last candidate list. Returns `None` if never bound.
    pub fn retry(&self) -> Option<u64> {
        let candidates = self.state.lock().candidates.clone();
        if candidates.is_empty() {
            return None;
        }
        Some(self.bind(candidates))
    }

    /// Cancels the binding and clears the slot.
    pub fn unbind(&self) {
        let mut state = self.state.lock();
        state.cancel();
        state.candidates.clear();
        state.status = ImageStatus::NotStarted;
    }
}

impl Drop for ImageSlot {
    fn drop(&mut self) {
        if let Some(task) = self.state.lock().task.take() {
            task.abort();
        }
    }
}

async fn resolve(
    loader: Arc<dyn ImageLoaderPort>,
    state: Arc<Mutex<SlotState>>,
    events: mpsc::UnboundedSender<SlotEvent>,
    generation: u64,
    candidates: Vec<String>,
) {
    let mut last_error = None;

    for url in &candidates {
        let result = loader.load(url).await;

        let mut slot = state.lock();
        if slot.generation != generation {
            trace!(generation, "Discarding result for superseded binding");
            return;
        }

        match result {
            Ok(image) => {
                let better = slot
                    .current
                    .as_ref()
                    .is_none_or(|shown| image.image.pixel_count() > shown.image.pixel_count());
                if better {
                    debug!(
                        generation,
                        url = %url,
                        width = image.image.width(),
                        height = image.image.height(),
                        "Displaying image"
                    );
                    slot.current = Some(image.clone());
                    slot.status = ImageStatus::Ready;
                    let _ = events.send(SlotEvent::Displayed { generation, image });
                } else {
                    trace!(generation, url = %url, "Ignoring candidate that is not larger");
                }
            }
            Err(e) => {
                warn!(generation, url = %url, error = %e, "Image candidate failed");
                last_error = Some(e);
            }
        }
    }

    let mut slot = state.lock();
    if slot.generation != generation {
        return;
    }
    slot.task = None;
    if slot.current.is_some() {
        let _ = events.send(SlotEvent::Settled { generation });
    } else {
        let error = last_error.unwrap_or(ImageError::CannotLoad);
        slot.status = ImageStatus::Failed(error.to_string());
        let _ = events.send(SlotEvent::Failed { generation, error });
    }
}
