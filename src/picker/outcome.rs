use std::cell::RefCell;

use image::RgbaImage;

use super::backend::Completion;
use super::media::VideoInfo;

/// Terminal result of one picker invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerOutcome {
    Image(RgbaImage),
    Video(VideoInfo),
    Cancelled,
}

impl PickerOutcome {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Video(_) => "video",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn dispatch(self, delegate: &dyn PickerDelegate) {
        match self {
            Self::Image(image) => delegate.on_image_selected(image),
            Self::Video(info) => delegate.on_video_selected(info),
            Self::Cancelled => delegate.on_cancelled(),
        }
    }
}

/// Per-outcome callbacks for callers that prefer a delegate over matching
/// on [`PickerOutcome`].
pub trait PickerDelegate {
    fn on_image_selected(&self, image: RgbaImage);
    fn on_video_selected(&self, info: VideoInfo);
    fn on_cancelled(&self);
}

/// Holds the caller's result callback and fires it at most once.
pub struct OutcomeReporter {
    callback: RefCell<Option<Completion<PickerOutcome>>>,
}

impl OutcomeReporter {
    pub fn new(callback: Completion<PickerOutcome>) -> Self {
        Self {
            callback: RefCell::new(Some(callback)),
        }
    }

    pub fn is_reported(&self) -> bool {
        self.callback.borrow().is_none()
    }

    /// Returns `false` if an outcome was already reported; the new one is dropped.
    pub fn report(&self, outcome: PickerOutcome) -> bool {
        let callback = self.callback.borrow_mut().take();
        match callback {
            Some(callback) => {
                tracing::info!(outcome = outcome.label(), "picker finished");
                callback(outcome);
                true
            }
            None => {
                tracing::warn!(
                    outcome = outcome.label(),
                    "dropping duplicate picker outcome"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for OutcomeReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeReporter")
            .field("reported", &self.is_reported())
            .finish()
    }
}
