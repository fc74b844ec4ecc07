//! Crop/zoom editing of a captured still image.
//!
//! A [`CropSession`] couples a [`Viewport`] to the mask geometry and, on
//! commit, hands the source-space crop rectangle to a [`Drawing`] collaborator.

pub mod drawing;
pub mod session;
pub mod viewport;

pub use drawing::{DrawError, DrawResult, Drawing, ImageopsDrawing};
pub use session::{CropSession, SessionError, SessionResult};
pub use viewport::{min_zoom_for, Viewport, INITIAL_ZOOM_FACTOR, MAX_ZOOM};
