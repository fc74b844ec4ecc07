//! Media picker orchestration.
//!
//! The [`PickerController`] presents the source sheet, settles permissions,
//! drives the host's native capture surface and, for still images, hands an
//! [`EditorHandle`] to the host before reporting one [`PickerOutcome`].

pub mod backend;
pub mod controller;
pub mod media;
pub mod outcome;
pub mod permission;
pub mod sheet;

pub use backend::{CaptureBackend, Completion, Continuation, PermissionBackend, PresentationBackend};
pub use controller::{Collaborators, EditorHandle, PickerController};
pub use media::{CaptureRequest, CaptureResult, MediaSource, MediaType, VideoInfo, VideoQuality};
pub use outcome::{OutcomeReporter, PickerDelegate, PickerOutcome};
pub use permission::{
    access_decision, required_capabilities, AccessDecision, AuthorizationStatus, Capability,
};
pub use sheet::{
    camera_button_text, AccessNotice, ActionSheet, ActionStyle, AdditionalAction, NoticeAction,
    NoticeChoice, PopoverAnchor, SheetAction, SheetChoice,
};
