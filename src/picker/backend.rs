//! Host collaborators the picker drives.
//!
//! Every suspension point is a continuation the host must invoke exactly once,
//! on the same UI thread that called in.

use super::controller::EditorHandle;
use super::media::{CaptureRequest, CaptureResult, MediaSource};
use super::permission::{AuthorizationStatus, Capability};
use super::sheet::{AccessNotice, ActionSheet, NoticeChoice, SheetChoice};

pub type Completion<T> = Box<dyn FnOnce(T)>;
pub type Continuation = Box<dyn FnOnce()>;

pub trait PermissionBackend {
    fn authorization_status(&self, capability: Capability) -> AuthorizationStatus;
    fn request_authorization(
        &self,
        capability: Capability,
        completion: Completion<AuthorizationStatus>,
    );
}

pub trait CaptureBackend {
    fn is_source_available(&self, source: MediaSource) -> bool;
    fn present_capture(&self, request: CaptureRequest, completion: Completion<CaptureResult>);
    /// Dismisses the capture surface; `completion` runs once it is gone.
    fn dismiss_capture(&self, completion: Continuation);
}

pub trait PresentationBackend {
    fn present_sheet(&self, sheet: ActionSheet, on_choice: Completion<SheetChoice>);
    fn present_notice(&self, notice: AccessNotice, on_choice: Completion<NoticeChoice>);
    /// Shows the crop editor above the capture surface. The host drives the
    /// handle with layout and gesture events until it commits or cancels.
    fn present_editor(&self, editor: EditorHandle);
    fn dismiss_editor(&self, completion: Continuation);
    fn can_open_settings(&self) -> bool;
    fn open_settings(&self);
}
