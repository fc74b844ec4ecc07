use std::cell::RefCell;
use std::rc::{Rc, Weak};

use image::RgbaImage;

use crate::config::{ImageEditorConfig, PickerConfiguration};
use crate::editor::{CropSession, Drawing, ImageopsDrawing, SessionError, SessionResult, Viewport};
use crate::geometry::{Point, Rect};
use crate::mask::{MaskOverlay, MaskShape};
use crate::state::SessionState;

use super::backend::{CaptureBackend, PermissionBackend, PresentationBackend};
use super::media::{CaptureRequest, CaptureResult, MediaSource, MediaType};
use super::outcome::{OutcomeReporter, PickerOutcome};
use super::permission::{access_decision, required_capabilities, AccessDecision, Capability};
use super::sheet::{
    AccessNotice, ActionSheet, AdditionalAction, NoticeChoice, PopoverAnchor, SheetChoice,
};

/// Host services a [`PickerController`] drives.
pub struct Collaborators {
    pub capture: Rc<dyn CaptureBackend>,
    pub permissions: Rc<dyn PermissionBackend>,
    pub presenter: Rc<dyn PresentationBackend>,
    pub drawing: Rc<dyn Drawing>,
}

impl Collaborators {
    /// Uses [`ImageopsDrawing`] for cropping.
    pub fn new(
        capture: Rc<dyn CaptureBackend>,
        permissions: Rc<dyn PermissionBackend>,
        presenter: Rc<dyn PresentationBackend>,
    ) -> Self {
        Self {
            capture,
            permissions,
            presenter,
            drawing: Rc::new(ImageopsDrawing::default()),
        }
    }

    pub fn with_drawing(mut self, drawing: Rc<dyn Drawing>) -> Self {
        self.drawing = drawing;
        self
    }
}

struct PickerInner {
    config: PickerConfiguration,
    collaborators: Collaborators,
    additional_actions: Vec<AdditionalAction>,
}

/// One picker invocation: the caller's callback plus the capabilities already
/// requested on its behalf.
struct Invocation {
    reporter: OutcomeReporter,
    requested: RefCell<Vec<Capability>>,
}

impl Invocation {
    fn start(on_outcome: impl FnOnce(PickerOutcome) + 'static) -> Rc<Self> {
        Rc::new(Self {
            reporter: OutcomeReporter::new(Box::new(on_outcome)),
            requested: RefCell::new(Vec::new()),
        })
    }

    fn report(&self, outcome: PickerOutcome) {
        self.reporter.report(outcome);
    }
}

/// Sequences sheet, permissions, native capture and the optional crop editor,
/// and reports exactly one [`PickerOutcome`] per invocation.
///
/// Cloning is cheap; clones share configuration and collaborators.
#[derive(Clone)]
pub struct PickerController {
    inner: Rc<PickerInner>,
}

impl std::fmt::Debug for PickerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickerController")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl PickerController {
    /// # Panics
    ///
    /// Panics when the configuration allows no media type or source, or has a
    /// non-positive output size.
    pub fn new(config: PickerConfiguration, collaborators: Collaborators) -> Self {
        Self::with_additional_actions(config, collaborators, Vec::new())
    }

    /// Like [`Self::new`], with caller-defined entries appended to the source sheet.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Self::new`].
    pub fn with_additional_actions(
        config: PickerConfiguration,
        collaborators: Collaborators,
        additional_actions: Vec<AdditionalAction>,
    ) -> Self {
        assert!(
            !config.allowed_types.is_empty(),
            "at least one media type must be allowed"
        );
        assert!(
            !config.allowed_sources.is_empty(),
            "at least one media source must be allowed"
        );
        assert!(
            config.output_size.is_positive(),
            "output size must be positive, got {}x{}",
            config.output_size.width,
            config.output_size.height
        );

        Self {
            inner: Rc::new(PickerInner {
                config,
                collaborators,
                additional_actions,
            }),
        }
    }

    pub fn config(&self) -> &PickerConfiguration {
        &self.inner.config
    }

    fn source_offered(&self, source: MediaSource) -> bool {
        self.inner.config.allows_source(source)
            && self.inner.collaborators.capture.is_source_available(source)
    }

    /// Presents the source-selection sheet.
    pub fn show_picker_dialogue(
        &self,
        anchor: PopoverAnchor,
        on_outcome: impl FnOnce(PickerOutcome) + 'static,
    ) {
        let invocation = Invocation::start(on_outcome);
        let config = &self.inner.config;
        let sheet = ActionSheet::build(
            &config.picker,
            &config.allowed_types,
            anchor,
            self.source_offered(MediaSource::Camera),
            self.source_offered(MediaSource::Library),
            &self.inner.additional_actions,
        );
        tracing::debug!(actions = sheet.actions.len(), "presenting source sheet");

        let controller = self.clone();
        self.inner.collaborators.presenter.present_sheet(
            sheet,
            Box::new(move |choice| controller.handle_sheet_choice(invocation, choice)),
        );
    }

    fn handle_sheet_choice(&self, invocation: Rc<Invocation>, choice: SheetChoice) {
        tracing::debug!(?choice, "source sheet answered");
        let source = match choice {
            SheetChoice::Cancel => {
                invocation.report(PickerOutcome::Cancelled);
                return;
            }
            SheetChoice::Additional(index) => {
                invocation.report(PickerOutcome::Cancelled);
                match self.inner.additional_actions.get(index) {
                    Some(action) => action.run(),
                    None => tracing::warn!(index, "unknown additional sheet action"),
                }
                return;
            }
            SheetChoice::Camera => MediaSource::Camera,
            SheetChoice::Library => MediaSource::Library,
        };
        let kinds = self.inner.config.allowed_types.clone();
        self.begin_capture(invocation, source, kinds);
    }

    /// Skips the sheet and goes straight to `source` with every allowed media type.
    ///
    /// # Panics
    ///
    /// Panics when `source` is not allowed.
    pub fn show_media_picker(
        &self,
        source: MediaSource,
        on_outcome: impl FnOnce(PickerOutcome) + 'static,
    ) {
        let kinds = self.inner.config.allowed_types.clone();
        self.show_media_picker_with_types(source, &kinds, on_outcome);
    }

    /// Like [`Self::show_media_picker`] but restricted to `requested` media types.
    ///
    /// # Panics
    ///
    /// Panics when `requested` is empty, names a type the configuration does
    /// not allow, or `source` is not allowed.
    pub fn show_media_picker_with_types(
        &self,
        source: MediaSource,
        requested: &[MediaType],
        on_outcome: impl FnOnce(PickerOutcome) + 'static,
    ) {
        let config = &self.inner.config;
        assert!(
            config.allows_source(source),
            "media source {source:?} is not allowed"
        );
        assert!(
            !requested.is_empty(),
            "at least one media type must be requested"
        );
        for kind in requested {
            assert!(
                config.allows_type(*kind),
                "media type {kind:?} is not allowed"
            );
        }
        self.begin_capture(Invocation::start(on_outcome), source, requested.to_vec());
    }

    fn begin_capture(
        &self,
        invocation: Rc<Invocation>,
        source: MediaSource,
        kinds: Vec<MediaType>,
    ) {
        let request = CaptureRequest {
            source,
            kinds,
            quality: self.inner.config.global.video_quality,
        };
        self.attempt_capture(invocation, request);
    }

    fn attempt_capture(&self, invocation: Rc<Invocation>, request: CaptureRequest) {
        let permissions = &self.inner.collaborators.permissions;
        let statuses: Vec<_> = required_capabilities(request.source, &request.kinds)
            .into_iter()
            .map(|capability| (capability, permissions.authorization_status(capability)))
            .collect();
        let decision = access_decision(&statuses, &invocation.requested.borrow());

        match decision {
            AccessDecision::Proceed => self.present_capture(invocation, request),
            AccessDecision::Request(capability) => {
                invocation.requested.borrow_mut().push(capability);
                tracing::debug!(capability = capability.label(), "requesting authorization");
                let controller = self.clone();
                permissions.request_authorization(
                    capability,
                    Box::new(move |status| {
                        tracing::debug!(
                            capability = capability.label(),
                            ?status,
                            "authorization answered"
                        );
                        controller.attempt_capture(invocation, request);
                    }),
                );
            }
            AccessDecision::Deny(capability) => {
                tracing::warn!(
                    capability = capability.label(),
                    source = request.source.label(),
                    "access denied"
                );
                self.present_notice(invocation);
            }
        }
    }

    fn present_notice(&self, invocation: Rc<Invocation>) {
        let presenter = Rc::clone(&self.inner.collaborators.presenter);
        let notice = AccessNotice::build(&self.inner.config.picker, presenter.can_open_settings());
        let settings = Rc::clone(&presenter);
        presenter.present_notice(
            notice,
            Box::new(move |choice| {
                invocation.report(PickerOutcome::Cancelled);
                if choice == NoticeChoice::OpenSettings {
                    settings.open_settings();
                }
            }),
        );
    }

    fn present_capture(&self, invocation: Rc<Invocation>, request: CaptureRequest) {
        tracing::debug!(
            source = request.source.label(),
            kinds = ?request.kinds,
            "presenting capture surface"
        );
        let controller = self.clone();
        self.inner.collaborators.capture.present_capture(
            request,
            Box::new(move |result| controller.handle_capture_result(invocation, result)),
        );
    }

    fn handle_capture_result(&self, invocation: Rc<Invocation>, result: CaptureResult) {
        tracing::debug!(result = result.label(), "capture finished");
        let outcome = match result {
            CaptureResult::Image(image) if image.width() == 0 || image.height() == 0 => {
                tracing::warn!("capture returned an empty image");
                PickerOutcome::Cancelled
            }
            CaptureResult::Image(image) if self.inner.config.editor_type.allows_editing() => {
                self.present_editor(invocation, image);
                return;
            }
            CaptureResult::Image(image) => PickerOutcome::Image(image),
            CaptureResult::Video(info) => PickerOutcome::Video(info),
            CaptureResult::Unrecognized | CaptureResult::Cancelled => PickerOutcome::Cancelled,
        };
        self.dismiss_capture_then_report(invocation, outcome);
    }

    fn dismiss_capture_then_report(&self, invocation: Rc<Invocation>, outcome: PickerOutcome) {
        self.inner
            .collaborators
            .capture
            .dismiss_capture(Box::new(move || invocation.report(outcome)));
    }

    fn present_editor(&self, invocation: Rc<Invocation>, image: RgbaImage) {
        let config = &self.inner.config;
        let shape = MaskShape::for_editor(
            config.editor_type,
            config.image_editor.hole_padding,
            config.output_size.as_size(),
            config.grid_divisions,
        );
        let session = CropSession::new(
            image,
            shape,
            config.output_size,
            Rc::clone(&self.inner.collaborators.drawing),
        );
        tracing::debug!(editor = config.editor_type.label(), "presenting crop editor");

        let collaborators = &self.inner.collaborators;
        collaborators.presenter.present_editor(EditorHandle {
            session: Rc::new(RefCell::new(session)),
            style: Rc::new(config.image_editor.clone()),
            capture: Rc::downgrade(&collaborators.capture),
            presenter: Rc::downgrade(&collaborators.presenter),
            invocation,
        });
    }
}

/// The host's view of a running crop editor.
///
/// Every method runs on the UI thread; none of them may be called from inside
/// another collaborator callback that is still borrowing the handle. The
/// handle refers to the capture and presentation backends weakly, so a
/// presenter may keep it without forming a cycle; hosts should still drop it
/// once `dismiss_editor` is called to release the source image.
#[derive(Clone)]
pub struct EditorHandle {
    session: Rc<RefCell<CropSession>>,
    style: Rc<ImageEditorConfig>,
    capture: Weak<dyn CaptureBackend>,
    presenter: Weak<dyn PresentationBackend>,
    invocation: Rc<Invocation>,
}

impl std::fmt::Debug for EditorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorHandle")
            .field("session", &self.session.borrow())
            .field("reported", &self.invocation.reporter.is_reported())
            .finish()
    }
}

impl EditorHandle {
    pub fn state(&self) -> SessionState {
        self.session.borrow().state()
    }

    /// Feeds the editor's container bounds. The first call starts the
    /// session; later calls re-derive the mask and re-center.
    pub fn layout(&self, container: Rect) -> SessionResult<()> {
        let mut session = self.session.borrow_mut();
        if session.state() == SessionState::Uninitialized {
            session.enter(container).map(|_| ())
        } else {
            session.recompute_mask(container)
        }
    }

    pub fn zoom_to(&self, scale: f64, anchor: Point) -> SessionResult<()> {
        self.session.borrow_mut().zoom_to(scale, anchor)
    }

    pub fn scroll_by(&self, dx: f64, dy: f64) -> SessionResult<()> {
        self.session.borrow_mut().scroll_by(dx, dy)
    }

    pub fn gesture_settled(&self) -> SessionResult<()> {
        self.session.borrow_mut().gesture_settled()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.session.borrow().viewport().copied()
    }

    pub fn crop_rect(&self) -> Option<Rect> {
        self.session.borrow().crop_rect()
    }

    pub fn overlay(&self) -> Option<MaskOverlay> {
        self.session.borrow().overlay(&self.style)
    }

    /// Crops and closes the editor. A render failure still closes it and
    /// reports a cancellation; only an invalid transition is returned as an error.
    pub fn commit(&self) -> SessionResult<()> {
        let result = self.session.borrow_mut().commit();
        let outcome = match result {
            Ok(image) => PickerOutcome::Image(image),
            Err(SessionError::CropFailed(_)) => PickerOutcome::Cancelled,
            Err(err) => return Err(err),
        };
        self.close(outcome);
        Ok(())
    }

    pub fn cancel(&self) -> SessionResult<()> {
        self.session.borrow_mut().cancel()?;
        self.close(PickerOutcome::Cancelled);
        Ok(())
    }

    /// Dismisses the editor, then the capture surface, then reports.
    fn close(&self, outcome: PickerOutcome) {
        let invocation = Rc::clone(&self.invocation);
        let capture = self.capture.clone();
        let dismiss_capture = move || match capture.upgrade() {
            Some(capture) => {
                capture.dismiss_capture(Box::new(move || invocation.report(outcome)));
            }
            None => {
                tracing::warn!("capture backend released before the editor closed");
                invocation.report(outcome);
            }
        };
        match self.presenter.upgrade() {
            Some(presenter) => presenter.dismiss_editor(Box::new(dismiss_capture)),
            None => {
                tracing::warn!("presentation backend released before the editor closed");
                dismiss_capture();
            }
        }
    }
}
