use std::rc::Rc;

use image::RgbaImage;
use thiserror::Error;

use crate::config::{ImageEditorConfig, OutputSize};
use crate::geometry::{Point, Rect, Size};
use crate::mask::{MaskOverlay, MaskShape};
use crate::state::{SessionEvent, SessionState, StateError, StateMachine};

use super::drawing::{DrawError, Drawing};
use super::viewport::Viewport;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("crop session is not active (state {state:?})")]
    NotActive { state: SessionState },
    #[error("mask hole is empty inside container {container}")]
    EmptyMask { container: Rect },
    #[error("crop failed")]
    CropFailed(#[source] DrawError),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[derive(Debug)]
enum Phase {
    Pending,
    Active { container: Rect, viewport: Viewport },
    Closed,
}

/// Single-use crop/zoom editing session over one still image.
pub struct CropSession {
    source: RgbaImage,
    shape: MaskShape,
    output_size: OutputSize,
    drawing: Rc<dyn Drawing>,
    machine: StateMachine,
    phase: Phase,
}

impl std::fmt::Debug for CropSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CropSession")
            .field("source", &self.source.dimensions())
            .field("shape", &self.shape)
            .field("output_size", &self.output_size)
            .field("state", &self.machine.state())
            .field("phase", &self.phase)
            .finish()
    }
}

impl CropSession {
    /// # Panics
    ///
    /// Panics for [`MaskShape::None`], an empty source image or a non-positive
    /// output size; all three are caller defects.
    pub fn new(
        source: RgbaImage,
        shape: MaskShape,
        output_size: OutputSize,
        drawing: Rc<dyn Drawing>,
    ) -> Self {
        assert!(!shape.is_none(), "crop session requires a circle or rectangle mask");
        assert!(
            source.width() > 0 && source.height() > 0,
            "crop session requires a non-empty source image"
        );
        assert!(
            output_size.is_positive(),
            "crop session requires a positive output size"
        );

        Self {
            source,
            shape,
            output_size,
            drawing,
            machine: StateMachine::new(),
            phase: Phase::Pending,
        }
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn shape(&self) -> &MaskShape {
        &self.shape
    }

    pub fn output_size(&self) -> OutputSize {
        self.output_size
    }

    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    fn source_size(&self) -> Size {
        Size::new(f64::from(self.source.width()), f64::from(self.source.height()))
    }

    /// Hole rect for `container`. A container too small for the padding yields
    /// [`SessionError::EmptyMask`].
    fn mask_for(&self, container: Rect) -> SessionResult<Rect> {
        let mask = self
            .shape
            .hole_rect(container)
            .unwrap_or_else(|| unreachable!("shape checked at construction"));
        if !mask.is_positive() {
            tracing::debug!(%container, %mask, "container too small for mask");
            return Err(SessionError::EmptyMask { container });
        }
        Ok(mask)
    }

    /// Starts editing inside `container`: computes the mask and the initial viewport.
    ///
    /// On [`SessionError::EmptyMask`] the session stays uninitialized and a
    /// later call with a larger container may still enter.
    pub fn enter(&mut self, container: Rect) -> SessionResult<&Viewport> {
        if !self.machine.can_transition(SessionEvent::Enter) {
            return Err(self.reject(SessionEvent::Enter));
        }
        let mask = self.mask_for(container)?;
        self.machine.transition(SessionEvent::Enter)?;
        let viewport = Viewport::new(self.source_size(), mask);
        tracing::debug!(
            %container,
            %mask,
            min_zoom = viewport.min_zoom(),
            zoom = viewport.zoom(),
            "crop session entered"
        );
        self.phase = Phase::Active {
            container,
            viewport,
        };
        self.viewport().ok_or(SessionError::NotActive {
            state: self.machine.state(),
        })
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        match &self.phase {
            Phase::Active { viewport, .. } => Some(viewport),
            Phase::Pending | Phase::Closed => None,
        }
    }

    pub fn container(&self) -> Option<Rect> {
        match self.phase {
            Phase::Active { container, .. } => Some(container),
            Phase::Pending | Phase::Closed => None,
        }
    }

    pub fn mask_rect(&self) -> Option<Rect> {
        self.viewport().map(Viewport::mask)
    }

    /// Crop rectangle for the current viewport, in source-pixel space.
    pub fn crop_rect(&self) -> Option<Rect> {
        self.viewport().map(Viewport::crop_rect)
    }

    fn active_viewport_mut(&mut self) -> SessionResult<&mut Viewport> {
        let state = self.machine.state();
        match &mut self.phase {
            Phase::Active { viewport, .. } => Ok(viewport),
            Phase::Pending | Phase::Closed => Err(SessionError::NotActive { state }),
        }
    }

    /// Re-derives the mask for a resized hosting surface and re-centers the image.
    ///
    /// An empty hole leaves the previous layout untouched.
    pub fn recompute_mask(&mut self, container: Rect) -> SessionResult<()> {
        let state = self.machine.state();
        if !matches!(self.phase, Phase::Active { .. }) {
            return Err(SessionError::NotActive { state });
        }
        let mask = self.mask_for(container)?;
        let Phase::Active {
            container: current,
            viewport,
        } = &mut self.phase
        else {
            return Err(SessionError::NotActive { state });
        };
        *current = container;
        viewport.relayout(mask);
        tracing::debug!(%container, %mask, zoom = viewport.zoom(), "crop mask recomputed");
        Ok(())
    }

    pub fn zoom_to(&mut self, scale: f64, anchor: Point) -> SessionResult<()> {
        self.active_viewport_mut()?.zoom_to(scale, anchor);
        Ok(())
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64) -> SessionResult<()> {
        self.active_viewport_mut()?.scroll_by(dx, dy);
        Ok(())
    }

    /// Called when a pan or zoom gesture ends.
    pub fn gesture_settled(&mut self) -> SessionResult<()> {
        self.active_viewport_mut()?.settle();
        Ok(())
    }

    pub fn overlay(&self, style: &ImageEditorConfig) -> Option<MaskOverlay> {
        MaskOverlay::build(&self.shape, self.container()?, style)
    }

    fn reject(&self, event: SessionEvent) -> SessionError {
        SessionError::State(StateError::InvalidStateTransition {
            from: self.machine.state(),
            event,
        })
    }

    /// Crops the source to the masked region and resizes it to the output size.
    ///
    /// A drawing failure closes the session as cancelled and returns
    /// [`SessionError::CropFailed`].
    pub fn commit(&mut self) -> SessionResult<RgbaImage> {
        if !self.machine.can_transition(SessionEvent::Commit) {
            return Err(self.reject(SessionEvent::Commit));
        }
        let mut viewport = match std::mem::replace(&mut self.phase, Phase::Closed) {
            Phase::Active { viewport, .. } => viewport,
            other => {
                self.phase = other;
                return Err(self.reject(SessionEvent::Commit));
            }
        };
        viewport.settle();
        let crop = viewport.crop_rect();

        match self
            .drawing
            .crop_and_scale(&self.source, crop, self.output_size)
        {
            Ok(image) => {
                self.machine.transition(SessionEvent::Commit)?;
                tracing::info!(
                    %crop,
                    width = image.width(),
                    height = image.height(),
                    "crop session committed"
                );
                Ok(image)
            }
            Err(err) => {
                self.machine.transition(SessionEvent::CommitFailed)?;
                tracing::warn!(%crop, %err, "crop session render failed");
                Err(SessionError::CropFailed(err))
            }
        }
    }

    pub fn cancel(&mut self) -> SessionResult<()> {
        self.machine.transition(SessionEvent::Cancel)?;
        self.phase = Phase::Closed;
        tracing::info!("crop session cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::drawing::{DrawResult, ImageopsDrawing};
    use crate::mask::GridDivisions;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingDrawing {
        crops: RefCell<Vec<(Rect, OutputSize)>>,
        fail: bool,
    }

    impl Drawing for RecordingDrawing {
        fn crop_and_scale(
            &self,
            _source: &RgbaImage,
            crop: Rect,
            output: OutputSize,
        ) -> DrawResult<RgbaImage> {
            self.crops.borrow_mut().push((crop, output));
            if self.fail {
                return Err(DrawError::Render {
                    message: "simulated allocation failure".to_string(),
                });
            }
            Ok(RgbaImage::new(output.width, output.height))
        }
    }

    fn profile_session(width: u32, height: u32, drawing: Rc<dyn Drawing>) -> CropSession {
        CropSession::new(
            RgbaImage::new(width, height),
            MaskShape::Circle { padding: 20.0 },
            OutputSize::new(200, 200),
            drawing,
        )
    }

    #[test]
    fn enter_computes_mask_and_initial_viewport() {
        let mut session = profile_session(1000, 500, Rc::new(RecordingDrawing::default()));
        let viewport = *session
            .enter(Rect::new(0.0, 0.0, 300.0, 300.0))
            .expect("enter should succeed");

        assert_eq!(viewport.mask(), Rect::new(20.0, 20.0, 260.0, 260.0));
        assert!((viewport.min_zoom() - 0.52).abs() < 1e-9);
        assert!((viewport.zoom() - 0.572).abs() < 1e-9);
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn commit_divides_mask_and_offset_by_zoom() {
        let drawing = Rc::new(RecordingDrawing::default());
        let mut session = profile_session(1000, 500, drawing.clone());
        session
            .enter(Rect::new(0.0, 0.0, 300.0, 300.0))
            .expect("enter should succeed");

        let image = session.commit().expect("commit should succeed");
        assert_eq!(image.dimensions(), (200, 200));
        assert_eq!(session.state(), SessionState::Committed);

        let crops = drawing.crops.borrow();
        assert_eq!(crops.len(), 1);
        let (crop, output) = crops[0];
        assert_eq!(output, OutputSize::new(200, 200));
        assert!((crop.x - 156.0 / 0.572).abs() < 1e-6);
        assert!((crop.y - 13.0 / 0.572).abs() < 1e-6);
        assert!((crop.width - 260.0 / 0.572).abs() < 1e-6);
        assert!((crop.height - 260.0 / 0.572).abs() < 1e-6);
    }

    #[test]
    fn commit_after_gestures_stays_inside_source() {
        let drawing = Rc::new(RecordingDrawing::default());
        let mut session = CropSession::new(
            RgbaImage::new(4032, 3024),
            MaskShape::Rectangle {
                padding: 20.0,
                aspect_ratio: 4.0 / 3.0,
                grid: GridDivisions::new(2, 2),
            },
            OutputSize::new(800, 600),
            drawing.clone(),
        );
        session
            .enter(Rect::new(0.0, 0.0, 375.0, 667.0))
            .expect("enter should succeed");
        session
            .zoom_to(2.5, Point::new(10.0, 10.0))
            .expect("zoom should succeed");
        session.scroll_by(5000.0, -200.0).expect("scroll should succeed");
        session.gesture_settled().expect("settle should succeed");
        session.commit().expect("commit should succeed");

        let (crop, _) = drawing.crops.borrow()[0];
        assert!(Rect::new(0.0, 0.0, 4032.0, 3024.0).contains_rect(crop, 1e-6));
        assert!((crop.width / crop.height - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn commit_with_small_image_stretches_before_cropping() {
        let drawing = Rc::new(RecordingDrawing::default());
        let mut session = profile_session(100, 100, drawing.clone());
        session
            .enter(Rect::new(0.0, 0.0, 300.0, 300.0))
            .expect("enter should succeed");
        session.commit().expect("commit should succeed");

        let (crop, _) = drawing.crops.borrow()[0];
        assert!(crop.x.abs() < 1e-9 && crop.y.abs() < 1e-9);
        assert!((crop.width - 100.0).abs() < 1e-9);
        assert!((crop.height - 100.0).abs() < 1e-9);
    }

    #[test]
    fn render_failure_closes_session_as_cancelled() {
        let drawing = Rc::new(RecordingDrawing {
            fail: true,
            ..RecordingDrawing::default()
        });
        let mut session = profile_session(1000, 500, drawing);
        session
            .enter(Rect::new(0.0, 0.0, 300.0, 300.0))
            .expect("enter should succeed");

        let err = session.commit().expect_err("render failure should surface");
        assert!(matches!(err, SessionError::CropFailed(DrawError::Render { .. })));
        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.viewport().is_none());
    }

    #[test]
    fn session_is_single_use() {
        let mut session = profile_session(1000, 500, Rc::new(RecordingDrawing::default()));
        assert!(matches!(
            session.commit(),
            Err(SessionError::State(StateError::InvalidStateTransition {
                from: SessionState::Uninitialized,
                event: SessionEvent::Commit
            }))
        ));
        assert!(matches!(
            session.scroll_by(1.0, 1.0),
            Err(SessionError::NotActive {
                state: SessionState::Uninitialized
            })
        ));

        session
            .enter(Rect::new(0.0, 0.0, 300.0, 300.0))
            .expect("enter should succeed");
        assert!(session.enter(Rect::new(0.0, 0.0, 300.0, 300.0)).is_err());

        session.cancel().expect("cancel should succeed");
        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.cancel().is_err());
        assert!(session.commit().is_err());
        assert_eq!(session.machine().history().len(), 2);
    }

    #[test]
    fn container_smaller_than_padding_keeps_session_pending() {
        let mut session = profile_session(1000, 500, Rc::new(RecordingDrawing::default()));
        let narrow = Rect::new(0.0, 0.0, 40.0, 300.0);

        let err = session.enter(narrow).expect_err("empty hole should be rejected");
        assert!(matches!(err, SessionError::EmptyMask { container } if container == narrow));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.viewport().is_none());

        session
            .enter(Rect::new(0.0, 0.0, 300.0, 300.0))
            .expect("larger container should enter");
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn recompute_mask_with_empty_hole_keeps_previous_layout() {
        let mut session = profile_session(1000, 500, Rc::new(RecordingDrawing::default()));
        session
            .enter(Rect::new(0.0, 0.0, 300.0, 300.0))
            .expect("enter should succeed");

        let err = session
            .recompute_mask(Rect::new(0.0, 0.0, 300.0, 30.0))
            .expect_err("empty hole should be rejected");
        assert!(matches!(err, SessionError::EmptyMask { .. }));
        assert_eq!(session.mask_rect(), Some(Rect::new(20.0, 20.0, 260.0, 260.0)));
        assert_eq!(session.container(), Some(Rect::new(0.0, 0.0, 300.0, 300.0)));
        session.commit().expect("session is still usable");
    }

    #[test]
    fn crop_failure_message_does_not_repeat_source() {
        let err = SessionError::CropFailed(DrawError::Render {
            message: "out of memory".to_string(),
        });
        assert_eq!(err.to_string(), "crop failed");
        let source = std::error::Error::source(&err).expect("draw error is the source");
        assert_eq!(source.to_string(), "render failed: out of memory");
    }

    #[test]
    fn recompute_mask_follows_container_without_stretching_mask() {
        let mut session = profile_session(1000, 500, Rc::new(RecordingDrawing::default()));
        session
            .enter(Rect::new(0.0, 0.0, 300.0, 300.0))
            .expect("enter should succeed");
        session
            .recompute_mask(Rect::new(0.0, 0.0, 600.0, 300.0))
            .expect("recompute should succeed");

        assert_eq!(session.mask_rect(), Some(Rect::new(170.0, 20.0, 260.0, 260.0)));
        assert_eq!(session.container(), Some(Rect::new(0.0, 0.0, 600.0, 300.0)));
    }

    #[test]
    fn overlay_reflects_current_container() {
        let mut session = profile_session(1000, 500, Rc::new(RecordingDrawing::default()));
        let style = ImageEditorConfig::default();
        assert!(session.overlay(&style).is_none());

        session
            .enter(Rect::new(0.0, 0.0, 300.0, 300.0))
            .expect("enter should succeed");
        let overlay = session.overlay(&style).expect("active session has overlay");
        assert_eq!(overlay.hole, Rect::new(20.0, 20.0, 260.0, 260.0));
    }

    #[test]
    fn commit_with_imageops_drawing_produces_output_size() {
        let mut session = CropSession::new(
            RgbaImage::from_pixel(640, 480, image::Rgba([10, 20, 30, 255])),
            MaskShape::Rectangle {
                padding: 0.0,
                aspect_ratio: 1.5,
                grid: GridDivisions::default(),
            },
            OutputSize::new(300, 200),
            Rc::new(ImageopsDrawing::default()),
        );
        session
            .enter(Rect::new(0.0, 0.0, 300.0, 200.0))
            .expect("enter should succeed");
        let image = session.commit().expect("commit should succeed");
        assert_eq!(image.dimensions(), (300, 200));
        assert_eq!(image.get_pixel(150, 100)[3], 255);
    }

    #[test]
    #[should_panic(expected = "circle or rectangle")]
    fn none_shape_is_a_programming_error() {
        let _ = CropSession::new(
            RgbaImage::new(10, 10),
            MaskShape::None,
            OutputSize::new(10, 10),
            Rc::new(RecordingDrawing::default()),
        );
    }
}
