use crate::geometry::{Point, Rect, Size};

pub const MAX_ZOOM: f64 = 4.0;
/// Applied on top of the minimum zoom when a session starts so the image edge
/// never sits exactly on the mask edge.
pub const INITIAL_ZOOM_FACTOR: f64 = 1.1;
const COVERAGE_EPSILON: f64 = 1e-9;

/// Smallest scale at which `image` covers `mask` on both axes, never above 1.0.
pub fn min_zoom_for(image: Size, mask: Size) -> f64 {
    (mask.width / image.width)
        .max(mask.height / image.height)
        .min(1.0)
}

fn coverage_zoom_for(image: Size, mask: Size) -> f64 {
    (mask.width / image.width).max(mask.height / image.height)
}

/// Zoomable, pannable surface showing the source image behind the mask.
///
/// The scroll frame is the mask rect; `offset` is the content offset in zoomed
/// content coordinates, so the on-screen image spans `image_size * zoom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    image_size: Size,
    mask: Rect,
    min_zoom: f64,
    zoom: f64,
    offset: Point,
}

impl Viewport {
    /// Initial viewport: zoom at `min_zoom * 1.1` and the image centered on the mask.
    pub fn new(image_size: Size, mask: Rect) -> Self {
        assert!(image_size.is_positive(), "source image must not be empty");
        assert!(mask.is_positive(), "mask rect must have positive area, got {mask}");

        let min_zoom = min_zoom_for(image_size, mask.size());
        let mut viewport = Self {
            image_size,
            mask,
            min_zoom,
            zoom: (min_zoom * INITIAL_ZOOM_FACTOR).min(MAX_ZOOM),
            offset: Point::zero(),
        };
        viewport.offset = viewport.centered_offset();
        viewport
    }

    pub fn image_size(&self) -> Size {
        self.image_size
    }

    pub fn mask(&self) -> Rect {
        self.mask
    }

    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> f64 {
        MAX_ZOOM
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// On-screen size of the zoomed image.
    pub fn content_size(&self) -> Size {
        self.image_size.scaled(self.zoom)
    }

    pub fn covers_mask(&self) -> bool {
        let content = self.content_size();
        content.width + COVERAGE_EPSILON >= self.mask.width
            && content.height + COVERAGE_EPSILON >= self.mask.height
    }

    fn centered_offset(&self) -> Point {
        let content = self.content_size();
        Point::new(
            (content.width - self.mask.width) / 2.0,
            (content.height - self.mask.height) / 2.0,
        )
    }

    fn clamp_axis(offset: f64, content: f64, frame: f64) -> f64 {
        if content >= frame {
            offset.clamp(0.0, content - frame)
        } else {
            (content - frame) / 2.0
        }
    }

    fn clamp_offset(&mut self) {
        let content = self.content_size();
        self.offset = Point::new(
            Self::clamp_axis(self.offset.x, content.width, self.mask.width),
            Self::clamp_axis(self.offset.y, content.height, self.mask.height),
        );
    }

    /// Zooms to `scale`, clamped to `[min_zoom, MAX_ZOOM]`, keeping `anchor`
    /// (in mask-local coordinates) over the same image point.
    pub fn zoom_to(&mut self, scale: f64, anchor: Point) {
        let next = scale.clamp(self.min_zoom, MAX_ZOOM);
        let ratio = next / self.zoom;
        self.offset = Point::new(
            (self.offset.x + anchor.x) * ratio - anchor.x,
            (self.offset.y + anchor.y) * ratio - anchor.y,
        );
        self.zoom = next;
        self.clamp_offset();
    }

    /// Zooms around the mask center.
    pub fn zoom_centered(&mut self, scale: f64) {
        let anchor = Point::new(self.mask.width / 2.0, self.mask.height / 2.0);
        self.zoom_to(scale, anchor);
    }

    /// Moves the content offset by `(dx, dy)`.
    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.offset = Point::new(self.offset.x + dx, self.offset.y + dy);
        self.clamp_offset();
    }

    /// Restores full mask coverage after a gesture ends.
    ///
    /// When the image under-fills the mask on either axis the scale is raised
    /// until it covers both, preserving aspect ratio. Returns `true` if the
    /// scale changed.
    pub fn settle(&mut self) -> bool {
        let stretched = !self.covers_mask();
        if stretched {
            let coverage = coverage_zoom_for(self.image_size, self.mask.size());
            tracing::debug!(
                from = self.zoom,
                to = coverage,
                "stretching under-filled image to cover mask"
            );
            self.zoom = coverage;
            self.offset = self.centered_offset();
        }
        self.clamp_offset();
        stretched
    }

    /// Re-derives zoom bounds for a new mask rect and re-centers the image.
    pub fn relayout(&mut self, mask: Rect) {
        assert!(mask.is_positive(), "mask rect must have positive area, got {mask}");
        self.mask = mask;
        self.min_zoom = min_zoom_for(self.image_size, mask.size());
        self.zoom = self.zoom.clamp(self.min_zoom, MAX_ZOOM);
        self.offset = self.centered_offset();
    }

    /// Mask rect translated into source-image pixel space.
    pub fn crop_rect(&self) -> Rect {
        Rect::new(
            self.offset.x / self.zoom,
            self.offset.y / self.zoom,
            self.mask.width / self.zoom,
            self.mask.height / self.zoom,
        )
    }
}
