use crate::config::{FontSpec, ImageEditorConfig};
use crate::geometry::{Color, LineSegment, Rect};

use super::MaskShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoleShape {
    Circle,
    Rectangle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// Drawable description of the editor chrome laid over the viewport.
///
/// The host fills `container` with `dim_color`, clears `hole` (an ellipse for
/// circles), strokes `grid` and then strokes `border` around the hole.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskOverlay {
    pub container: Rect,
    pub dim_color: Color,
    pub hole_shape: HoleShape,
    pub hole: Rect,
    pub grid: Vec<LineSegment>,
    pub grid_stroke: Stroke,
    pub border: Option<Stroke>,
    /// Editor title, `None` when unset or when the container is landscape.
    pub title: Option<String>,
    pub title_color: Color,
    pub title_font: FontSpec,
    pub cancel_text: String,
    pub use_text: String,
    pub button_color: Color,
    pub button_font: FontSpec,
}

impl MaskOverlay {
    /// Returns `None` for [`MaskShape::None`].
    pub fn build(shape: &MaskShape, container: Rect, style: &ImageEditorConfig) -> Option<Self> {
        let hole = shape.hole_rect(container)?;
        let hole_shape = match shape {
            MaskShape::Circle { .. } => HoleShape::Circle,
            _ => HoleShape::Rectangle,
        };
        let border = (style.border_width > 0.0).then_some(Stroke {
            color: style.border_color,
            width: style.border_width,
        });
        let title = style
            .title
            .clone()
            .filter(|_| !container.size().is_landscape());

        Some(Self {
            container,
            dim_color: style.dim_color,
            hole_shape,
            hole,
            grid: shape.grid_lines(container),
            grid_stroke: Stroke {
                color: style.grid_color,
                width: style.grid_width,
            },
            border,
            title,
            title_color: style.title_color,
            title_font: style.title_font.clone(),
            cancel_text: style.cancel_text.clone(),
            use_text: style.use_text.clone(),
            button_color: style.button_color,
            button_font: style.button_font.clone(),
        })
    }
}
