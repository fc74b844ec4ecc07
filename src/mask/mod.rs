//! Mask geometry for the crop editor.
//!
//! Everything here is a pure function of its inputs: the hole rectangle for the
//! circular and rectangular masks, and the grid drawn inside a rectangular hole.

pub mod overlay;

use serde::{Deserialize, Serialize};

use crate::geometry::{LineSegment, Point, Rect, Size};

pub use overlay::{HoleShape, MaskOverlay, Stroke};

/// Which editor appears after a still image is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorType {
    /// No editing; the captured image goes straight to the caller.
    None,
    /// Circular mask, typically for avatars.
    Profile,
    /// Rectangular mask locked to the output aspect ratio, with optional grid.
    #[default]
    Image,
}

impl EditorType {
    pub const fn allows_editing(self) -> bool {
        !matches!(self, Self::None)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Profile => "profile",
            Self::Image => "image",
        }
    }
}

/// Number of grid separators inside a rectangular hole.
///
/// `horizontal` counts lines placed along the horizontal axis (so they are
/// vertical segments splitting the width); `vertical` counts lines placed along
/// the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridDivisions {
    #[serde(default)]
    pub horizontal: u32,
    #[serde(default)]
    pub vertical: u32,
}

impl GridDivisions {
    pub const fn new(horizontal: u32, vertical: u32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub const fn is_empty(self) -> bool {
        self.horizontal == 0 && self.vertical == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaskShape {
    Circle {
        padding: f64,
    },
    Rectangle {
        padding: f64,
        aspect_ratio: f64,
        grid: GridDivisions,
    },
    None,
}

impl MaskShape {
    /// Builds the shape for `editor_type`. The rectangle's aspect ratio comes from `output_size`.
    pub fn for_editor(
        editor_type: EditorType,
        padding: f64,
        output_size: Size,
        grid: GridDivisions,
    ) -> Self {
        match editor_type {
            EditorType::None => Self::None,
            EditorType::Profile => Self::Circle { padding },
            EditorType::Image => Self::Rectangle {
                padding,
                aspect_ratio: output_size.aspect_ratio(),
                grid,
            },
        }
    }

    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Hole rectangle for `container`, or `None` for [`MaskShape::None`].
    pub fn hole_rect(&self, container: Rect) -> Option<Rect> {
        match *self {
            Self::Circle { padding } => Some(circle_mask_rect(container, padding)),
            Self::Rectangle {
                padding,
                aspect_ratio,
                ..
            } => Some(rectangle_mask_rect(container, padding, aspect_ratio)),
            Self::None => None,
        }
    }

    /// Grid segments for the hole in `container`; empty for circles.
    pub fn grid_lines(&self, container: Rect) -> Vec<LineSegment> {
        match *self {
            Self::Rectangle {
                padding,
                aspect_ratio,
                grid,
            } => grid_lines(rectangle_mask_rect(container, padding, aspect_ratio), grid),
            Self::Circle { .. } | Self::None => Vec::new(),
        }
    }
}

fn assert_container(container: Rect) {
    assert!(
        container.is_positive(),
        "mask container must have positive area, got {container}"
    );
}

/// Largest square centered in `container`, inset by `padding`.
///
/// # Panics
///
/// Panics when `container` has no positive area.
pub fn circle_mask_rect(container: Rect, padding: f64) -> Rect {
    assert_container(container);
    let side = (container.width.min(container.height) - padding * 2.0).max(0.0);
    Rect::new(
        container.x + (container.width - side) / 2.0,
        container.y + (container.height - side) / 2.0,
        side,
        side,
    )
}

/// Largest `aspect_ratio` rectangle inside the padded `container`, centered on
/// the axis that is not limiting.
///
/// # Panics
///
/// Panics when `container` has no positive area or `aspect_ratio` is not positive.
pub fn rectangle_mask_rect(container: Rect, padding: f64, aspect_ratio: f64) -> Rect {
    assert_container(container);
    assert!(
        aspect_ratio.is_finite() && aspect_ratio > 0.0,
        "mask aspect ratio must be positive, got {aspect_ratio}"
    );

    let max_width = (container.width - padding * 2.0).max(0.0);
    let max_height = (container.height - padding * 2.0).max(0.0);

    if max_width / max_height > aspect_ratio {
        let width = max_height * aspect_ratio;
        Rect::new(
            container.x + (container.width - width) / 2.0,
            container.y + padding,
            width,
            max_height,
        )
    } else {
        let height = max_width / aspect_ratio;
        Rect::new(
            container.x + padding,
            container.y + (container.height - height) / 2.0,
            max_width,
            height,
        )
    }
}

/// Grid separators splitting `mask` into `horizontal + 1` equal columns and
/// `vertical + 1` equal rows. Column separators come first.
pub fn grid_lines(mask: Rect, divisions: GridDivisions) -> Vec<LineSegment> {
    let mut lines = Vec::with_capacity((divisions.horizontal + divisions.vertical) as usize);

    if divisions.horizontal > 0 {
        let count = f64::from(divisions.horizontal + 1);
        for i in 1..=divisions.horizontal {
            let x = mask.x + mask.width * f64::from(i) / count;
            lines.push(LineSegment::new(
                Point::new(x, mask.y),
                Point::new(x, mask.max_y()),
            ));
        }
    }

    if divisions.vertical > 0 {
        let count = f64::from(divisions.vertical + 1);
        for i in 1..=divisions.vertical {
            let y = mask.y + mask.height * f64::from(i) / count;
            lines.push(LineSegment::new(
                Point::new(mask.x, y),
                Point::new(mask.max_x(), y),
            ));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn circle_mask_in_square_container_insets_by_padding() {
        let rect = circle_mask_rect(Rect::new(0.0, 0.0, 300.0, 300.0), 20.0);
        assert_eq!(rect, Rect::new(20.0, 20.0, 260.0, 260.0));
    }

    #[test]
    fn circle_mask_is_centered_square_for_various_containers() {
        let containers = [
            Rect::new(0.0, 0.0, 375.0, 667.0),
            Rect::new(0.0, 0.0, 1024.0, 768.0),
            Rect::new(12.0, 30.0, 200.0, 90.0),
        ];
        for container in containers {
            for padding in [0.0, 5.0, 20.0] {
                let rect = circle_mask_rect(container, padding);
                let side = container.width.min(container.height) - padding * 2.0;
                assert_close(rect.width, side);
                assert_close(rect.height, side);
                assert_close(rect.center().x, container.center().x);
                assert_close(rect.center().y, container.center().y);
            }
        }
    }

    #[test]
    fn rectangle_mask_matches_exact_ratio_container() {
        let rect = rectangle_mask_rect(Rect::new(0.0, 0.0, 300.0, 200.0), 0.0, 600.0 / 400.0);
        assert_eq!(rect, Rect::new(0.0, 0.0, 300.0, 200.0));
    }

    #[test]
    fn rectangle_mask_uses_full_height_when_container_is_wider() {
        let container = Rect::new(0.0, 0.0, 800.0, 300.0);
        let rect = rectangle_mask_rect(container, 20.0, 4.0 / 3.0);
        assert_close(rect.height, 260.0);
        assert_close(rect.width, 260.0 * 4.0 / 3.0);
        assert_close(rect.y, 20.0);
        assert_close(rect.center().x, container.center().x);
    }

    #[test]
    fn rectangle_mask_uses_full_width_when_container_is_taller() {
        let container = Rect::new(0.0, 0.0, 375.0, 667.0);
        let rect = rectangle_mask_rect(container, 20.0, 4.0 / 3.0);
        assert_close(rect.x, 20.0);
        assert_close(rect.width, 335.0);
        assert_close(rect.height, 335.0 * 3.0 / 4.0);
        assert_close(rect.center().y, container.center().y);
    }

    #[test]
    fn rectangle_mask_stays_inside_padded_container_and_keeps_ratio() {
        let containers = [
            Rect::new(0.0, 0.0, 375.0, 667.0),
            Rect::new(0.0, 0.0, 667.0, 375.0),
            Rect::new(40.0, 10.0, 500.0, 500.0),
        ];
        for container in containers {
            for ratio in [0.5, 1.0, 4.0 / 3.0, 16.0 / 9.0, 3.0] {
                let padding = 16.0;
                let rect = rectangle_mask_rect(container, padding, ratio);
                assert!(
                    container.inset(padding).contains_rect(rect, EPSILON),
                    "{rect} escapes padded {container}"
                );
                assert!((rect.width / rect.height - ratio).abs() < 1e-9);
            }
        }
    }

    #[test]
    #[should_panic(expected = "positive area")]
    fn degenerate_container_is_a_programming_error() {
        let _ = circle_mask_rect(Rect::new(0.0, 0.0, 0.0, 100.0), 0.0);
    }

    #[test]
    fn grid_lines_without_divisions_are_empty() {
        let mask = Rect::new(0.0, 0.0, 300.0, 200.0);
        assert!(grid_lines(mask, GridDivisions::new(0, 0)).is_empty());
    }

    #[test]
    fn grid_lines_partition_width_into_equal_columns() {
        let mask = Rect::new(10.0, 20.0, 300.0, 200.0);
        let lines = grid_lines(mask, GridDivisions::new(2, 0));
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.is_vertical()));
        assert_close(lines[0].start.x, 110.0);
        assert_close(lines[1].start.x, 210.0);
        assert_close(lines[0].start.y, 20.0);
        assert_close(lines[0].end.y, 220.0);
    }

    #[test]
    fn grid_lines_emit_columns_before_rows() {
        let mask = Rect::new(0.0, 0.0, 300.0, 200.0);
        let lines = grid_lines(mask, GridDivisions::new(1, 3));
        assert_eq!(lines.len(), 4);
        assert_close(lines[0].start.x, 150.0);
        let rows: Vec<f64> = lines[1..].iter().map(|line| line.start.y).collect();
        assert_eq!(rows, vec![50.0, 100.0, 150.0]);
        assert!(lines[1..].iter().all(|line| line.start.x == 0.0 && line.end.x == 300.0));
    }

    #[test]
    fn shape_for_editor_derives_ratio_from_output_size() {
        let shape = MaskShape::for_editor(
            EditorType::Image,
            20.0,
            Size::new(600.0, 400.0),
            GridDivisions::new(2, 2),
        );
        assert_eq!(
            shape,
            MaskShape::Rectangle {
                padding: 20.0,
                aspect_ratio: 1.5,
                grid: GridDivisions::new(2, 2),
            }
        );
        assert_eq!(
            MaskShape::for_editor(
                EditorType::Profile,
                8.0,
                Size::new(1.0, 1.0),
                GridDivisions::default()
            ),
            MaskShape::Circle { padding: 8.0 }
        );
        assert!(MaskShape::for_editor(
            EditorType::None,
            8.0,
            Size::new(1.0, 1.0),
            GridDivisions::default()
        )
        .is_none());
    }

    #[test]
    fn circle_shape_has_no_grid() {
        let container = Rect::new(0.0, 0.0, 300.0, 300.0);
        assert!(MaskShape::Circle { padding: 0.0 }
            .grid_lines(container)
            .is_empty());
        assert_eq!(MaskShape::None.hole_rect(container), None);
    }

    #[test]
    fn editor_type_deserializes_from_lowercase() {
        let parsed: EditorType = serde_json::from_str("\"profile\"").expect("valid editor type");
        assert_eq!(parsed, EditorType::Profile);
        assert!(!EditorType::None.allows_editing());
    }
}
