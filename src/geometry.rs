//! Shared geometric and color primitives used by the mask, editor and picker modules.
//!
//! All coordinates are `f64`. Screen-space values (container, mask) and
//! source-pixel values (crop rectangles) share the same types.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_positive(self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn aspect_ratio(self) -> f64 {
        self.width / self.height
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    pub fn is_landscape(self) -> bool {
        self.width > self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub const fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn max_x(self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(self) -> f64 {
        self.y + self.height
    }

    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_positive(self) -> bool {
        self.size().is_positive()
    }

    /// Returns `true` when `other` lies inside `self`, allowing `epsilon` slack on each edge.
    pub fn contains_rect(self, other: Rect, epsilon: f64) -> bool {
        other.x >= self.x - epsilon
            && other.y >= self.y - epsilon
            && other.max_x() <= self.max_x() + epsilon
            && other.max_y() <= self.max_y() + epsilon
    }

    pub fn inset(self, amount: f64) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            self.width - amount * 2.0,
            self.height - amount * 2.0,
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{x:{}, y:{}, w:{}, h:{}}}",
            self.x, self.y, self.width, self.height
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

impl LineSegment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn is_vertical(self) -> bool {
        self.start.x == self.end.x
    }
}

/// RGBA color; serialized as `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    pub fn alpha(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn parse_hex(value: &str) -> Option<Self> {
        let digits = value.trim().strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let channel = |index: usize| u8::from_str_radix(digits.get(index..index + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value).ok_or_else(|| format!("invalid color '{value}'"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hex_parses_with_and_without_alpha() {
        assert_eq!(Color::parse_hex("#ffffff"), Some(Color::WHITE));
        assert_eq!(
            Color::parse_hex("#000000a8"),
            Some(Color::rgba(0, 0, 0, 0xa8))
        );
        assert_eq!(Color::parse_hex("ffffff"), None);
        assert_eq!(Color::parse_hex("#fff"), None);
        assert_eq!(Color::parse_hex("#gg0000"), None);
    }

    #[test]
    fn color_with_alpha_rounds_to_byte() {
        assert_eq!(Color::BLACK.with_alpha(0.66).a, 168);
        assert_eq!(Color::WHITE.with_alpha(0.5).a, 128);
        assert_eq!(Color::BLACK.with_alpha(0.66).to_hex(), "#000000a8");
    }

    #[test]
    fn contains_rect_respects_epsilon() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.contains_rect(Rect::new(10.0, 10.0, 80.0, 80.0), 0.0));
        assert!(!outer.contains_rect(Rect::new(10.0, 10.0, 90.0000001, 80.0), 0.0));
        assert!(outer.contains_rect(Rect::new(10.0, 10.0, 90.0000001, 80.0), 1e-6));
    }
}
