//! Rendering module
//!
//! The scene painter only talks to the `Canvas` trait: a handful of 2D
//! primitives with a transform stack. The browser backs it with a canvas 2D
//! context; tests and headless runs use `RecordingCanvas` / `NullCanvas`.

pub mod scene;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;

use glam::Vec2;

use crate::sim::Rect;
use crate::sim::Rgb;

pub use scene::{SceneOptions, draw, draw_error};

/// RGBA colour, 0-255 per channel
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

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn gray(v: u8) -> Self {
        Self::rgb(v, v, v)
    }

    /// Same colour with alpha from a 0-255 float (clamped)
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha.clamp(0.0, 255.0) as u8,
            ..self
        }
    }

    /// CSS `rgba(...)` string
    pub fn css(&self) -> String {
        format!(
            "rgba({},{},{},{:.3})",
            self.r,
            self.g,
            self.b,
            self.a as f32 / 255.0
        )
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::rgb(c[0], c[1], c[2])
    }
}

/// Horizontal text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    Top,
    #[default]
    Middle,
}

/// Font size, anchors and fill for one text draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
    pub align: Align,
    pub baseline: Baseline,
    pub bold: bool,
}

impl TextStyle {
    /// Centred on both axes
    pub fn new(size: f32, color: Color) -> Self {
        Self {
            size,
            color,
            align: Align::Center,
            baseline: Baseline::Middle,
            bold: false,
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn top(mut self) -> Self {
        self.baseline = Baseline::Top;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// 2D drawing surface
pub trait Canvas {
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn fill_round_rect(&mut self, rect: Rect, radius: f32, color: Color);
    fn stroke_round_rect(&mut self, rect: Rect, radius: f32, color: Color, width: f32);
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color);
    fn stroke_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color, width: f32);
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);
    fn line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32);
    fn text(&mut self, text: &str, pos: Vec2, style: TextStyle);
    /// Advance width of `text` at `size`
    fn measure_text(&mut self, text: &str, size: f32, bold: bool) -> f32;

    /// Save transform and alpha
    fn push(&mut self);
    /// Restore the last saved transform and alpha
    fn pop(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, angle: f32);
    fn scale(&mut self, factor: f32);
    /// Global alpha multiplier (0.0 - 1.0)
    fn set_alpha(&mut self, alpha: f32);
}

/// Rough advance width used where no font metrics exist
pub fn approx_text_width(text: &str, size: f32, bold: bool) -> f32 {
    let per_char = if bold { 0.6 } else { 0.55 };
    text.chars().count() as f32 * size * per_char
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCanvas;

impl Canvas for NullCanvas {
    fn fill_rect(&mut self, _rect: Rect, _color: Color) {}
    fn fill_round_rect(&mut self, _rect: Rect, _radius: f32, _color: Color) {}
    fn stroke_round_rect(&mut self, _rect: Rect, _radius: f32, _color: Color, _width: f32) {}
    fn fill_ellipse(&mut self, _center: Vec2, _radii: Vec2, _color: Color) {}
    fn stroke_ellipse(&mut self, _center: Vec2, _radii: Vec2, _color: Color, _width: f32) {}
    fn fill_polygon(&mut self, _points: &[Vec2], _color: Color) {}
    fn line(&mut self, _from: Vec2, _to: Vec2, _color: Color, _width: f32) {}
    fn text(&mut self, _text: &str, _pos: Vec2, _style: TextStyle) {}
    fn measure_text(&mut self, text: &str, size: f32, bold: bool) -> f32 {
        approx_text_width(text, size, bold)
    }
    fn push(&mut self) {}
    fn pop(&mut self) {}
    fn translate(&mut self, _offset: Vec2) {}
    fn rotate(&mut self, _angle: f32) {}
    fn scale(&mut self, _factor: f32) {}
    fn set_alpha(&mut self, _alpha: f32) {}
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Rect(Rect, Color),
    RoundRect(Rect, Color),
    Ellipse(Vec2, Vec2, Color),
    Polygon(usize, Color),
    Line(Vec2, Vec2, Color),
    Text(String, Vec2, Color),
    Push,
    Pop,
    Translate(Vec2),
    Alpha(f32),
}

/// Records draw calls for inspection
#[derive(Debug, Default, Clone)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
    depth: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every string drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text(s, _, _) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    /// Unbalanced push count; zero after a well-formed frame
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Canvas for RecordingCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::Rect(rect, color));
    }

    fn fill_round_rect(&mut self, rect: Rect, _radius: f32, color: Color) {
        self.calls.push(DrawCall::RoundRect(rect, color));
    }

    fn stroke_round_rect(&mut self, rect: Rect, _radius: f32, color: Color, _width: f32) {
        self.calls.push(DrawCall::RoundRect(rect, color));
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        self.calls.push(DrawCall::Ellipse(center, radii, color));
    }

    fn stroke_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color, _width: f32) {
        self.calls.push(DrawCall::Ellipse(center, radii, color));
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.calls.push(DrawCall::Polygon(points.len(), color));
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Color, _width: f32) {
        self.calls.push(DrawCall::Line(from, to, color));
    }

    fn text(&mut self, text: &str, pos: Vec2, style: TextStyle) {
        self.calls.push(DrawCall::Text(text.to_string(), pos, style.color));
    }

    fn measure_text(&mut self, text: &str, size: f32, bold: bool) -> f32 {
        approx_text_width(text, size, bold)
    }

    fn push(&mut self) {
        self.depth += 1;
        self.calls.push(DrawCall::Push);
    }

    fn pop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.calls.push(DrawCall::Pop);
    }

    fn translate(&mut self, offset: Vec2) {
        self.calls.push(DrawCall::Translate(offset));
    }

    fn rotate(&mut self, _angle: f32) {}

    fn scale(&mut self, _factor: f32) {}

    fn set_alpha(&mut self, alpha: f32) {
        self.calls.push(DrawCall::Alpha(alpha));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(Color::rgba(255, 0, 0, 255).css(), "rgba(255,0,0,1.000)");
        assert_eq!(Color::rgb(1, 2, 3).with_alpha(-4.0).a, 0);
    }

    #[test]
    fn test_recording_canvas_tracks_depth() {
        let mut c = RecordingCanvas::new();
        c.push();
        c.text("hi", Vec2::ZERO, TextStyle::new(12.0, Color::WHITE));
        assert_eq!(c.depth(), 1);
        c.pop();
        assert_eq!(c.depth(), 0);
        assert!(c.has_text("hi"));
    }
}
