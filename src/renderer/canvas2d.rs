//! Browser canvas 2D backend

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Align, Baseline, Canvas, Color, TextStyle};
use crate::sim::Rect;

const FONT_FAMILY: &str = "Arial, sans-serif";

/// `Canvas` over a `CanvasRenderingContext2d`
pub struct Canvas2d {
    ctx: CanvasRenderingContext2d,
}

impl Canvas2d {
    /// Grab the 2D context of `canvas`
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { ctx })
    }

    /// Reset the transform to map the logical arena onto the backing store
    pub fn fit(&self, logical: Vec2, physical: Vec2) {
        let sx = (physical.x / logical.x) as f64;
        let sy = (physical.y / logical.y) as f64;
        self.ctx.set_transform(sx, 0.0, 0.0, sy, 0.0, 0.0).ok();
        self.ctx.set_global_alpha(1.0);
    }

    fn font(size: f32, bold: bool) -> String {
        let weight = if bold { "bold " } else { "" };
        format!("{weight}{size:.1}px {FONT_FAMILY}")
    }

    fn round_rect_path(&self, rect: Rect, radius: f32) {
        let r = radius.min(rect.width() / 2.0).min(rect.height() / 2.0).max(0.0) as f64;
        let (l, t, rt, b) = (
            rect.left as f64,
            rect.top as f64,
            rect.right as f64,
            rect.bottom as f64,
        );
        let ctx = &self.ctx;
        ctx.begin_path();
        ctx.move_to(l + r, t);
        ctx.arc_to(rt, t, rt, b, r).ok();
        ctx.arc_to(rt, b, l, b, r).ok();
        ctx.arc_to(l, b, l, t, r).ok();
        ctx.arc_to(l, t, rt, t, r).ok();
        ctx.close_path();
    }

    fn ellipse_path(&self, center: Vec2, radii: Vec2) {
        self.ctx.begin_path();
        self.ctx
            .ellipse(
                center.x as f64,
                center.y as f64,
                radii.x.max(0.0) as f64,
                radii.y.max(0.0) as f64,
                0.0,
                0.0,
                std::f64::consts::TAU,
            )
            .ok();
    }
}

impl Canvas for Canvas2d {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill_rect(
            rect.left as f64,
            rect.top as f64,
            rect.width() as f64,
            rect.height() as f64,
        );
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        self.round_rect_path(rect, radius);
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill();
    }

    fn stroke_round_rect(&mut self, rect: Rect, radius: f32, color: Color, width: f32) {
        self.round_rect_path(rect, radius);
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        self.ellipse_path(center, radii);
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill();
    }

    fn stroke_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color, width: f32) {
        self.ellipse_path(center, radii);
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.ctx.close_path();
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill();
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn text(&mut self, text: &str, pos: Vec2, style: TextStyle) {
        self.ctx.set_font(&Self::font(style.size, style.bold));
        self.ctx.set_text_align(match style.align {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        });
        self.ctx.set_text_baseline(match style.baseline {
            Baseline::Top => "top",
            Baseline::Middle => "middle",
        });
        self.ctx.set_fill_style_str(&style.color.css());
        self.ctx.fill_text(text, pos.x as f64, pos.y as f64).ok();
    }

    fn measure_text(&mut self, text: &str, size: f32, bold: bool) -> f32 {
        self.ctx.set_font(&Self::font(size, bold));
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width() as f32,
            Err(_) => super::approx_text_width(text, size, bold),
        }
    }

    fn push(&mut self) {
        self.ctx.save();
    }

    fn pop(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, offset: Vec2) {
        self.ctx.translate(offset.x as f64, offset.y as f64).ok();
    }

    fn rotate(&mut self, angle: f32) {
        self.ctx.rotate(angle as f64).ok();
    }

    fn scale(&mut self, factor: f32) {
        self.ctx.scale(factor as f64, factor as f64).ok();
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }
}
