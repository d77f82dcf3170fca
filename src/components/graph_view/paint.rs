//! Canvas painting for the graph engine.
//!
//! Paints in three passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Edges (world space)
//! 3. Nodes on top (world space)

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::engine::GraphEngine;
use super::scene::{Group, Segment, Shape, ShapeKind, path_end, resolve_path};
use super::types::Point;

/// Paints the complete scene. `pixel_ratio` maps CSS pixels to backing-store
/// pixels.
pub fn paint(engine: &GraphEngine, ctx: &CanvasRenderingContext2d, pixel_ratio: f64) {
	let _ = ctx.set_transform(pixel_ratio, 0.0, 0.0, pixel_ratio, 0.0, 0.0);

	ctx.set_fill_style_str(&engine.options().background.to_css());
	ctx.fill_rect(0.0, 0.0, engine.width(), engine.height());

	let transform = engine.transform();
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);

	for item in engine.edges().iter().chain(engine.nodes()) {
		draw_group(ctx, &item.group);
	}

	ctx.restore();
}

fn draw_group(ctx: &CanvasRenderingContext2d, group: &Group) {
	let origin = group.origin();
	ctx.save();
	let _ = ctx.translate(origin.x, origin.y);
	for shape in group.shapes() {
		draw_shape(ctx, shape);
	}
	ctx.restore();
}

fn draw_shape(ctx: &CanvasRenderingContext2d, shape: &Shape) {
	let attrs = &shape.attrs;
	match &shape.kind {
		ShapeKind::Rect {
			x,
			y,
			width,
			height,
			radius,
		} => {
			rounded_rect(ctx, *x, *y, *width, *height, *radius);
			fill_and_stroke(ctx, shape);
		}
		ShapeKind::Circle { center, r } => {
			ctx.begin_path();
			let _ = ctx.arc(center.x, center.y, *r, 0.0, PI * 2.0);
			fill_and_stroke(ctx, shape);
		}
		ShapeKind::Path {
			commands,
			end_arrow,
		} => {
			let segments = resolve_path(commands);
			trace_segments(ctx, &segments);
			if let Some(stroke) = attrs.stroke {
				ctx.set_stroke_style_str(&stroke.to_css());
				ctx.set_line_width(attrs.line_width);
				ctx.stroke();
			}

			let (Some(arrow), Some((end, direction))) = (end_arrow, path_end(&segments)) else {
				return;
			};
			let Some(color) = attrs.stroke.or(attrs.fill) else {
				return;
			};
			let [tip, left, right] = arrow.polygon(end, direction);
			ctx.begin_path();
			ctx.move_to(tip.x, tip.y);
			ctx.line_to(left.x, left.y);
			ctx.line_to(right.x, right.y);
			ctx.close_path();
			ctx.set_fill_style_str(&color.to_css());
			ctx.fill();
		}
		ShapeKind::Text {
			at,
			text,
			font_size,
		} => {
			let Some(fill) = attrs.fill else {
				return;
			};
			ctx.set_fill_style_str(&fill.to_css());
			ctx.set_font(&format!("{font_size}px sans-serif"));
			ctx.set_text_align("center");
			ctx.set_text_baseline("middle");
			let _ = ctx.fill_text(text, at.x, at.y);
		}
	}
}

/// Fills (with shadow, if any) and strokes the current path.
fn fill_and_stroke(ctx: &CanvasRenderingContext2d, shape: &Shape) {
	let attrs = &shape.attrs;
	if let Some(fill) = attrs.fill {
		ctx.save();
		if let Some(shadow) = attrs.shadow {
			ctx.set_shadow_color(&shadow.color.to_css());
			ctx.set_shadow_offset_x(shadow.offset_x);
			ctx.set_shadow_offset_y(shadow.offset_y);
			ctx.set_shadow_blur(shadow.blur);
		}
		ctx.set_fill_style_str(&fill.to_css());
		ctx.fill();
		ctx.restore();
	}
	if let Some(stroke) = attrs.stroke {
		ctx.set_stroke_style_str(&stroke.to_css());
		ctx.set_line_width(attrs.line_width);
		ctx.stroke();
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn trace_segments(ctx: &CanvasRenderingContext2d, segments: &[Segment]) {
	ctx.begin_path();
	for segment in segments {
		match *segment {
			Segment::Move(Point { x, y }) => ctx.move_to(x, y),
			Segment::Line(Point { x, y }) => ctx.line_to(x, y),
			Segment::Quad { ctrl, to } => ctx.quadratic_curve_to(ctrl.x, ctrl.y, to.x, to.y),
		}
	}
}
