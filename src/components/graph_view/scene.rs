//! Retained scene: primitive shapes grouped per graph item.
//!
//! Shape recipes add shapes to a [`Group`] whose origin is the item's
//! position. The engine keeps the groups, paints them and hit-tests pointer
//! positions against them. Coordinates inside a group are local to its origin.

use super::theme::Color;
use super::types::Point;

/// Index of a shape within its group.
pub type ShapeId = usize;

/// Extra distance (world units) around a stroke that still counts as a hit.
const STROKE_HIT_TOLERANCE: f64 = 3.0;

/// Line segments used to approximate one quadratic curve.
const CURVE_STEPS: usize = 16;

/// Path drawing commands, SVG style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
	/// `M`
	MoveTo(Point),
	/// `L`
	LineTo(Point),
	/// `Q`
	QuadTo { ctrl: Point, to: Point },
	/// `T`: quadratic whose control point mirrors the previous one.
	SmoothQuadTo(Point),
}

/// Path segment with smooth quadratics resolved to explicit control points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment {
	Move(Point),
	Line(Point),
	Quad { ctrl: Point, to: Point },
}

/// Resolves `T` commands against the preceding control point.
pub fn resolve_path(commands: &[PathCommand]) -> Vec<Segment> {
	let mut current = Point::default();
	let mut last_ctrl: Option<Point> = None;

	commands
		.iter()
		.map(|command| match *command {
			PathCommand::MoveTo(to) => {
				current = to;
				last_ctrl = None;
				Segment::Move(to)
			}
			PathCommand::LineTo(to) => {
				current = to;
				last_ctrl = None;
				Segment::Line(to)
			}
			PathCommand::QuadTo { ctrl, to } => {
				current = to;
				last_ctrl = Some(ctrl);
				Segment::Quad { ctrl, to }
			}
			PathCommand::SmoothQuadTo(to) => {
				let ctrl = match last_ctrl {
					Some(prev) => Point::new(2.0 * current.x - prev.x, 2.0 * current.y - prev.y),
					None => current,
				};
				current = to;
				last_ctrl = Some(ctrl);
				Segment::Quad { ctrl, to }
			}
		})
		.collect()
}

/// Flattens resolved segments into polylines, one per subpath.
fn flatten(segments: &[Segment]) -> Vec<Vec<Point>> {
	let mut lines: Vec<Vec<Point>> = Vec::new();
	let mut current = Point::default();

	for segment in segments {
		match *segment {
			Segment::Move(to) => {
				lines.push(vec![to]);
				current = to;
			}
			Segment::Line(to) => {
				if lines.is_empty() {
					lines.push(vec![current]);
				}
				if let Some(line) = lines.last_mut() {
					line.push(to);
				}
				current = to;
			}
			Segment::Quad { ctrl, to } => {
				if lines.is_empty() {
					lines.push(vec![current]);
				}
				let from = current;
				if let Some(line) = lines.last_mut() {
					line.extend((1..=CURVE_STEPS).map(|i| {
						let t = i as f64 / CURVE_STEPS as f64;
						let u = 1.0 - t;
						Point::new(
							u * u * from.x + 2.0 * u * t * ctrl.x + t * t * to.x,
							u * u * from.y + 2.0 * u * t * ctrl.y + t * t * to.y,
						)
					}));
				}
				current = to;
			}
		}
	}

	lines
}

/// End point of a path and the unit direction it is approached from.
pub fn path_end(segments: &[Segment]) -> Option<(Point, (f64, f64))> {
	let mut current = Point::default();
	let mut end = None;

	for segment in segments {
		let (from, to) = match *segment {
			Segment::Move(to) => {
				current = to;
				continue;
			}
			Segment::Line(to) => (current, to),
			Segment::Quad { ctrl, to } => (ctrl, to),
		};
		let length = from.distance(to);
		if length > f64::EPSILON {
			end = Some((to, ((to.x - from.x) / length, (to.y - from.y) / length)));
		}
		current = to;
	}

	end
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let length_sq = dx * dx + dy * dy;
	if length_sq < f64::EPSILON {
		return p.distance(a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
	p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Triangular arrowhead drawn at the end of a path.
///
/// The triangle spans `-size..size` along the path direction around an origin
/// placed `offset` before the path end.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrow {
	pub size: f64,
	pub offset: f64,
}

impl Arrow {
	/// Arrow whose tip sits exactly on the path end.
	pub const fn triangle(size: f64) -> Self {
		Self { size, offset: size }
	}

	/// Vertices `[tip, left base, right base]` for a path ending at `end`
	/// approached along the unit vector `direction`.
	pub fn polygon(&self, end: Point, direction: (f64, f64)) -> [Point; 3] {
		let (ux, uy) = direction;
		let origin = Point::new(end.x - ux * self.offset, end.y - uy * self.offset);
		let place = |along: f64, across: f64| {
			Point::new(
				origin.x + along * ux - across * uy,
				origin.y + along * uy + across * ux,
			)
		};
		[
			place(self.size, 0.0),
			place(-self.size, -self.size),
			place(-self.size, self.size),
		]
	}
}

/// Drop shadow applied while filling a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
	pub color: Color,
	pub offset_x: f64,
	pub offset_y: f64,
	pub blur: f64,
}

/// Paint attributes shared by all shape kinds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeAttrs {
	/// Identifier for later lookups, unique within a group.
	pub id: Option<String>,
	pub fill: Option<Color>,
	pub stroke: Option<Color>,
	pub line_width: f64,
	pub shadow: Option<Shadow>,
}

impl ShapeAttrs {
	pub fn fill(color: Color) -> Self {
		Self {
			fill: Some(color),
			..Default::default()
		}
	}

	pub fn stroke(color: Color, line_width: f64) -> Self {
		Self {
			stroke: Some(color),
			line_width,
			..Default::default()
		}
	}

	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	pub fn with_shadow(mut self, shadow: Shadow) -> Self {
		self.shadow = Some(shadow);
		self
	}
}

/// Geometry of a primitive shape in group-local coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
	/// Rectangle with its top-left corner at `(x, y)`.
	Rect {
		x: f64,
		y: f64,
		width: f64,
		height: f64,
		radius: f64,
	},
	Circle { center: Point, r: f64 },
	Path {
		commands: Vec<PathCommand>,
		end_arrow: Option<Arrow>,
	},
	/// Text centered on `at`.
	Text {
		at: Point,
		text: String,
		font_size: f64,
	},
}

impl ShapeKind {
	pub fn type_name(&self) -> &'static str {
		match self {
			ShapeKind::Rect { .. } => "rect",
			ShapeKind::Circle { .. } => "circle",
			ShapeKind::Path { .. } => "path",
			ShapeKind::Text { .. } => "text",
		}
	}
}

/// One primitive shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
	pub kind: ShapeKind,
	pub attrs: ShapeAttrs,
}

impl Shape {
	pub fn is_circle(&self) -> bool {
		matches!(self.kind, ShapeKind::Circle { .. })
	}

	/// Bounding box in group-local coordinates.
	pub fn bounds(&self) -> Option<Bounds> {
		match &self.kind {
			ShapeKind::Rect {
				x,
				y,
				width,
				height,
				..
			} => Some(Bounds::new(
				Point::new(*x, *y),
				Point::new(x + width, y + height),
			)),
			ShapeKind::Circle { center, r } => Some(Bounds::new(
				Point::new(center.x - r, center.y - r),
				Point::new(center.x + r, center.y + r),
			)),
			ShapeKind::Path { commands, end_arrow } => {
				let segments = resolve_path(commands);
				let mut points: Vec<Point> = flatten(&segments).into_iter().flatten().collect();
				if let (Some(arrow), Some((end, direction))) = (end_arrow, path_end(&segments)) {
					points.extend(arrow.polygon(end, direction));
				}
				Bounds::from_points(points)
			}
			ShapeKind::Text {
				at,
				text,
				font_size,
			} => {
				let half_width = text.chars().count() as f64 * font_size * 0.3;
				Some(Bounds::new(
					Point::new(at.x - half_width, at.y - font_size / 2.0),
					Point::new(at.x + half_width, at.y + font_size / 2.0),
				))
			}
		}
	}

	/// Whether a group-local point hits this shape. Paths are hit along their
	/// stroke only; text is never hit.
	pub fn contains(&self, p: Point) -> bool {
		match &self.kind {
			ShapeKind::Rect { .. } => self.bounds().is_some_and(|b| b.contains(p)),
			ShapeKind::Circle { center, r } => center.distance(p) <= *r,
			ShapeKind::Path { commands, .. } => {
				let reach = (self.attrs.line_width / 2.0).max(STROKE_HIT_TOLERANCE);
				flatten(&resolve_path(commands)).iter().any(|line| {
					line.windows(2)
						.any(|pair| distance_to_segment(p, pair[0], pair[1]) <= reach)
				})
			}
			ShapeKind::Text { .. } => false,
		}
	}
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min: Point,
	pub max: Point,
}

impl Bounds {
	pub fn new(min: Point, max: Point) -> Self {
		Self { min, max }
	}

	pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
		points.into_iter().fold(None, |acc: Option<Bounds>, p| {
			let point = Bounds::new(p, p);
			Some(acc.map_or(point, |b| b.union(point)))
		})
	}

	pub fn union(self, other: Bounds) -> Self {
		Self::new(
			Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
			Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
		)
	}

	pub fn translate(self, by: Point) -> Self {
		Self::new(
			Point::new(self.min.x + by.x, self.min.y + by.y),
			Point::new(self.max.x + by.x, self.max.y + by.y),
		)
	}

	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}

	pub fn center(&self) -> Point {
		self.min.midpoint(self.max)
	}

	pub fn contains(&self, p: Point) -> bool {
		(self.min.x..=self.max.x).contains(&p.x) && (self.min.y..=self.max.y).contains(&p.y)
	}
}

/// Drawing surface handed to shape recipes: an origin plus ordered shapes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Group {
	origin: Point,
	shapes: Vec<Shape>,
}

impl Group {
	pub fn new(origin: Point) -> Self {
		Self {
			origin,
			shapes: Vec::new(),
		}
	}

	pub fn origin(&self) -> Point {
		self.origin
	}

	/// Appends a shape, painted above the ones added before it.
	pub fn add_shape(&mut self, kind: ShapeKind, attrs: ShapeAttrs) -> ShapeId {
		self.shapes.push(Shape { kind, attrs });
		self.shapes.len() - 1
	}

	pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
		self.shapes.get(id)
	}

	pub fn shapes(&self) -> &[Shape] {
		&self.shapes
	}

	/// Looks a shape up by its `attrs.id`.
	pub fn find(&self, id: &str) -> Option<&Shape> {
		self.shapes
			.iter()
			.find(|shape| shape.attrs.id.as_deref() == Some(id))
	}

	/// Bounding box of all shapes in world coordinates.
	pub fn bounds(&self) -> Option<Bounds> {
		self.shapes
			.iter()
			.filter_map(Shape::bounds)
			.reduce(Bounds::union)
			.map(|b| b.translate(self.origin))
	}

	/// Top-most shape under a world point.
	pub fn hit(&self, world: Point) -> Option<ShapeId> {
		let local = Point::new(world.x - self.origin.x, world.y - self.origin.y);
		self.shapes.iter().rposition(|shape| shape.contains(local))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn smooth_quad_mirrors_previous_control() {
		let segments = resolve_path(&[
			PathCommand::MoveTo(Point::new(0.0, 0.0)),
			PathCommand::QuadTo {
				ctrl: Point::new(10.0, 0.0),
				to: Point::new(20.0, 10.0),
			},
			PathCommand::SmoothQuadTo(Point::new(40.0, 20.0)),
		]);

		assert_eq!(
			segments[2],
			Segment::Quad {
				ctrl: Point::new(30.0, 20.0),
				to: Point::new(40.0, 20.0),
			}
		);
	}

	#[test]
	fn smooth_quad_without_previous_control_uses_current_point() {
		let segments = resolve_path(&[
			PathCommand::MoveTo(Point::new(5.0, 5.0)),
			PathCommand::SmoothQuadTo(Point::new(10.0, 5.0)),
		]);

		assert_eq!(
			segments[1],
			Segment::Quad {
				ctrl: Point::new(5.0, 5.0),
				to: Point::new(10.0, 5.0),
			}
		);
	}

	#[test]
	fn arrow_triangle_tip_touches_path_end() {
		let arrow = Arrow::triangle(4.0);
		let [tip, left, right] = arrow.polygon(Point::new(100.0, 50.0), (1.0, 0.0));

		assert_eq!(tip, Point::new(100.0, 50.0));
		assert_eq!(left, Point::new(92.0, 46.0));
		assert_eq!(right, Point::new(92.0, 54.0));
	}

	#[test]
	fn path_end_follows_last_segment() {
		let segments = resolve_path(&[
			PathCommand::MoveTo(Point::new(0.0, 0.0)),
			PathCommand::LineTo(Point::new(0.0, 10.0)),
		]);

		assert_eq!(path_end(&segments), Some((Point::new(0.0, 10.0), (0.0, 1.0))));
	}

	#[test]
	fn hit_testing_prefers_top_shape() {
		let mut group = Group::new(Point::new(100.0, 100.0));
		let rect = group.add_shape(
			ShapeKind::Rect {
				x: -10.0,
				y: -10.0,
				width: 20.0,
				height: 20.0,
				radius: 0.0,
			},
			ShapeAttrs::default(),
		);
		let circle = group.add_shape(
			ShapeKind::Circle {
				center: Point::default(),
				r: 3.0,
			},
			ShapeAttrs::default().with_id("dot"),
		);

		assert_eq!(group.hit(Point::new(100.0, 100.0)), Some(circle));
		assert_eq!(group.hit(Point::new(108.0, 92.0)), Some(rect));
		assert_eq!(group.hit(Point::new(120.0, 100.0)), None);
		assert!(group.find("dot").is_some_and(Shape::is_circle));
	}

	#[test]
	fn paths_are_hit_along_the_stroke_only() {
		let mut group = Group::default();
		group.add_shape(
			ShapeKind::Path {
				commands: vec![
					PathCommand::MoveTo(Point::new(0.0, 0.0)),
					PathCommand::LineTo(Point::new(100.0, 0.0)),
				],
				end_arrow: None,
			},
			ShapeAttrs::stroke(Color::rgb(0, 0, 0), 2.0),
		);

		assert_eq!(group.hit(Point::new(50.0, 2.0)), Some(0));
		assert_eq!(group.hit(Point::new(50.0, 20.0)), None);
	}

	#[test]
	fn group_bounds_are_in_world_space() {
		let mut group = Group::new(Point::new(10.0, 20.0));
		group.add_shape(
			ShapeKind::Circle {
				center: Point::default(),
				r: 5.0,
			},
			ShapeAttrs::default(),
		);

		let bounds = group.bounds().unwrap();
		assert_eq!(bounds.min, Point::new(5.0, 15.0));
		assert_eq!(bounds.max, Point::new(15.0, 25.0));
		assert!(Group::default().bounds().is_none());
	}
}
