//! Flow-chart node and edge shapes.

use crate::components::graph_view::{
	Arrow, BaseShape, Color, EdgeConfig, EdgeRecipe, Group, NodeConfig, NodeRecipe, NodeSpec,
	PathCommand, Point, Shadow, ShapeAttrs, ShapeId, ShapeKind, ShapeRegistry,
};

/// Rounded step box.
pub const NODE_SHAPE: &str = "node";
/// Small status dot.
pub const STATUS_NODE_SHAPE: &str = "statusNode";
/// Curved edge with an arrowhead and a status marker at its midpoint.
pub const EDGE_SHAPE: &str = "line-with-arrow";

const NODE_WIDTH: f64 = 150.0;
const NODE_HEIGHT: f64 = 50.0;
const NODE_RADIUS: f64 = 4.0;

const FALLBACK_FILL: Color = Color::rgb(0xff, 0xc0, 0x69);
const FALLBACK_ACTIVE_FILL: Color = Color::rgb(0xff, 0xa9, 0x40);
const MUTED: Color = Color::rgb(0xcc, 0xcc, 0xcc);

/// Offset between the curve's end and the true edge end, filled by the arrow.
const ARROW_GAP: f64 = 8.0;
const MARKER_RADIUS: f64 = 6.0;

/// Fill pair for a node `type`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct NodeStyle {
	fill: Color,
	active_fill: Color,
}

fn node_style(kind: Option<&str>) -> Option<NodeStyle> {
	match kind? {
		"begin" => Some(NodeStyle {
			fill: Color::rgb(0x69, 0xc0, 0xff),
			active_fill: Color::rgb(0x40, 0xa9, 0xff),
		}),
		"end" => Some(NodeStyle {
			fill: Color::rgb(0x95, 0xde, 0x64),
			active_fill: Color::rgb(0x73, 0xd1, 0x3d),
		}),
		_ => None,
	}
}

/// Fill of a flow node: its type's active fill when selected, plain fill
/// otherwise, with orange fallbacks for untyped nodes.
pub fn node_fill(model: &NodeSpec) -> Color {
	let style = node_style(model.kind.as_deref());
	match (style, model.selected) {
		(Some(style), true) => style.active_fill,
		(Some(style), false) => style.fill,
		(None, true) => FALLBACK_ACTIVE_FILL,
		(None, false) => FALLBACK_FILL,
	}
}

/// Id of the status marker drawn on the edge `source -> target`.
pub fn status_marker_id(source: &str, target: &str) -> String {
	format!("statusNode{source}-{target}")
}

/// 150x50 rounded box centered on the node, attached left and right.
pub struct FlowNode;

impl NodeRecipe for FlowNode {
	fn draw(&self, cfg: &NodeConfig<'_>, group: &mut Group) -> ShapeId {
		let mut attrs = ShapeAttrs::fill(node_fill(cfg.model));
		if cfg.model.selected {
			attrs = attrs.with_shadow(Shadow {
				color: Color::rgba(0, 0, 0, 0.15),
				offset_x: 2.0,
				offset_y: 2.0,
				blur: 10.0,
			});
		}
		group.add_shape(
			ShapeKind::Rect {
				x: -NODE_WIDTH / 2.0,
				y: -NODE_HEIGHT / 2.0,
				width: NODE_WIDTH,
				height: NODE_HEIGHT,
				radius: NODE_RADIUS,
			},
			attrs,
		)
	}

	fn anchor_points(&self) -> Option<Vec<Point>> {
		Some(vec![Point::new(0.0, 0.5), Point::new(1.0, 0.5)])
	}
}

pub struct StatusNode;

impl NodeRecipe for StatusNode {
	fn draw(&self, cfg: &NodeConfig<'_>, group: &mut Group) -> ShapeId {
		let fill = if cfg.model.active {
			Color::rgb(0xb3, 0x7f, 0xeb)
		} else {
			MUTED
		};
		group.add_shape(
			ShapeKind::Circle {
				center: Point::default(),
				r: MARKER_RADIUS,
			},
			ShapeAttrs::fill(fill),
		)
	}
}

/// Symmetric quadratic curve from start to end, finished by a straight
/// arrowhead run, plus a clickable status marker at the midpoint.
pub struct LineWithArrow;

impl EdgeRecipe for LineWithArrow {
	fn draw(&self, cfg: &EdgeConfig<'_>, group: &mut Group) -> ShapeId {
		let (start, end) = (cfg.start, cfg.end);
		let center = start.midpoint(end);
		let control = Point::new((start.x + center.x) / 2.0, start.y);

		let path = group.add_shape(
			ShapeKind::Path {
				commands: vec![
					PathCommand::MoveTo(start),
					PathCommand::QuadTo {
						ctrl: Point::new(control.x + ARROW_GAP, control.y),
						to: center,
					},
					PathCommand::SmoothQuadTo(Point::new(end.x - ARROW_GAP, end.y)),
					PathCommand::LineTo(end),
				],
				end_arrow: Some(Arrow::triangle(ARROW_GAP / 2.0)),
			},
			ShapeAttrs::stroke(MUTED, 1.6),
		);

		let marker_fill = if cfg.model.active {
			Color::rgb(0xab, 0x83, 0xe4)
		} else {
			MUTED
		};
		group.add_shape(
			ShapeKind::Circle {
				center,
				r: MARKER_RADIUS,
			},
			ShapeAttrs::fill(marker_fill)
				.with_id(status_marker_id(&cfg.model.source, &cfg.model.target)),
		);

		path
	}
}

/// Registers the flow-chart shapes on `registry`.
pub fn register_flow_shapes(registry: &mut ShapeRegistry) -> &mut ShapeRegistry {
	registry
		.register_node(NODE_SHAPE, FlowNode, BaseShape::SingleShape)
		.register_node(STATUS_NODE_SHAPE, StatusNode, BaseShape::SingleShape)
		.register_edge(EDGE_SHAPE, LineWithArrow)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_view::{
		EdgeSpec, EdgeStyle, LabelStyle, Segment, path_end, resolve_path,
	};

	fn draw_node(recipe: &dyn NodeRecipe, model: &NodeSpec) -> Group {
		let label_style = LabelStyle::default();
		let mut group = Group::default();
		recipe.draw(
			&NodeConfig {
				model,
				label_style: &label_style,
			},
			&mut group,
		);
		group
	}

	fn draw_edge(model: &EdgeSpec, start: Point, end: Point) -> (Group, ShapeId) {
		let style = EdgeStyle::default();
		let mut group = Group::default();
		let key = LineWithArrow.draw(
			&EdgeConfig {
				model,
				start,
				end,
				control_points: &[],
				style: &style,
			},
			&mut group,
		);
		(group, key)
	}

	#[test]
	fn node_fill_follows_type_and_selection() {
		let begin = NodeSpec::new("1", "").with_kind("begin");
		let end = NodeSpec::new("7", "").with_kind("end");
		let plain = NodeSpec::new("3", "");

		assert_eq!(node_fill(&begin), Color::rgb(0x69, 0xc0, 0xff));
		assert_eq!(node_fill(&begin.clone().selected(true)), Color::rgb(0x40, 0xa9, 0xff));
		assert_eq!(node_fill(&end), Color::rgb(0x95, 0xde, 0x64));
		assert_eq!(node_fill(&end.selected(true)), Color::rgb(0x73, 0xd1, 0x3d));
		assert_eq!(node_fill(&plain), Color::rgb(0xff, 0xc0, 0x69));
		assert_eq!(node_fill(&plain.clone().selected(true)), Color::rgb(0xff, 0xa9, 0x40));
		assert_eq!(node_fill(&plain.with_kind("other")), FALLBACK_FILL);
	}

	#[test]
	fn selected_nodes_cast_a_shadow() {
		let selected = draw_node(&FlowNode, &NodeSpec::new("2", "").selected(true));
		let idle = draw_node(&FlowNode, &NodeSpec::new("3", ""));

		let shadow = selected.shapes()[0].attrs.shadow.unwrap();
		assert_eq!(shadow.color, Color::rgba(0, 0, 0, 0.15));
		assert_eq!((shadow.offset_x, shadow.offset_y, shadow.blur), (2.0, 2.0, 10.0));
		assert!(idle.shapes()[0].attrs.shadow.is_none());
		assert_eq!(
			idle.shapes()[0].kind,
			ShapeKind::Rect {
				x: -75.0,
				y: -25.0,
				width: 150.0,
				height: 50.0,
				radius: 4.0,
			}
		);
	}

	#[test]
	fn flow_nodes_anchor_left_and_right() {
		assert_eq!(
			FlowNode.anchor_points(),
			Some(vec![Point::new(0.0, 0.5), Point::new(1.0, 0.5)])
		);
		assert_eq!(StatusNode.anchor_points(), None);
	}

	#[test]
	fn status_node_highlights_when_active() {
		let mut model = NodeSpec::new("s", "");
		assert_eq!(draw_node(&StatusNode, &model).shapes()[0].attrs.fill, Some(MUTED));

		model.active = true;
		let group = draw_node(&StatusNode, &model);
		assert_eq!(group.shapes()[0].attrs.fill, Some(Color::rgb(0xb3, 0x7f, 0xeb)));
		assert!(group.shapes()[0].is_circle());
	}

	#[test]
	fn edge_curve_stops_short_for_the_arrow() {
		let model = EdgeSpec::new("1", "2");
		let (start, end) = (Point::new(0.0, 0.0), Point::new(100.0, 40.0));
		let (group, key) = draw_edge(&model, start, end);

		let ShapeKind::Path {
			commands,
			end_arrow: Some(arrow),
		} = &group.shapes()[key].kind
		else {
			panic!("edge key shape should be a path with an arrow");
		};
		assert_eq!(
			commands,
			&vec![
				PathCommand::MoveTo(start),
				PathCommand::QuadTo {
					ctrl: Point::new(33.0, 0.0),
					to: Point::new(50.0, 20.0),
				},
				PathCommand::SmoothQuadTo(Point::new(92.0, 40.0)),
				PathCommand::LineTo(end),
			]
		);

		let segments = resolve_path(commands);
		assert_eq!(
			segments[2],
			Segment::Quad {
				ctrl: Point::new(67.0, 40.0),
				to: Point::new(92.0, 40.0),
			}
		);
		let (tip_at, direction) = path_end(&segments).unwrap();
		let [tip, left, right] = arrow.polygon(tip_at, direction);
		assert_eq!(tip, end);
		assert_eq!((left.x, right.x), (92.0, 92.0));
		assert_eq!(group.shapes()[key].attrs.stroke, Some(MUTED));
		assert_eq!(group.shapes()[key].attrs.line_width, 1.6);
	}

	#[test]
	fn edge_marker_sits_on_the_midpoint() {
		let model = EdgeSpec::new("2", "5").active(true);
		let (group, _) = draw_edge(&model, Point::new(0.0, 0.0), Point::new(100.0, 40.0));

		let marker = group.find("statusNode2-5").unwrap();
		assert_eq!(
			marker.kind,
			ShapeKind::Circle {
				center: Point::new(50.0, 20.0),
				r: 6.0
			}
		);
		assert_eq!(marker.attrs.fill, Some(Color::rgb(0xab, 0x83, 0xe4)));

		let (idle, _) = draw_edge(&EdgeSpec::new("1", "3"), Point::default(), Point::new(10.0, 0.0));
		assert_eq!(idle.find("statusNode1-3").unwrap().attrs.fill, Some(MUTED));
	}

	#[test]
	fn registers_all_flow_shapes() {
		let mut registry = ShapeRegistry::new();
		register_flow_shapes(&mut registry);

		assert!(registry.node(NODE_SHAPE).is_some());
		assert!(registry.node(STATUS_NODE_SHAPE).is_some());
		assert!(registry.edge(EDGE_SHAPE).is_some());
	}
}
