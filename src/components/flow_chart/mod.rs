//! Flow chart built on the graph view.
//!
//! [`FlowChart`] lays its value out left to right, renders it with the
//! flow-chart shapes and reports clicks on steps and on the status markers
//! sitting on each connection.

pub mod sample;
pub mod shapes;

use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};

use crate::components::graph_view::{
	self, Color, DefaultEdge, DefaultNode, EdgeSpec, EdgeStyle, Graph, GraphDescription,
	GraphEngine, GraphHandlers, GraphOptions, ItemEvent, ItemModel, LabelStyle, LayoutConfig,
	Mode, NodeSpec, ShapeRegistry,
};

pub use sample::flow_data;
pub use shapes::{register_flow_shapes, status_marker_id};

/// Payload of a click on an edge's status marker.
#[derive(Clone, Debug, PartialEq)]
pub struct RelatedNode {
	/// Marker id, `statusNode{source}-{target}`.
	pub id: String,
	pub edge: EdgeSpec,
}

/// CSS size of the chart container.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartStyle {
	pub width: String,
	pub height: String,
}

impl Default for ChartStyle {
	fn default() -> Self {
		Self {
			width: "100%".to_string(),
			height: "100%".to_string(),
		}
	}
}

/// View options used by the flow chart.
pub fn flow_options() -> GraphOptions {
	GraphOptions {
		padding: 16.0,
		background: Color::rgb(0xf6, 0xf6, 0xf6),
		pixel_ratio: Some(2.0),
		min_zoom: 0.5,
		max_zoom: 2.0,
		modes: vec![Mode::DragCanvas, Mode::ZoomCanvas],
		default_node: DefaultNode {
			shape: shapes::NODE_SHAPE.to_string(),
			label_style: LabelStyle {
				fill: Color::WHITE,
				font_size: 14.0,
			},
		},
		default_edge: DefaultEdge {
			shape: shapes::EDGE_SHAPE.to_string(),
		},
		edge_style: EdgeStyle {
			stroke: Color::rgb(0xcc, 0xcc, 0xcc),
			line_width: 2.0,
			end_arrow: true,
		},
		fit_view: false,
	}
}

/// Built-in shapes plus the flow-chart shapes.
pub fn flow_registry() -> ShapeRegistry {
	let mut registry = ShapeRegistry::with_builtins();
	register_flow_shapes(&mut registry);
	registry
}

/// Snapshot of the clicked node.
pub fn node_click_payload(event: &ItemEvent) -> Option<NodeSpec> {
	match &event.item {
		ItemModel::Node(node) => Some(node.clone()),
		ItemModel::Edge(_) => None,
	}
}

/// Related-node payload for an edge click. Only clicks landing on the status
/// marker count; the curve itself is ignored. The id is the clicked marker's
/// own, or the derived marker id when the circle carries none.
pub fn related_node_payload(event: &ItemEvent) -> Option<RelatedNode> {
	let ItemModel::Edge(edge) = &event.item else {
		return None;
	};
	event.target.is_circle().then(|| RelatedNode {
		id: event
			.target
			.attrs
			.id
			.clone()
			.unwrap_or_else(|| status_marker_id(&edge.source, &edge.target)),
		edge: edge.clone(),
	})
}

/// Auto-laid-out flow chart.
///
/// `value` defaults to [`flow_data`]. Each successful layout is passed to the
/// view and reported through `on_change`. A failed layout is logged and
/// reported through `on_layout_error`; the chart keeps showing the last good
/// layout.
#[component]
pub fn FlowChart(
	#[prop(into, optional)] value: Option<Signal<GraphDescription>>,
	#[prop(optional)] style: ChartStyle,
	#[prop(optional)] layout: LayoutConfig,
	#[prop(optional)] registry: Option<Rc<ShapeRegistry>>,
	#[prop(into, optional)] on_change: Option<Callback<GraphDescription>>,
	#[prop(into, optional)] on_click_node: Option<Callback<NodeSpec>>,
	#[prop(into, optional)] on_click_related_node: Option<Callback<RelatedNode>>,
	#[prop(into, optional)] on_layout_error: Option<Callback<String>>,
) -> impl IntoView {
	let value = value.unwrap_or_else(|| Signal::derive(flow_data));
	let registry = registry.unwrap_or_else(|| Rc::new(flow_registry()));
	let laid_out = RwSignal::new(GraphDescription::default());

	Effect::new(move |_| {
		let input = value.get();
		match graph_view::layout(&input, &layout) {
			Ok(data) => {
				debug!("flow chart: laid out {} nodes", data.nodes.len());
				laid_out.set(data.clone());
				if let Some(cb) = on_change {
					cb.run(data);
				}
			}
			Err(err) => {
				error!("flow chart: layout failed: {err}");
				if let Some(cb) = on_layout_error {
					cb.run(err.to_string());
				}
			}
		}
	});

	let handlers = GraphHandlers {
		on_node_click: Some(Rc::new(move |_: &GraphEngine, event: &ItemEvent| {
			if let (Some(cb), Some(node)) = (on_click_node, node_click_payload(event)) {
				cb.run(node);
			}
		})),
		on_edge_click: Some(Rc::new(move |_: &GraphEngine, event: &ItemEvent| {
			if let (Some(cb), Some(related)) = (on_click_related_node, related_node_payload(event)) {
				cb.run(related);
			}
		})),
	};

	view! {
		<Graph
			data=laid_out
			registry=registry
			options=flow_options()
			handlers=handlers
			width=style.width
			height=style.height
		/>
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use super::*;
	use crate::components::graph_view::{EventKind, Point};

	fn engine() -> (GraphEngine, GraphDescription) {
		let data = graph_view::layout(&flow_data(), &LayoutConfig::default()).unwrap();
		let mut engine = GraphEngine::new(flow_options(), Rc::new(flow_registry()), 1200.0, 600.0);
		engine.data(data.clone());
		engine.render().unwrap();
		(engine, data)
	}

	#[test]
	fn flow_options_match_the_chart_look() {
		let options = flow_options();
		assert_eq!(options.padding, 16.0);
		assert_eq!(options.background.to_css(), "#f6f6f6");
		assert_eq!(options.pixel_ratio, Some(2.0));
		assert_eq!((options.min_zoom, options.max_zoom), (0.5, 2.0));
		assert!(options.has_mode(Mode::DragCanvas) && options.has_mode(Mode::ZoomCanvas));
		assert_eq!(options.default_node.shape, "node");
		assert_eq!(options.default_node.label_style.fill, Color::WHITE);
		assert_eq!(options.default_edge.shape, "line-with-arrow");
		assert!(options.edge_style.end_arrow);
	}

	#[test]
	fn sample_renders_with_flow_shapes() {
		let (engine, _) = engine();
		assert_eq!(engine.nodes().len(), 7);
		assert_eq!(engine.edges().len(), 7);
		assert!(engine.edges()[0].group.find("statusNode1-2").is_some());
	}

	#[test]
	fn node_clicks_carry_the_node_model() {
		let (mut engine, data) = engine();
		let seen: Rc<RefCell<Vec<NodeSpec>>> = Rc::default();
		let sink = seen.clone();
		engine.on(EventKind::NodeClick, move |_, event| {
			sink.borrow_mut().extend(node_click_payload(event));
		});

		let first = data.nodes[0].position().unwrap();
		engine.click(first.x, first.y);

		assert_eq!(*seen.borrow(), vec![data.nodes[0].clone()]);
	}

	#[test]
	fn only_marker_clicks_are_related_node_clicks() {
		let (mut engine, data) = engine();
		let seen: Rc<RefCell<Vec<Option<RelatedNode>>>> = Rc::default();
		let sink = seen.clone();
		engine.on(EventKind::EdgeClick, move |_, event| {
			sink.borrow_mut().push(related_node_payload(event));
		});

		let edge = &data.edges[0];
		let (start, end) = (edge.start_point.unwrap(), edge.end_point.unwrap());
		let marker = start.midpoint(end);
		engine.click(marker.x, marker.y);
		// Where the curve meets the arrowhead.
		engine.click(end.x - 8.0, end.y);

		assert_eq!(
			*seen.borrow(),
			vec![
				Some(RelatedNode {
					id: "statusNode1-2".into(),
					edge: edge.clone(),
				}),
				None,
			]
		);
	}

	fn edge_circle_click(attrs: graph_view::ShapeAttrs) -> ItemEvent {
		ItemEvent {
			kind: EventKind::EdgeClick,
			item: ItemModel::Edge(EdgeSpec::new("a", "b")),
			target: graph_view::Shape {
				kind: graph_view::ShapeKind::Circle {
					center: Point::default(),
					r: 6.0,
				},
				attrs,
			},
			point: Point::default(),
		}
	}

	#[test]
	fn node_payload_ignores_edges() {
		let event = edge_circle_click(Default::default());

		assert_eq!(node_click_payload(&event), None);
		assert_eq!(related_node_payload(&event).map(|r| r.id), Some("statusNodea-b".into()));
	}

	#[test]
	fn related_node_id_comes_from_the_clicked_marker() {
		let event = edge_circle_click(graph_view::ShapeAttrs::default().with_id("badge-a-b"));

		let related = related_node_payload(&event).unwrap();
		assert_eq!(related.id, "badge-a-b");
		assert_eq!(related.edge, EdgeSpec::new("a", "b"));
	}
}
