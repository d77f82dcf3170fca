//! Scene engine: turns a laid-out description into shape groups and handles
//! viewport state, hit-testing and click dispatch.
//!
//! The engine is a plain value with no DOM access. A [`Surface`] paints it
//! (see [`super::paint`]) and the view forwards pointer input to it.
//!
//! [`Surface`]: super::view::Surface

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use super::error::GraphError;
use super::options::{GraphOptions, Mode};
use super::registry::{EdgeConfig, NodeConfig, ShapeRegistry};
use super::scene::{Bounds, Group, Shape, ShapeId};
use super::types::{EdgeSpec, GraphDescription, NodeSpec, Point};

/// Pointer travel (pixels) after which a press counts as a drag, not a click.
const DRAG_THRESHOLD: f64 = 3.0;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%), clamped to the configured zoom bounds.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
struct PanState {
	active: bool,
	moved: bool,
	start_x: f64,
	start_y: f64,
	transform_start_x: f64,
	transform_start_y: f64,
}

/// Item category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
	Node,
	Edge,
}

/// A rendered node or edge.
#[derive(Clone, Debug)]
pub struct Item {
	/// Index into the loaded description's nodes or edges.
	pub index: usize,
	pub group: Group,
	pub key_shape: ShapeId,
	anchors: Option<Vec<Point>>,
}

impl Item {
	/// Absolute anchor positions derived from the key shape's bounds.
	fn anchor_positions(&self) -> Vec<Point> {
		let (Some(anchors), Some(bounds)) = (
			self.anchors.as_ref(),
			self.group
				.shape(self.key_shape)
				.and_then(Shape::bounds)
				.map(|b| b.translate(self.group.origin())),
		) else {
			return Vec::new();
		};
		anchors
			.iter()
			.map(|a| {
				Point::new(
					bounds.min.x + a.x * bounds.width(),
					bounds.min.y + a.y * bounds.height(),
				)
			})
			.collect()
	}

	/// Point where an edge heading towards `other` attaches.
	fn link_point(&self, other: Point) -> Point {
		self.anchor_positions()
			.into_iter()
			.min_by(|a, b| a.distance(other).total_cmp(&b.distance(other)))
			.unwrap_or_else(|| self.group.origin())
	}
}

/// Engine events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
	NodeClick,
	EdgeClick,
}

impl EventKind {
	pub fn as_str(self) -> &'static str {
		match self {
			EventKind::NodeClick => "node:click",
			EventKind::EdgeClick => "edge:click",
		}
	}
}

/// Snapshot of the model behind an item.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemModel {
	Node(NodeSpec),
	Edge(EdgeSpec),
}

/// Payload delivered to event handlers.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemEvent {
	pub kind: EventKind,
	pub item: ItemModel,
	/// The concrete shape under the pointer.
	pub target: Shape,
	/// Pointer position in world coordinates.
	pub point: Point,
}

type Listener = Box<dyn FnMut(&GraphEngine, &ItemEvent)>;

/// Owns the scene for one view.
pub struct GraphEngine {
	options: GraphOptions,
	registry: Rc<ShapeRegistry>,
	width: f64,
	height: f64,
	data: Option<GraphDescription>,
	nodes: Vec<Item>,
	edges: Vec<Item>,
	transform: ViewTransform,
	pan: PanState,
	listeners: Vec<(EventKind, Listener)>,
	destroyed: bool,
}

impl GraphEngine {
	pub fn new(options: GraphOptions, registry: Rc<ShapeRegistry>, width: f64, height: f64) -> Self {
		Self {
			options,
			registry,
			width,
			height,
			data: None,
			nodes: Vec::new(),
			edges: Vec::new(),
			transform: ViewTransform::default(),
			pan: PanState::default(),
			listeners: Vec::new(),
			destroyed: false,
		}
	}

	pub fn options(&self) -> &GraphOptions {
		&self.options
	}

	pub fn width(&self) -> f64 {
		self.width
	}

	pub fn height(&self) -> f64 {
		self.height
	}

	pub fn transform(&self) -> &ViewTransform {
		&self.transform
	}

	/// The loaded description.
	pub fn graph(&self) -> Option<&GraphDescription> {
		self.data.as_ref()
	}

	pub fn nodes(&self) -> &[Item] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Item] {
		&self.edges
	}

	pub fn is_destroyed(&self) -> bool {
		self.destroyed
	}

	/// Loads a description. Takes effect on the next [`render`](Self::render).
	pub fn data(&mut self, graph: GraphDescription) {
		self.data = Some(graph);
	}

	/// Rebuilds every item from the loaded description.
	///
	/// Fails when an item names an unregistered shape or an edge references a
	/// missing node; the scene is left empty in that case.
	pub fn render(&mut self) -> Result<(), GraphError> {
		self.nodes.clear();
		self.edges.clear();
		let Some(data) = self.data.as_ref() else {
			return Ok(());
		};

		let (nodes, edges) = self.build_items(data)?;
		self.nodes = nodes;
		self.edges = edges;

		if self.options.fit_view {
			self.fit_view(self.options.padding);
		}
		debug!(
			"engine: rendered {} nodes, {} edges",
			self.nodes.len(),
			self.edges.len()
		);
		Ok(())
	}

	fn build_items(&self, data: &GraphDescription) -> Result<(Vec<Item>, Vec<Item>), GraphError> {
		let mut nodes = Vec::with_capacity(data.nodes.len());
		let mut index = HashMap::with_capacity(data.nodes.len());

		for (i, node) in data.nodes.iter().enumerate() {
			let name = node
				.shape
				.as_deref()
				.unwrap_or(self.options.default_node.shape.as_str());
			let shape = self
				.registry
				.node(name)
				.ok_or_else(|| GraphError::UnknownShape {
					kind: "node",
					name: name.to_string(),
				})?;
			let cfg = NodeConfig {
				model: node,
				label_style: &self.options.default_node.label_style,
			};
			let mut group = Group::new(node.position().unwrap_or_default());
			let key_shape = shape.draw(&cfg, &mut group);
			index.insert(node.id.as_str(), i);
			nodes.push(Item {
				index: i,
				group,
				key_shape,
				anchors: shape.anchor_points(),
			});
		}

		let mut edges = Vec::with_capacity(data.edges.len());
		for (i, edge) in data.edges.iter().enumerate() {
			let endpoint = |id: &String| {
				index
					.get(id.as_str())
					.map(|&n| &nodes[n])
					.ok_or_else(|| GraphError::UnknownNode {
						from: edge.source.clone(),
						to: edge.target.clone(),
						missing: id.clone(),
					})
			};
			let (source, target) = (endpoint(&edge.source)?, endpoint(&edge.target)?);

			let name = edge
				.shape
				.as_deref()
				.unwrap_or(self.options.default_edge.shape.as_str());
			let recipe = self
				.registry
				.edge(name)
				.ok_or_else(|| GraphError::UnknownShape {
					kind: "edge",
					name: name.to_string(),
				})?;

			let start = edge.start_point.unwrap_or_else(|| {
				let toward = edge
					.control_points
					.first()
					.copied()
					.unwrap_or_else(|| target.group.origin());
				source.link_point(toward)
			});
			let end = edge.end_point.unwrap_or_else(|| {
				let from = edge.control_points.last().copied().unwrap_or(start);
				target.link_point(from)
			});

			let cfg = EdgeConfig {
				model: edge,
				start,
				end,
				control_points: &edge.control_points,
				style: &self.options.edge_style,
			};
			let mut group = Group::default();
			let key_shape = recipe.draw(&cfg, &mut group);
			edges.push(Item {
				index: i,
				group,
				key_shape,
				anchors: None,
			});
		}

		Ok((nodes, edges))
	}

	/// Drops the loaded description and every item. Listeners stay attached.
	pub fn clear(&mut self) {
		self.data = None;
		self.nodes.clear();
		self.edges.clear();
	}

	pub fn change_size(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// World bounds of all items.
	pub fn bounds(&self) -> Option<Bounds> {
		self.edges
			.iter()
			.chain(&self.nodes)
			.filter_map(|item| item.group.bounds())
			.reduce(Bounds::union)
	}

	/// Centers the content and scales it to fit inside the canvas minus
	/// `padding` on every side, within the zoom bounds.
	pub fn fit_view(&mut self, padding: f64) {
		let Some(bounds) = self.bounds() else {
			return;
		};
		let (avail_w, avail_h) = (self.width - 2.0 * padding, self.height - 2.0 * padding);
		let ratio = match (bounds.width() > 0.0, bounds.height() > 0.0) {
			(true, true) => (avail_w / bounds.width()).min(avail_h / bounds.height()),
			(true, false) => avail_w / bounds.width(),
			(false, true) => avail_h / bounds.height(),
			(false, false) => 1.0,
		};
		let k = self.clamp_zoom(ratio);
		let center = bounds.center();
		self.transform = ViewTransform {
			x: self.width / 2.0 - center.x * k,
			y: self.height / 2.0 - center.y * k,
			k,
		};
	}

	fn clamp_zoom(&self, k: f64) -> f64 {
		k.clamp(self.options.min_zoom, self.options.max_zoom.max(self.options.min_zoom))
	}

	/// Releases the scene and all listeners. Further input is ignored.
	pub fn destroy(&mut self) {
		self.clear();
		self.listeners.clear();
		self.destroyed = true;
	}

	/// Subscribes `handler` to `kind` events.
	pub fn on(&mut self, kind: EventKind, handler: impl FnMut(&GraphEngine, &ItemEvent) + 'static) {
		self.listeners.push((kind, Box::new(handler)));
	}

	pub fn screen_to_world(&self, sx: f64, sy: f64) -> Point {
		Point::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Top-most item and shape under a screen position. Nodes sit above edges.
	pub fn item_at(&self, sx: f64, sy: f64) -> Option<(ItemKind, usize, ShapeId)> {
		let world = self.screen_to_world(sx, sy);
		let hit = |kind: ItemKind, items: &[Item]| {
			items
				.iter()
				.enumerate()
				.rev()
				.find_map(|(i, item)| item.group.hit(world).map(|shape| (kind, i, shape)))
		};
		hit(ItemKind::Node, &self.nodes).or_else(|| hit(ItemKind::Edge, &self.edges))
	}

	fn event_at(&self, sx: f64, sy: f64) -> Option<ItemEvent> {
		let (kind, i, shape) = self.item_at(sx, sy)?;
		let data = self.data.as_ref()?;
		let (event, item, model) = match kind {
			ItemKind::Node => {
				let item = &self.nodes[i];
				let model = ItemModel::Node(data.nodes.get(item.index)?.clone());
				(EventKind::NodeClick, item, model)
			}
			ItemKind::Edge => {
				let item = &self.edges[i];
				let model = ItemModel::Edge(data.edges.get(item.index)?.clone());
				(EventKind::EdgeClick, item, model)
			}
		};
		Some(ItemEvent {
			kind: event,
			item: model,
			target: item.group.shape(shape)?.clone(),
			point: self.screen_to_world(sx, sy),
		})
	}

	/// Dispatches a click at a screen position. A click ending a drag is
	/// swallowed.
	pub fn click(&mut self, sx: f64, sy: f64) {
		if self.destroyed || std::mem::take(&mut self.pan.moved) {
			return;
		}
		let Some(event) = self.event_at(sx, sy) else {
			return;
		};
		debug!("engine: {} at ({sx}, {sy})", event.kind.as_str());

		let mut listeners = std::mem::take(&mut self.listeners);
		for (kind, listener) in listeners.iter_mut() {
			if *kind == event.kind {
				listener(self, &event);
			}
		}
		self.listeners = listeners;
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if self.destroyed || !self.options.has_mode(Mode::DragCanvas) {
			return;
		}
		self.pan = PanState {
			active: true,
			moved: false,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	/// Returns whether the viewport moved.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> bool {
		if !self.pan.active {
			return false;
		}
		let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
		if !self.pan.moved && (dx * dx + dy * dy).sqrt() < DRAG_THRESHOLD {
			return false;
		}
		self.pan.moved = true;
		self.transform.x = self.pan.transform_start_x + dx;
		self.transform.y = self.pan.transform_start_y + dy;
		true
	}

	pub fn pointer_up(&mut self) {
		self.pan.active = false;
	}

	/// Zooms around a screen position. Returns whether the viewport changed.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) -> bool {
		if self.destroyed || !self.options.has_mode(Mode::ZoomCanvas) {
			return false;
		}
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.zoom_to(self.transform.k * factor, Point::new(sx, sy))
	}

	/// Sets the zoom level, keeping the screen point `about` fixed.
	pub fn zoom_to(&mut self, k: f64, about: Point) -> bool {
		let new_k = self.clamp_zoom(k);
		if (new_k - self.transform.k).abs() < f64::EPSILON {
			return false;
		}
		let ratio = new_k / self.transform.k;
		self.transform.x = about.x - (about.x - self.transform.x) * ratio;
		self.transform.y = about.y - (about.y - self.transform.y) * ratio;
		self.transform.k = new_k;
		true
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use super::*;
	use crate::components::graph_view::registry::BaseShape;
	use crate::components::graph_view::scene::{ShapeAttrs, ShapeKind};

	fn sample() -> GraphDescription {
		let mut a = NodeSpec::new("a", "A");
		(a.x, a.y) = (Some(0.0), Some(0.0));
		let mut b = NodeSpec::new("b", "B");
		(b.x, b.y) = (Some(200.0), Some(0.0));
		GraphDescription {
			nodes: vec![a, b],
			edges: vec![EdgeSpec::new("a", "b")],
		}
	}

	fn engine_with(options: GraphOptions) -> GraphEngine {
		let mut engine =
			GraphEngine::new(options, Rc::new(ShapeRegistry::with_builtins()), 400.0, 200.0);
		engine.data(sample());
		engine.render().unwrap();
		engine
	}

	fn engine() -> GraphEngine {
		engine_with(GraphOptions::default())
	}

	#[test]
	fn renders_one_item_per_model() {
		let engine = engine();
		assert_eq!(engine.nodes().len(), 2);
		assert_eq!(engine.edges().len(), 1);
		assert_eq!(engine.nodes()[1].group.origin(), Point::new(200.0, 0.0));
	}

	#[test]
	fn edges_without_geometry_run_center_to_center() {
		let engine = engine();
		let edge = &engine.edges()[0];
		let Some(ShapeKind::Path { commands, .. }) =
			edge.group.shape(edge.key_shape).map(|s| &s.kind)
		else {
			panic!("expected a path");
		};
		assert_eq!(commands.len(), 2);
	}

	#[test]
	fn edges_attach_to_nearest_anchor() {
		let mut registry = ShapeRegistry::with_builtins();
		struct Box20;
		impl crate::components::graph_view::registry::NodeRecipe for Box20 {
			fn draw(&self, _cfg: &NodeConfig<'_>, group: &mut Group) -> ShapeId {
				group.add_shape(
					ShapeKind::Rect {
						x: -10.0,
						y: -10.0,
						width: 20.0,
						height: 20.0,
						radius: 0.0,
					},
					ShapeAttrs::default(),
				)
			}
			fn anchor_points(&self) -> Option<Vec<Point>> {
				Some(vec![Point::new(0.0, 0.5), Point::new(1.0, 0.5)])
			}
		}
		registry.register_node("box", Box20, BaseShape::Bare);
		let options = GraphOptions {
			default_node: crate::components::graph_view::options::DefaultNode {
				shape: "box".into(),
				..Default::default()
			},
			..Default::default()
		};
		let mut engine = GraphEngine::new(options, Rc::new(registry), 400.0, 200.0);
		engine.data(sample());
		engine.render().unwrap();

		let edge = &engine.edges()[0];
		let Some(ShapeKind::Path { commands, .. }) =
			edge.group.shape(edge.key_shape).map(|s| &s.kind)
		else {
			panic!("expected a path");
		};
		use crate::components::graph_view::scene::PathCommand;
		assert_eq!(commands[0], PathCommand::MoveTo(Point::new(10.0, 0.0)));
		assert_eq!(commands[1], PathCommand::LineTo(Point::new(190.0, 0.0)));
	}

	#[test]
	fn unknown_shape_fails_render() {
		let mut data = sample();
		data.nodes[0].shape = Some("hexagon".into());
		let mut engine = GraphEngine::new(
			GraphOptions::default(),
			Rc::new(ShapeRegistry::with_builtins()),
			400.0,
			200.0,
		);
		engine.data(data);

		assert_eq!(
			engine.render(),
			Err(GraphError::UnknownShape {
				kind: "node",
				name: "hexagon".into()
			})
		);
		assert!(engine.nodes().is_empty());
	}

	#[test]
	fn dangling_edge_fails_render() {
		let mut data = sample();
		data.edges.push(EdgeSpec::new("a", "zz"));
		let mut engine = GraphEngine::new(
			GraphOptions::default(),
			Rc::new(ShapeRegistry::with_builtins()),
			400.0,
			200.0,
		);
		engine.data(data);

		assert!(matches!(
			engine.render(),
			Err(GraphError::UnknownNode { missing, .. }) if missing == "zz"
		));
	}

	#[test]
	fn fit_view_centers_and_clamps() {
		let mut engine = engine();
		engine.fit_view(0.0);

		// Content spans x -20..220 and y -20..20 (circle radius 20).
		let t = engine.transform().clone();
		assert!((t.k - 400.0 / 240.0).abs() < 1e-9);
		let center = engine.screen_to_world(200.0, 100.0);
		assert!((center.x - 100.0).abs() < 1e-9);
		assert!(center.y.abs() < 1e-9);

		engine.change_size(100_000.0, 100_000.0);
		engine.fit_view(0.0);
		assert_eq!(engine.transform().k, engine.options().max_zoom);
	}

	#[test]
	fn node_click_reaches_node_listeners_only() {
		let mut engine = engine();
		let seen: Rc<RefCell<Vec<EventKind>>> = Rc::default();
		let (nodes_seen, edges_seen) = (seen.clone(), seen.clone());
		engine.on(EventKind::NodeClick, move |_, ev| nodes_seen.borrow_mut().push(ev.kind));
		engine.on(EventKind::EdgeClick, move |_, ev| edges_seen.borrow_mut().push(ev.kind));

		engine.click(200.0, 0.0);
		engine.click(100.0, 0.0);
		engine.click(100.0, 150.0);

		assert_eq!(*seen.borrow(), vec![EventKind::NodeClick, EventKind::EdgeClick]);
	}

	#[test]
	fn click_payload_snapshots_the_model() {
		let mut engine = engine();
		let payload: Rc<RefCell<Option<ItemEvent>>> = Rc::default();
		let sink = payload.clone();
		engine.on(EventKind::NodeClick, move |_, ev| *sink.borrow_mut() = Some(ev.clone()));

		engine.click(205.0, 5.0);

		let event = payload.borrow().clone().unwrap();
		assert_eq!(event.item, ItemModel::Node(sample().nodes[1].clone()));
		assert!(event.target.is_circle());
		assert_eq!(event.point, Point::new(205.0, 5.0));
	}

	#[test]
	fn drag_pans_and_swallows_the_click() {
		let mut engine = engine();
		let clicks = Rc::new(RefCell::new(0));
		let counter = clicks.clone();
		engine.on(EventKind::NodeClick, move |_, _| *counter.borrow_mut() += 1);

		engine.pointer_down(50.0, 50.0);
		assert!(engine.pointer_move(80.0, 60.0));
		engine.pointer_up();
		engine.click(80.0, 60.0);

		assert_eq!(engine.transform().x, 30.0);
		assert_eq!(engine.transform().y, 10.0);
		assert_eq!(*clicks.borrow(), 0);

		engine.click(230.0, 10.0);
		assert_eq!(*clicks.borrow(), 1);
	}

	#[test]
	fn wheel_zoom_requires_mode_and_respects_bounds() {
		let mut engine = engine();
		assert!(!engine.wheel(0.0, 0.0, -1.0));

		let mut engine = engine_with(GraphOptions {
			modes: vec![Mode::ZoomCanvas],
			max_zoom: 1.2,
			..Default::default()
		});
		assert!(engine.wheel(100.0, 100.0, -1.0));
		assert!(engine.wheel(100.0, 100.0, -1.0));
		assert_eq!(engine.transform().k, 1.2);
		assert!(!engine.wheel(100.0, 100.0, -1.0));
		// The pointer position stays fixed in world space.
		let p = engine.screen_to_world(100.0, 100.0);
		assert!((p.x - 100.0).abs() < 1e-9 && (p.y - 100.0).abs() < 1e-9);
	}

	#[test]
	fn destroy_detaches_listeners_and_scene() {
		let mut engine = engine();
		let clicks = Rc::new(RefCell::new(0));
		let counter = clicks.clone();
		engine.on(EventKind::NodeClick, move |_, _| *counter.borrow_mut() += 1);

		engine.destroy();
		engine.click(0.0, 0.0);

		assert!(engine.is_destroyed());
		assert!(engine.nodes().is_empty() && engine.graph().is_none());
		assert_eq!(*clicks.borrow(), 0);
	}
}
