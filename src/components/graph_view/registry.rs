//! Named shape recipes looked up by the engine while rendering.
//!
//! A recipe is a stateless drawing routine for one kind of node or edge. It
//! receives the item's merged configuration and a [`Group`] to draw into, and
//! returns the key shape used for hit-testing and anchoring. Recipes are
//! registered by name on a [`ShapeRegistry`], which is built once and shared
//! by every engine.

use std::collections::HashMap;

use log::debug;

use super::options::{EdgeStyle, LabelStyle};
use super::scene::{Arrow, Group, PathCommand, ShapeAttrs, ShapeId, ShapeKind};
use super::theme::Color;
use super::types::{EdgeSpec, NodeSpec, Point};

/// Node model merged with the view's node defaults.
#[derive(Clone, Copy, Debug)]
pub struct NodeConfig<'a> {
	pub model: &'a NodeSpec,
	pub label_style: &'a LabelStyle,
}

/// Edge model with resolved geometry and the view's edge style.
#[derive(Clone, Copy, Debug)]
pub struct EdgeConfig<'a> {
	pub model: &'a EdgeSpec,
	pub start: Point,
	pub end: Point,
	pub control_points: &'a [Point],
	pub style: &'a EdgeStyle,
}

/// Draws one kind of node. The group origin is the node's center.
pub trait NodeRecipe {
	/// Adds the node's shapes to `group` and returns its key shape.
	fn draw(&self, cfg: &NodeConfig<'_>, group: &mut Group) -> ShapeId;

	/// Edge attachment points relative to the key shape's bounding box,
	/// `(0, 0)` top-left to `(1, 1)` bottom-right.
	fn anchor_points(&self) -> Option<Vec<Point>> {
		None
	}
}

/// Draws one kind of edge. The group origin is the world origin.
pub trait EdgeRecipe {
	fn draw(&self, cfg: &EdgeConfig<'_>, group: &mut Group) -> ShapeId;
}

impl<F> NodeRecipe for F
where
	F: Fn(&NodeConfig<'_>, &mut Group) -> ShapeId,
{
	fn draw(&self, cfg: &NodeConfig<'_>, group: &mut Group) -> ShapeId {
		self(cfg, group)
	}
}

impl<F> EdgeRecipe for F
where
	F: Fn(&EdgeConfig<'_>, &mut Group) -> ShapeId,
{
	fn draw(&self, cfg: &EdgeConfig<'_>, group: &mut Group) -> ShapeId {
		self(cfg, group)
	}
}

/// Behaviour a node shape inherits on top of its recipe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BaseShape {
	/// One key shape plus the node label centered on it.
	#[default]
	SingleShape,
	/// Only what the recipe draws.
	Bare,
}

/// A registered node recipe with its base behaviour.
pub struct NodeShape {
	recipe: Box<dyn NodeRecipe>,
	base: BaseShape,
}

impl NodeShape {
	/// Runs the recipe, then the base behaviour. Returns the key shape.
	pub fn draw(&self, cfg: &NodeConfig<'_>, group: &mut Group) -> ShapeId {
		let key = self.recipe.draw(cfg, group);
		if self.base == BaseShape::SingleShape && !cfg.model.label.is_empty() {
			group.add_shape(
				ShapeKind::Text {
					at: Point::default(),
					text: cfg.model.label.clone(),
					font_size: cfg.label_style.font_size,
				},
				ShapeAttrs::fill(cfg.label_style.fill),
			);
		}
		key
	}

	pub fn anchor_points(&self) -> Option<Vec<Point>> {
		self.recipe.anchor_points()
	}
}

/// Name to recipe lookup for node and edge shapes.
#[derive(Default)]
pub struct ShapeRegistry {
	nodes: HashMap<String, NodeShape>,
	edges: HashMap<String, Box<dyn EdgeRecipe>>,
}

impl ShapeRegistry {
	/// An empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry holding the built-in `"circle"` node and `"line"` edge.
	pub fn with_builtins() -> Self {
		let mut registry = Self::new();
		registry
			.register_node("circle", CircleNode, BaseShape::SingleShape)
			.register_edge("line", LineEdge);
		registry
	}

	/// Registers a node shape. A later registration under the same name wins.
	pub fn register_node(
		&mut self,
		name: impl Into<String>,
		recipe: impl NodeRecipe + 'static,
		base: BaseShape,
	) -> &mut Self {
		let name = name.into();
		let shape = NodeShape {
			recipe: Box::new(recipe),
			base,
		};
		if self.nodes.insert(name.clone(), shape).is_some() {
			debug!("registry: node shape `{name}` replaced");
		}
		self
	}

	/// Registers an edge shape. A later registration under the same name wins.
	pub fn register_edge(
		&mut self,
		name: impl Into<String>,
		recipe: impl EdgeRecipe + 'static,
	) -> &mut Self {
		let name = name.into();
		if self.edges.insert(name.clone(), Box::new(recipe)).is_some() {
			debug!("registry: edge shape `{name}` replaced");
		}
		self
	}

	pub fn node(&self, name: &str) -> Option<&NodeShape> {
		self.nodes.get(name)
	}

	pub fn edge(&self, name: &str) -> Option<&dyn EdgeRecipe> {
		self.edges.get(name).map(|recipe| recipe.as_ref())
	}
}

/// Built-in filled circle node.
struct CircleNode;

impl NodeRecipe for CircleNode {
	fn draw(&self, _cfg: &NodeConfig<'_>, group: &mut Group) -> ShapeId {
		group.add_shape(
			ShapeKind::Circle {
				center: Point::default(),
				r: 20.0,
			},
			ShapeAttrs {
				fill: Some(Color::rgb(0xc6, 0xe5, 0xff)),
				stroke: Some(Color::rgb(0x5b, 0x8f, 0xf9)),
				line_width: 1.0,
				..Default::default()
			},
		)
	}
}

/// Built-in polyline edge through the control points.
struct LineEdge;

impl EdgeRecipe for LineEdge {
	fn draw(&self, cfg: &EdgeConfig<'_>, group: &mut Group) -> ShapeId {
		let commands = std::iter::once(PathCommand::MoveTo(cfg.start))
			.chain(cfg.control_points.iter().copied().map(PathCommand::LineTo))
			.chain(std::iter::once(PathCommand::LineTo(cfg.end)))
			.collect();
		group.add_shape(
			ShapeKind::Path {
				commands,
				end_arrow: cfg.style.end_arrow.then(|| Arrow::triangle(4.0)),
			},
			ShapeAttrs::stroke(cfg.style.stroke, cfg.style.line_width),
		)
	}
}
