//! Graph description fed to the layout adapter and the engine.

use serde::{Deserialize, Serialize};

/// A 2-D point in canvas (world) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn midpoint(self, other: Point) -> Self {
		Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}

	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (other.x - self.x, other.y - self.y);
		(dx * dx + dy * dy).sqrt()
	}
}

/// A node of the graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
	/// Unique identifier, referenced by edges.
	pub id: String,
	#[serde(default)]
	pub label: String,
	/// Style variant tag, looked up by shape recipes (e.g. `"begin"`).
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	#[serde(default)]
	pub selected: bool,
	/// Highlight flag read by status-style shapes.
	#[serde(default)]
	pub active: bool,
	/// Shape name overriding the view's default node shape.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub shape: Option<String>,
	/// Center x, set by layout.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	/// Center y, set by layout.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
}

impl NodeSpec {
	pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			..Default::default()
		}
	}

	pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
		self.kind = Some(kind.into());
		self
	}

	pub fn selected(mut self, selected: bool) -> Self {
		self.selected = selected;
		self
	}

	/// Layout position, if the node has been laid out.
	pub fn position(&self) -> Option<Point> {
		Some(Point::new(self.x?, self.y?))
	}
}

/// A directed edge between two nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSpec {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	#[serde(default)]
	pub active: bool,
	/// Shape name overriding the view's default edge shape.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub shape: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub start_point: Option<Point>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub end_point: Option<Point>,
	/// Intermediate path points, exclusive of the endpoints.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub control_points: Vec<Point>,
}

impl EdgeSpec {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			..Default::default()
		}
	}

	pub fn active(mut self, active: bool) -> Self {
		self.active = active;
		self
	}
}

/// Complete graph description: nodes and edges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
	pub nodes: Vec<NodeSpec>,
	#[serde(default)]
	pub edges: Vec<EdgeSpec>,
}

impl GraphDescription {
	pub fn node(&self, id: &str) -> Option<&NodeSpec> {
		self.nodes.iter().find(|node| node.id == id)
	}
}
