//! View configuration passed through to the engine.

use serde::Deserialize;

use super::theme::Color;

/// Canvas interaction behaviours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
	/// Drag the background to pan.
	DragCanvas,
	/// Wheel to zoom around the pointer.
	ZoomCanvas,
}

/// Style of the node labels added by single-shape nodes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelStyle {
	pub fill: Color,
	pub font_size: f64,
}

impl Default for LabelStyle {
	fn default() -> Self {
		Self {
			fill: Color::rgb(89, 89, 89),
			font_size: 12.0,
		}
	}
}

/// Defaults merged into every node.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DefaultNode {
	/// Registered node shape used when a node names none.
	pub shape: String,
	pub label_style: LabelStyle,
}

impl Default for DefaultNode {
	fn default() -> Self {
		Self {
			shape: "circle".to_string(),
			label_style: LabelStyle::default(),
		}
	}
}

/// Defaults merged into every edge.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DefaultEdge {
	/// Registered edge shape used when an edge names none.
	pub shape: String,
}

impl Default for DefaultEdge {
	fn default() -> Self {
		Self {
			shape: "line".to_string(),
		}
	}
}

/// Stroke style handed to edge recipes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeStyle {
	pub stroke: Color,
	pub line_width: f64,
	pub end_arrow: bool,
}

impl Default for EdgeStyle {
	fn default() -> Self {
		Self {
			stroke: Color::rgb(0xe2, 0xe2, 0xe2),
			line_width: 1.0,
			end_arrow: false,
		}
	}
}

/// Engine and view options.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphOptions {
	/// Padding kept around the content by fit-view.
	pub padding: f64,
	pub modes: Vec<Mode>,
	pub default_node: DefaultNode,
	pub default_edge: DefaultEdge,
	pub edge_style: EdgeStyle,
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Backing-store pixels per CSS pixel; `None` uses the device ratio.
	pub pixel_ratio: Option<f64>,
	pub background: Color,
	/// Fit the content into the canvas after every render.
	pub fit_view: bool,
}

impl Default for GraphOptions {
	fn default() -> Self {
		Self {
			padding: 0.0,
			modes: vec![Mode::DragCanvas],
			default_node: DefaultNode::default(),
			default_edge: DefaultEdge::default(),
			edge_style: EdgeStyle::default(),
			min_zoom: 0.2,
			max_zoom: 10.0,
			pixel_ratio: None,
			background: Color::WHITE,
			fit_view: false,
		}
	}
}

impl GraphOptions {
	pub fn has_mode(&self, mode: Mode) -> bool {
		self.modes.contains(&mode)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let options: GraphOptions = serde_json::from_str(
			r##"{
				"padding": 16,
				"modes": ["drag-canvas", "zoom-canvas"],
				"defaultNode": { "shape": "node", "labelStyle": { "fill": "#fff" } },
				"background": "#F6F6F6"
			}"##,
		)
		.unwrap();

		assert_eq!(options.padding, 16.0);
		assert!(options.has_mode(Mode::ZoomCanvas));
		assert_eq!(options.default_node.shape, "node");
		assert_eq!(options.default_node.label_style.fill, Color::WHITE);
		assert_eq!(options.default_node.label_style.font_size, 12.0);
		assert_eq!(options.default_edge.shape, "line");
		assert_eq!(options.max_zoom, 10.0);
		assert_eq!(options.pixel_ratio, None);
	}

	#[test]
	fn default_modes_only_drag() {
		let options = GraphOptions::default();
		assert!(options.has_mode(Mode::DragCanvas));
		assert!(!options.has_mode(Mode::ZoomCanvas));
	}
}
