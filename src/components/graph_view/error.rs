//! Error types for layout and rendering.

use thiserror::Error;

/// Failures of the layout adapter.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LayoutError {
	#[error("duplicate node id `{0}`")]
	DuplicateNode(String),

	#[error("edge {from} -> {to} references unknown node `{missing}`")]
	UnknownNode {
		from: String,
		to: String,
		missing: String,
	},

	#[error("layout engine failed: {0}")]
	Engine(String),
}

/// Failures of the graph engine and view.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
	#[error("no {kind} shape registered under `{name}`")]
	UnknownShape { kind: &'static str, name: String },

	#[error("edge {from} -> {to} references unknown node `{missing}`")]
	UnknownNode {
		from: String,
		to: String,
		missing: String,
	},

	#[error("surface error: {0}")]
	Surface(String),
}
