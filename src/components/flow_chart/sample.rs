//! Built-in flow shown when no value is supplied.

use crate::components::graph_view::{EdgeSpec, GraphDescription, NodeSpec};

/// A seven step flow with two branches that join at the end.
pub fn flow_data() -> GraphDescription {
	GraphDescription {
		nodes: vec![
			NodeSpec::new("1", "Begin")
				.with_kind("begin")
				.selected(true),
			NodeSpec::new("2", "Step 2").selected(true),
			NodeSpec::new("3", "Step 3"),
			NodeSpec::new("4", "Step 4"),
			NodeSpec::new("5", "Step 5"),
			NodeSpec::new("6", "Step 6"),
			NodeSpec::new("7", "End")
				.with_kind("end")
				.selected(true),
		],
		edges: vec![
			EdgeSpec::new("1", "2").active(true),
			EdgeSpec::new("1", "3"),
			EdgeSpec::new("2", "5").active(true),
			EdgeSpec::new("5", "6"),
			EdgeSpec::new("6", "7"),
			EdgeSpec::new("3", "4"),
			EdgeSpec::new("4", "7"),
		],
	}
}
