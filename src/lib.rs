//! graph-view: canvas graph view with layered auto-layout for Leptos.
//!
//! This crate provides a WASM-based graph view component that renders a
//! declarative node/edge description with pluggable shapes, pan/zoom and click
//! events, plus a flow-chart component that lays its input out left to right.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, debug, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::flow_chart::{ChartStyle, FlowChart, RelatedNode, flow_data};
pub use components::graph_view::{
	EdgeSpec, Graph, GraphDescription, GraphOptions, LayoutConfig, NodeSpec, ShapeRegistry, layout,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("graph-view: logging initialized");
}

/// Parse the JSON body of the script element with the given id.
fn load_json<T: DeserializeOwned>(id: &str) -> Option<T> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<T>(&json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("graph-view: failed to parse #{id}: {}", e);
			None
		}
	}
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], edges: [...] }
fn load_graph_data() -> Option<GraphDescription> {
	let data = load_json::<GraphDescription>("graph-data")?;
	info!(
		"graph-view: loaded {} nodes, {} edges",
		data.nodes.len(),
		data.edges.len()
	);
	Some(data)
}

/// Load layout settings from a script element with id="layout-config".
/// Expected format: JSON with { direction: "LR", nodeWidth: 150, ... }
fn load_layout_config() -> Option<LayoutConfig> {
	load_json("layout-config")
}

/// Main application component.
/// Loads flow data from the DOM (or falls back to the sample flow) and renders
/// it as a flow chart.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let flow = load_graph_data().unwrap_or_else(flow_data);
	let value = Signal::derive(move || flow.clone());
	let layout = load_layout_config().unwrap_or_default();
	let style = ChartStyle {
		width: "100%".into(),
		height: "100vh".into(),
	};
	let status = RwSignal::new(String::from("Click a step or a connection marker."));

	let on_click_node = move |node: NodeSpec| {
		info!("graph-view: node {} clicked", node.id);
		status.set(format!("Node {}: {}", node.id, node.label));
	};
	let on_click_related_node = move |related: RelatedNode| {
		info!("graph-view: marker {} clicked", related.id);
		status.set(format!(
			"Connection {} -> {}{}",
			related.edge.source,
			related.edge.target,
			if related.edge.active { " (active)" } else { "" }
		));
	};
	let on_change = move |data: GraphDescription| {
		debug!("graph-view: layout changed ({} nodes)", data.nodes.len());
	};
	let on_layout_error = move |message: String| {
		status.set(format!("Layout failed: {message}"));
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Flow Chart" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="flow-chart-page">
			<FlowChart
				value=value
				layout=layout
				style=style
				on_change=on_change
				on_click_node=on_click_node
				on_click_related_node=on_click_related_node
				on_layout_error=on_layout_error
			/>
			<div class="graph-overlay">
				<h1>"Flow Chart"</h1>
				<p class="subtitle">"Drag to pan. Scroll to zoom."</p>
				<p class="status">{move || status.get()}</p>
			</div>
		</div>
	}
}
