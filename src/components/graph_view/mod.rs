//! Canvas graph view with layered auto-layout and pluggable shapes.
//!
//! The pieces, bottom up:
//! - [`layout`]: assigns positions and edge geometry to a description
//! - [`ShapeRegistry`]: named node/edge drawing recipes
//! - [`GraphEngine`]: scene, hit-testing, pan/zoom and click events
//! - [`GraphView`]: open/update/close lifecycle over a [`Surface`]
//! - [`Graph`]: the Leptos component hosting a view on a canvas
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use graph_view::components::graph_view::*;
//!
//! let input = GraphDescription {
//!     nodes: vec![NodeSpec::new("a", "Node A"), NodeSpec::new("b", "Node B")],
//!     edges: vec![EdgeSpec::new("a", "b")],
//! };
//! let data = layout(&input, &LayoutConfig::default())?;
//! let registry = Rc::new(ShapeRegistry::with_builtins());
//!
//! view! { <Graph data=Signal::derive(move || data.clone()) registry=registry /> }
//! ```

mod component;
mod engine;
mod error;
pub mod layout;
mod options;
mod paint;
mod registry;
mod scene;
pub mod theme;
mod types;
mod view;

pub use component::{CanvasSurface, Graph};
pub use engine::{EventKind, GraphEngine, Item, ItemEvent, ItemKind, ItemModel, ViewTransform};
pub use error::{GraphError, LayoutError};
pub use layout::{Direction, LayoutConfig, layout};
pub use options::{DefaultEdge, DefaultNode, EdgeStyle, GraphOptions, LabelStyle, Mode};
pub use registry::{BaseShape, EdgeConfig, EdgeRecipe, NodeConfig, NodeRecipe, NodeShape, ShapeRegistry};
pub use scene::{
	Arrow, Bounds, Group, PathCommand, Segment, Shadow, Shape, ShapeAttrs, ShapeId, ShapeKind,
	path_end, resolve_path,
};
pub use theme::Color;
pub use types::{EdgeSpec, GraphDescription, NodeSpec, Point};
pub use view::{GraphHandlers, GraphView, ItemHandler, Surface};
