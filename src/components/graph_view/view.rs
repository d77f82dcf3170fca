//! Graph view lifecycle: open, update, resize, close.
//!
//! A [`GraphView`] owns one [`GraphEngine`] and the [`Surface`] it paints on.
//! It is the only thing that creates or destroys engines, so every engine is
//! released exactly once: on [`GraphView::close`] or when the view is dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, info, warn};

use super::engine::{EventKind, GraphEngine, ItemEvent};
use super::error::GraphError;
use super::options::GraphOptions;
use super::registry::ShapeRegistry;
use super::types::GraphDescription;

/// Size used when the surface reports a zero dimension (e.g. while hidden).
pub const FALLBACK_WIDTH: f64 = 1200.0;
pub const FALLBACK_HEIGHT: f64 = 600.0;

/// Something a graph can be painted on.
pub trait Surface {
	/// Current size of the host area in CSS pixels. Zero means unknown.
	fn measure(&self) -> (f64, f64);

	/// Resizes the drawing area.
	fn set_size(&mut self, width: f64, height: f64);

	/// Paints the engine's current scene.
	fn present(&mut self, engine: &GraphEngine);
}

/// Click handler: receives the engine and the event.
pub type ItemHandler = Rc<dyn Fn(&GraphEngine, &ItemEvent)>;

/// Optional user callbacks subscribed when a view opens.
#[derive(Clone, Default)]
pub struct GraphHandlers {
	pub on_node_click: Option<ItemHandler>,
	pub on_edge_click: Option<ItemHandler>,
}

struct Mounted<S> {
	surface: S,
	engine: GraphEngine,
}

impl<S: Surface> Mounted<S> {
	fn resize(&mut self) {
		let (width, height) = measure(&self.surface);
		self.surface.set_size(width, height);
		self.engine.change_size(width, height);
		self.engine.fit_view(self.engine.options().padding);
		self.surface.present(&self.engine);
	}
}

fn measure(surface: &impl Surface) -> (f64, f64) {
	let (width, height) = surface.measure();
	(
		if width > 0.0 { width } else { FALLBACK_WIDTH },
		if height > 0.0 { height } else { FALLBACK_HEIGHT },
	)
}

/// A mounted graph: an engine bound to a surface.
pub struct GraphView<S: Surface> {
	inner: Rc<RefCell<Option<Mounted<S>>>>,
}

impl<S: Surface + 'static> GraphView<S> {
	/// Sizes the surface, builds an engine, renders `data` and subscribes the
	/// handlers.
	pub fn open(
		mut surface: S,
		registry: Rc<ShapeRegistry>,
		options: GraphOptions,
		data: GraphDescription,
		handlers: GraphHandlers,
	) -> Result<Self, GraphError> {
		let (width, height) = measure(&surface);
		surface.set_size(width, height);

		let mut engine = GraphEngine::new(options, registry, width, height);
		engine.data(data);
		engine.render()?;

		if let Some(handler) = handlers.on_node_click {
			engine.on(EventKind::NodeClick, move |engine, event| handler(engine, event));
		}
		if let Some(handler) = handlers.on_edge_click {
			engine.on(EventKind::EdgeClick, move |engine, event| handler(engine, event));
		}

		surface.present(&engine);
		info!("graph view opened at {width}x{height}");

		Ok(Self {
			inner: Rc::new(RefCell::new(Some(Mounted { surface, engine }))),
		})
	}

	/// Replaces the content when it differs from what is loaded.
	///
	/// Returns `Ok(false)` for identical content or a closed view.
	pub fn update(&self, data: GraphDescription) -> Result<bool, GraphError> {
		let Ok(mut inner) = self.inner.try_borrow_mut() else {
			warn!("graph view busy, update skipped");
			return Ok(false);
		};
		let Some(mounted) = inner.as_mut() else {
			return Ok(false);
		};
		if mounted.engine.graph() == Some(&data) {
			return Ok(false);
		}

		let (width, height) = measure(&mounted.surface);
		mounted.surface.set_size(width, height);
		mounted.engine.change_size(width, height);
		mounted.engine.clear();
		mounted.engine.data(data);
		let rendered = mounted.engine.render();
		if rendered.is_ok() {
			mounted.engine.fit_view(mounted.engine.options().padding);
		}
		mounted.surface.present(&mounted.engine);
		rendered?;

		debug!("graph view updated");
		Ok(true)
	}

	/// Re-measures the surface and refits the content.
	pub fn resize(&self) {
		resize_inner(&self.inner);
	}

	/// A resize callback that does not keep the view alive and does nothing
	/// once it is closed.
	pub fn resizer(&self) -> impl Fn() + use<S> {
		let weak: Weak<RefCell<Option<Mounted<S>>>> = Rc::downgrade(&self.inner);
		move || {
			if let Some(inner) = weak.upgrade() {
				resize_inner(&inner);
			}
		}
	}

	/// Destroys the engine. Idempotent.
	pub fn close(&self) {
		let Ok(mut inner) = self.inner.try_borrow_mut() else {
			warn!("graph view busy, close skipped");
			return;
		};
		if let Some(mut mounted) = inner.take() {
			mounted.engine.destroy();
			info!("graph view closed");
		}
	}

	pub fn is_open(&self) -> bool {
		// A busy view is always mounted.
		self.inner.try_borrow().map_or(true, |inner| inner.is_some())
	}

	/// Runs `f` against the engine of an open view.
	pub fn with_engine<R>(&self, f: impl FnOnce(&GraphEngine) -> R) -> Option<R> {
		let inner = self.inner.try_borrow().ok()?;
		inner.as_ref().map(|mounted| f(&mounted.engine))
	}

	pub fn click(&self, x: f64, y: f64) {
		self.with_mounted(|m| m.engine.click(x, y));
	}

	pub fn pointer_down(&self, x: f64, y: f64) {
		self.with_mounted(|m| m.engine.pointer_down(x, y));
	}

	pub fn pointer_move(&self, x: f64, y: f64) {
		self.with_mounted(|m| {
			if m.engine.pointer_move(x, y) {
				m.surface.present(&m.engine);
			}
		});
	}

	pub fn pointer_up(&self) {
		self.with_mounted(|m| m.engine.pointer_up());
	}

	pub fn wheel(&self, x: f64, y: f64, delta_y: f64) {
		self.with_mounted(|m| {
			if m.engine.wheel(x, y, delta_y) {
				m.surface.present(&m.engine);
			}
		});
	}

	fn with_mounted(&self, f: impl FnOnce(&mut Mounted<S>)) {
		if let Ok(mut inner) = self.inner.try_borrow_mut() {
			if let Some(mounted) = inner.as_mut() {
				f(mounted);
			}
		}
	}
}

fn resize_inner<S: Surface>(inner: &RefCell<Option<Mounted<S>>>) {
	// Skipped while the view is busy (e.g. a handler is running).
	if let Ok(mut inner) = inner.try_borrow_mut() {
		if let Some(mounted) = inner.as_mut() {
			mounted.resize();
		}
	}
}

impl<S: Surface> Drop for GraphView<S> {
	fn drop(&mut self) {
		if let Ok(mut inner) = self.inner.try_borrow_mut() {
			if let Some(mut mounted) = inner.take() {
				mounted.engine.destroy();
			}
		}
	}
}
