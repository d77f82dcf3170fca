//! Leptos component hosting a [`GraphView`] on an HTML canvas.
//!
//! The component renders a sized container with a canvas, opens the view once
//! both elements exist and pushes every change of the `data` signal through
//! [`GraphView::update`]. Mouse and wheel events are forwarded to the engine.
//! A zero-delay resize after mount and a window `resize` listener keep the
//! canvas matched to its container; both go through a weak resizer and become
//! no-ops once the view is closed.

use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent};

use super::engine::GraphEngine;
use super::error::GraphError;
use super::options::GraphOptions;
use super::paint;
use super::registry::ShapeRegistry;
use super::types::GraphDescription;
use super::view::{GraphHandlers, GraphView, Surface};

/// Browser [`Surface`]: a canvas sized to its container.
pub struct CanvasSurface {
	container: HtmlElement,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	pixel_ratio: f64,
}

impl CanvasSurface {
	/// `pixel_ratio` of `None` uses the window's device pixel ratio.
	pub fn new(
		container: HtmlElement,
		canvas: HtmlCanvasElement,
		pixel_ratio: Option<f64>,
	) -> Result<Self, GraphError> {
		let ctx = canvas
			.get_context("2d")
			.map_err(|e| GraphError::Surface(format!("{e:?}")))?
			.ok_or_else(|| GraphError::Surface("2d context unavailable".into()))?
			.dyn_into::<CanvasRenderingContext2d>()
			.map_err(|_| GraphError::Surface("unexpected context type".into()))?;
		let pixel_ratio = pixel_ratio
			.or_else(|| web_sys::window().map(|w| w.device_pixel_ratio()))
			.filter(|ratio| *ratio > 0.0)
			.unwrap_or(1.0);

		Ok(Self {
			container,
			canvas,
			ctx,
			pixel_ratio,
		})
	}
}

impl Surface for CanvasSurface {
	fn measure(&self) -> (f64, f64) {
		(
			self.container.offset_width() as f64,
			self.container.offset_height() as f64,
		)
	}

	fn set_size(&mut self, width: f64, height: f64) {
		let (backing_width, backing_height) = backing_size(width, height, self.pixel_ratio);
		self.canvas.set_width(backing_width);
		self.canvas.set_height(backing_height);
		let style = HtmlElement::style(&self.canvas);
		let _ = style.set_property("width", &format!("{width}px"));
		let _ = style.set_property("height", &format!("{height}px"));
	}

	fn present(&mut self, engine: &GraphEngine) {
		paint::paint(engine, &self.ctx, self.pixel_ratio);
	}
}

/// Backing-store size in device pixels for a canvas of `width` x `height` CSS
/// pixels.
fn backing_size(width: f64, height: f64, pixel_ratio: f64) -> (u32, u32) {
	(
		(width * pixel_ratio).round().max(0.0) as u32,
		(height * pixel_ratio).round().max(0.0) as u32,
	)
}

/// A window event listener removed on drop.
struct WindowListener {
	event: &'static str,
	callback: Closure<dyn FnMut()>,
}

impl WindowListener {
	fn add(event: &'static str, f: impl FnMut() + 'static) -> Option<Self> {
		let window = web_sys::window()?;
		let callback = Closure::<dyn FnMut()>::new(f);
		window
			.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
			.ok()?;
		Some(Self { event, callback })
	}
}

impl Drop for WindowListener {
	fn drop(&mut self) {
		if let Some(window) = web_sys::window() {
			let _ = window
				.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
		}
	}
}

/// Runs `f` once from a zero-delay timeout, after the current layout pass.
fn defer(f: impl FnOnce() + 'static) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let callback: js_sys::Function = Closure::<dyn FnOnce()>::once_into_js(f).unchecked_into();
	let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&callback, 0);
}

/// Renders a graph description on a canvas.
///
/// `data` is expected to be laid out already (nodes carry positions). The
/// container takes `width`/`height` as CSS lengths and the canvas follows its
/// measured size. Open and update failures are logged and passed to
/// `on_error`; a failed update keeps the view mounted.
#[component]
pub fn Graph(
	#[prop(into)] data: Signal<GraphDescription>,
	registry: Rc<ShapeRegistry>,
	#[prop(optional)] options: GraphOptions,
	#[prop(optional)] handlers: GraphHandlers,
	#[prop(into, default = "100%".to_string())] width: String,
	#[prop(into, default = "100%".to_string())] height: String,
	#[prop(into, optional)] on_error: Option<Callback<GraphError>>,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let mounted = StoredValue::new_local(None::<GraphView<CanvasSurface>>);
	let resize_listener = StoredValue::new_local(None::<WindowListener>);

	let report = move |err: GraphError| {
		error!("graph view: {err}");
		if let Some(cb) = on_error {
			cb.run(err);
		}
	};

	Effect::new(move |_| {
		let graph = data.get();
		let (Some(container), Some(canvas)) = (container_ref.get(), canvas_ref.get()) else {
			return;
		};

		let updated = mounted.with_value(|view| view.as_ref().map(|view| view.update(graph.clone())));
		match updated {
			Some(Ok(_)) => return,
			Some(Err(err)) => return report(err),
			None => {}
		}

		let opened = CanvasSurface::new(container.into(), canvas, options.pixel_ratio).and_then(
			|surface| {
				GraphView::open(
					surface,
					registry.clone(),
					options.clone(),
					graph,
					handlers.clone(),
				)
			},
		);
		match opened {
			Ok(view) => {
				defer(view.resizer());
				resize_listener.set_value(WindowListener::add("resize", view.resizer()));
				mounted.set_value(Some(view));
			}
			Err(err) => report(err),
		}
	});

	on_cleanup(move || {
		resize_listener.try_update_value(|listener| listener.take());
		mounted.try_update_value(|view| {
			if let Some(view) = view.take() {
				view.close();
			}
		});
	});

	let local_position = move |ev: &MouseEvent| {
		let canvas = canvas_ref.get_untracked()?;
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};
	let with_view = move |f: &dyn Fn(&GraphView<CanvasSurface>)| {
		mounted.with_value(|view| {
			if let Some(view) = view {
				f(view);
			}
		});
	};

	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local_position(&ev) {
			with_view(&|view| view.pointer_down(x, y));
		}
	};
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local_position(&ev) {
			with_view(&|view| view.pointer_move(x, y));
		}
	};
	let on_mouseup = move |_: MouseEvent| with_view(&|view| view.pointer_up());
	let on_mouseleave = move |_: MouseEvent| with_view(&|view| view.pointer_up());
	let on_click = move |ev: MouseEvent| {
		if let Some((x, y)) = local_position(&ev) {
			with_view(&|view| view.click(x, y));
		}
	};
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = ev.as_ref();
		if let Some((x, y)) = local_position(mouse) {
			let delta = ev.delta_y();
			with_view(&|view| view.wheel(x, y, delta));
		}
	};

	view! {
		<div
			node_ref=container_ref
			class="graph-view"
			style=format!("width: {width}; height: {height}; overflow: hidden;")
		>
			<canvas
				node_ref=canvas_ref
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:click=on_click
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn backing_store_scales_with_pixel_ratio() {
		assert_eq!(backing_size(1200.0, 600.0, 1.0), (1200, 600));
		assert_eq!(backing_size(300.0, 150.0, 2.0), (600, 300));
		assert_eq!(backing_size(100.5, 33.3, 1.5), (151, 50));
	}
}
