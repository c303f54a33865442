//! Browser side of the backdrop: the container host, window listeners and the
//! `requestAnimationFrame` loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlCanvasElement, HtmlElement, Window};

use super::lifecycle::{CancelHandle, Host};
use super::webgl::WebGlBackend;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// A container element in the page that a backdrop draws into.
pub struct DomHost {
	window: Window,
	container: HtmlElement,
	canvas: Option<HtmlCanvasElement>,
}

impl DomHost {
	/// Wraps `container`. `None` outside a browser window.
	pub fn new(container: HtmlElement) -> Option<Self> {
		Some(Self {
			window: web_sys::window()?,
			container,
			canvas: None,
		})
	}
}

impl Host for DomHost {
	type Backend = WebGlBackend;
	type Listener = WindowListener;

	fn target_size(&self) -> (f64, f64) {
		(
			self.container.client_width() as f64,
			self.container.client_height() as f64,
		)
	}

	fn pixel_ratio(&self) -> f64 {
		self.window.device_pixel_ratio()
	}

	fn prefers_reduced_motion(&self) -> bool {
		self.window
			.match_media(REDUCED_MOTION_QUERY)
			.ok()
			.flatten()
			.is_some_and(|query| query.matches())
	}

	fn attach_surface(&mut self) -> Result<WebGlBackend> {
		let document = self.window.document().context("no document")?;
		let canvas: HtmlCanvasElement = document
			.create_element("canvas")
			.map_err(|e| anyhow!("{e:?}"))?
			.dyn_into()
			.map_err(|_| anyhow!("created element is not a canvas"))?;
		let style = canvas.style();
		for (name, value) in [("display", "block"), ("width", "100%"), ("height", "100%")] {
			style
				.set_property(name, value)
				.map_err(|e| anyhow!("{e:?}"))?;
		}
		self.container
			.append_child(&canvas)
			.map_err(|e| anyhow!("{e:?}"))?;
		self.canvas = Some(canvas.clone());

		match WebGlBackend::new(&canvas) {
			Ok(backend) => Ok(backend),
			Err(err) => {
				self.detach_surface();
				Err(err)
			}
		}
	}

	fn detach_surface(&mut self) {
		let Some(canvas) = self.canvas.take() else {
			return;
		};
		if self.container.contains(Some(&canvas)) {
			if let Err(err) = self.container.remove_child(&canvas) {
				log::warn!(target: "backdrop", "failed to detach canvas: {err:?}");
			}
		}
	}
}

/// An event listener on the window, removed when dropped.
pub struct WindowListener {
	window: Window,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl WindowListener {
	/// Registers `handler` for `event` on `window`.
	pub fn new(
		window: &Window,
		event: &'static str,
		handler: impl FnMut(Event) + 'static,
	) -> Result<Self> {
		let callback = Closure::<dyn FnMut(Event)>::new(handler);
		window
			.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
			.map_err(|e| anyhow!("adding {event} listener: {e:?}"))?;
		Ok(Self {
			window: window.clone(),
			event,
			callback,
		})
	}
}

impl Drop for WindowListener {
	fn drop(&mut self) {
		let callback = self.callback.as_ref().unchecked_ref();
		let _ = self
			.window
			.remove_event_listener_with_callback(self.event, callback);
	}
}

/// Self-rescheduling `requestAnimationFrame` loop.
///
/// `tick` receives seconds since the first frame and returns whether to keep
/// going. The loop also stops once its [`CancelHandle`] is cancelled.
pub struct FrameLoop {
	window: Window,
	cancel: CancelHandle,
	pending: Rc<Cell<Option<i32>>>,
	callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl FrameLoop {
	/// Schedules the first frame.
	pub fn start(
		window: &Window,
		cancel: CancelHandle,
		mut tick: impl FnMut(f64) -> bool + 'static,
	) -> Result<Self> {
		let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
		let pending = Rc::new(Cell::new(None));
		let callback_inner = callback.clone();
		let pending_inner = pending.clone();
		let cancel_inner = cancel.clone();
		let mut started: Option<f64> = None;

		let frame = Closure::<dyn FnMut(f64)>::new(move |now: f64| {
			pending_inner.set(None);
			if cancel_inner.is_cancelled() {
				return;
			}
			let start = *started.get_or_insert(now);
			if !tick((now - start) / 1000.0) || cancel_inner.is_cancelled() {
				return;
			}
			let Some(window) = web_sys::window() else {
				return;
			};
			if let Some(ref cb) = *callback_inner.borrow() {
				match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
					Ok(id) => pending_inner.set(Some(id)),
					Err(err) => {
						log::warn!(target: "backdrop", "requestAnimationFrame failed: {err:?}")
					}
				}
			}
		});

		let first = window
			.request_animation_frame(frame.as_ref().unchecked_ref())
			.map_err(|e| anyhow!("requestAnimationFrame failed: {e:?}"))?;
		pending.set(Some(first));
		*callback.borrow_mut() = Some(frame);

		Ok(Self {
			window: window.clone(),
			cancel,
			pending,
			callback,
		})
	}

	/// Cancels the pending frame and frees the callback.
	pub fn stop(&self) {
		self.cancel.cancel();
		if let Some(id) = self.pending.take() {
			let _ = self.window.cancel_animation_frame(id);
		}
		self.callback.borrow_mut().take();
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		self.stop();
	}
}
