//! Leptos component that mounts a backdrop into its container.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, MouseEvent, Window};

use super::config::BackdropConfig;
use super::dom::{DomHost, FrameLoop, WindowListener};
use super::lifecycle::{Backdrop, Phase};

/// Fills the nearest positioned ancestor, below its content and inert to input.
const CONTAINER_STYLE: &str =
	"position: absolute; inset: 0; z-index: 0; pointer-events: none; overflow: hidden;";

/// Decorative animated 3D background filling its positioned parent.
///
/// Mounts once the container is in the document and tears everything down
/// when the owner is cleaned up.
#[component]
pub fn BackdropCanvas(
	#[prop(into)] config: BackdropConfig,
	#[prop(default = "backdrop")] label: &'static str,
	#[prop(default = "backdrop")] class: &'static str,
) -> impl IntoView {
	let mount_ref = NodeRef::<leptos::html::Div>::new();

	Effect::new(move |_| {
		let Some(container) = mount_ref.get() else {
			log::debug!(target: "backdrop", "[{label}] container not rendered yet");
			return;
		};
		let container: HtmlElement = container.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let backdrop = Rc::new(RefCell::new(Backdrop::new(label, config.clone())));
		let mounted = backdrop.borrow_mut().mount(DomHost::new(container));
		match mounted {
			Ok(Phase::Initialized) => {}
			Ok(_) => return,
			Err(err) => {
				log::error!(target: "backdrop", "[{label}] failed to start: {err:#}");
				return;
			}
		}

		let backdrop_resize = backdrop.clone();
		match WindowListener::new(&window, "resize", move |_| {
			backdrop_resize.borrow_mut().resize();
		}) {
			Ok(listener) => backdrop.borrow_mut().add_listener(listener),
			Err(err) => log::warn!(target: "backdrop", "[{label}] {err:#}"),
		}

		if config.parallax > 0.0 {
			let backdrop_pointer = backdrop.clone();
			let window_pointer = window.clone();
			match WindowListener::new(&window, "mousemove", move |ev| {
				let Some(ev) = ev.dyn_ref::<MouseEvent>() else {
					return;
				};
				let (w, h) = inner_size(&window_pointer);
				if w <= 0.0 || h <= 0.0 {
					return;
				}
				let nx = (ev.client_x() as f64 / w - 0.5) * 2.0;
				let ny = -(ev.client_y() as f64 / h - 0.5) * 2.0;
				backdrop_pointer.borrow_mut().point_at(nx as f32, ny as f32);
			}) {
				Ok(listener) => backdrop.borrow_mut().add_listener(listener),
				Err(err) => log::warn!(target: "backdrop", "[{label}] {err:#}"),
			}
		}

		let cancel = backdrop.borrow().cancel_handle();
		let backdrop_frame = backdrop.clone();
		let frame_loop = match FrameLoop::start(&window, cancel, move |elapsed| {
			backdrop_frame.borrow_mut().frame(elapsed)
		}) {
			Ok(frame_loop) => Some(frame_loop),
			Err(err) => {
				log::error!(target: "backdrop", "[{label}] {err:#}");
				backdrop.borrow_mut().teardown();
				None
			}
		};

		let owned = SendWrapper::new((backdrop, frame_loop));
		on_cleanup(move || {
			let (backdrop, frame_loop) = owned.take();
			backdrop.borrow_mut().teardown();
			drop(frame_loop);
		});
	});

	view! {
		<div
			node_ref=mount_ref
			class=class
			aria-hidden="true"
			style=CONTAINER_STYLE
		/>
	}
}

fn inner_size(window: &Window) -> (f64, f64) {
	let read = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
	(read(window.inner_width()), read(window.inner_height()))
}
