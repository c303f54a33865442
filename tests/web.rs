#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use crok_site::cms::CmsClient;
use crok_site::components::backdrop::dom::{DomHost, FrameLoop};
use crok_site::components::backdrop::{Backdrop, BackdropConfig, CancelHandle, Phase};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

// Nothing listens on the discard port, so every request fails.
const UNREACHABLE_CMS: &str = "http://127.0.0.1:9";

wasm_bindgen_test_configure!(run_in_browser);

fn container(width: u32, height: u32) -> HtmlElement {
	let document = web_sys::window().unwrap().document().unwrap();
	let div: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
	div.style()
		.set_property("width", &format!("{width}px"))
		.unwrap();
	div.style()
		.set_property("height", &format!("{height}px"))
		.unwrap();
	document.body().unwrap().append_child(&div).unwrap();
	div
}

async fn sleep(ms: i32) {
	let promise = js_sys::Promise::new(&mut |resolve, _| {
		web_sys::window()
			.unwrap()
			.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
			.unwrap();
	});
	JsFuture::from(promise).await.unwrap();
}

/// Waits up to two seconds for `ticks` to reach `at_least`.
async fn wait_for_ticks(ticks: &Cell<u32>, at_least: u32) {
	for _ in 0..100 {
		if ticks.get() >= at_least {
			return;
		}
		sleep(20).await;
	}
}

fn counting_loop(cancel: CancelHandle, limit: u32) -> (FrameLoop, Rc<Cell<u32>>) {
	let ticks = Rc::new(Cell::new(0));
	let counter = ticks.clone();
	let window = web_sys::window().unwrap();
	let frame_loop = FrameLoop::start(&window, cancel, move |_| {
		counter.set(counter.get() + 1);
		counter.get() < limit
	})
	.unwrap();
	(frame_loop, ticks)
}

#[wasm_bindgen_test]
async fn unreachable_cms_lists_no_articles() {
	let articles = CmsClient::new(UNREACHABLE_CMS).articles().await;
	assert!(articles.is_empty());
}

#[wasm_bindgen_test]
async fn unreachable_cms_finds_no_article() {
	let article = CmsClient::new(UNREACHABLE_CMS).article_by_slug("x").await;
	assert!(article.is_none());
}

#[wasm_bindgen_test]
async fn frame_loop_stops_when_tick_declines() {
	let (frame_loop, ticks) = counting_loop(CancelHandle::new(), 3);
	wait_for_ticks(&ticks, 3).await;
	sleep(100).await;
	assert_eq!(ticks.get(), 3);
	drop(frame_loop);
}

#[wasm_bindgen_test]
async fn stopped_frame_loop_never_ticks_again() {
	let (frame_loop, ticks) = counting_loop(CancelHandle::new(), u32::MAX);
	wait_for_ticks(&ticks, 2).await;
	assert!(ticks.get() >= 2);
	frame_loop.stop();
	let seen = ticks.get();
	sleep(150).await;
	assert_eq!(ticks.get(), seen);
}

#[wasm_bindgen_test]
async fn cancelled_before_first_frame_never_ticks() {
	let cancel = CancelHandle::new();
	let (frame_loop, ticks) = counting_loop(cancel.clone(), u32::MAX);
	cancel.cancel();
	sleep(150).await;
	assert_eq!(ticks.get(), 0);
	drop(frame_loop);
}

#[wasm_bindgen_test]
fn mounts_into_a_div_and_cleans_up() {
	let div = container(320, 200);
	let mut config = BackdropConfig::network().with_seed(4);
	config.respect_reduced_motion = false;
	let mut backdrop = Backdrop::new("web", config);
	let phase = backdrop.mount(DomHost::new(div.clone())).unwrap();
	assert_eq!(phase, Phase::Initialized);
	assert_eq!(div.child_element_count(), 1);
	assert_eq!(backdrop.camera().map(|c| c.aspect()), Some(320.0 / 200.0));

	assert!(backdrop.frame(0.0));
	assert!(backdrop.frame(0.5));
	backdrop.teardown();

	assert_eq!(backdrop.phase(), Phase::TornDown);
	assert_eq!(div.child_element_count(), 0);
	assert_eq!(backdrop.live_resources(), 0);
	div.remove();
}

#[wasm_bindgen_test]
fn zero_sized_container_still_tears_down() {
	let div = container(0, 0);
	let mut config = BackdropConfig::hero().with_seed(1);
	config.respect_reduced_motion = false;
	let mut backdrop = Backdrop::new("web-empty", config);
	backdrop.mount(DomHost::new(div.clone())).unwrap();
	backdrop.frame(0.1);
	backdrop.teardown();
	assert_eq!(div.child_element_count(), 0);
	div.remove();
}
