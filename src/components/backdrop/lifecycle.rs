//! Backdrop lifecycle: mount, frame, resize and ordered teardown.
//!
//! Everything here runs against the [`Host`] and [`GraphicsBackend`] seams, so
//! the whole state machine is exercised natively in tests.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use super::config::BackdropConfig;
use super::gpu::GraphicsBackend;
use super::renderer::Renderer;
use super::scene::Scene;
use super::viewport::{Camera, Viewport};

const LOG_TARGET: &str = "backdrop";

/// Where a backdrop is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	/// No surface attached. Also where a missing target or a reduced-motion
	/// preference leaves it.
	Unmounted,
	/// Surface, resources and scene exist; no frame drawn yet.
	Initialized,
	/// At least one frame drawn.
	Animating,
	/// Everything released. Terminal.
	TornDown,
}

/// Shared flag that stops a frame loop.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Rc<Cell<bool>>);

impl CancelHandle {
	/// A fresh, uncancelled handle.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stops every holder of this handle.
	pub fn cancel(&self) {
		self.0.set(true);
	}

	/// Whether [`CancelHandle::cancel`] was called.
	pub fn is_cancelled(&self) -> bool {
		self.0.get()
	}
}

/// The page-side mount target of a backdrop.
pub trait Host {
	/// Graphics backend bound to the attached surface.
	type Backend: GraphicsBackend;
	/// Guard for a host event listener; dropping it removes the listener.
	type Listener;

	/// Layout size of the target in CSS pixels.
	fn target_size(&self) -> (f64, f64);
	/// Device pixels per CSS pixel.
	fn pixel_ratio(&self) -> f64;
	/// Whether the user asked for reduced motion.
	fn prefers_reduced_motion(&self) -> bool;
	/// Appends the rendering surface to the target and opens a backend on it.
	fn attach_surface(&mut self) -> Result<Self::Backend>;
	/// Removes the rendering surface from the target.
	fn detach_surface(&mut self);
}

/// One animated backdrop: scene, camera, renderer and the host it is
/// attached to.
///
/// Teardown runs in a fixed order: cancel the frame loop, drop listeners,
/// detach the surface, release graphics resources, then the context. It runs
/// from [`Backdrop::teardown`] or, failing that, from `Drop`.
pub struct Backdrop<H: Host> {
	label: String,
	config: BackdropConfig,
	phase: Phase,
	cancel: CancelHandle,
	host: Option<H>,
	listeners: Vec<H::Listener>,
	viewport: Viewport,
	camera: Option<Camera>,
	scene: Option<Scene>,
	renderer: Option<Renderer<H::Backend>>,
}

impl<H: Host> Backdrop<H> {
	/// An unmounted backdrop. `label` tags every log line it emits.
	pub fn new(label: impl Into<String>, config: BackdropConfig) -> Self {
		Self {
			label: label.into(),
			config,
			phase: Phase::Unmounted,
			cancel: CancelHandle::new(),
			host: None,
			listeners: Vec::new(),
			viewport: Viewport::new(0.0, 0.0, 1.0),
			camera: None,
			scene: None,
			renderer: None,
		}
	}

	/// Attaches to `host` and builds the scene.
	///
	/// A missing host, or a reduced-motion preference the config honors,
	/// leaves the backdrop `Unmounted` without error. Mounting twice is
	/// ignored.
	pub fn mount(&mut self, host: Option<H>) -> Result<Phase> {
		if self.phase != Phase::Unmounted {
			warn!(target: LOG_TARGET, "[{}] mount ignored in phase {:?}", self.label, self.phase);
			return Ok(self.phase);
		}
		let Some(mut host) = host else {
			debug!(target: LOG_TARGET, "[{}] no mount target", self.label);
			return Ok(self.phase);
		};
		self.config
			.validate()
			.with_context(|| format!("invalid config for backdrop {}", self.label))?;
		if self.config.respect_reduced_motion && host.prefers_reduced_motion() {
			info!(
				target: LOG_TARGET,
				"[{}] reduced motion preferred, skipping animation", self.label
			);
			return Ok(self.phase);
		}

		let (width, height) = host.target_size();
		let viewport = Viewport::new(width, height, host.pixel_ratio());
		if viewport.is_degenerate() {
			debug!(
				target: LOG_TARGET,
				"[{}] mount target has no area ({width}x{height})", self.label
			);
		}

		let backend = host.attach_surface()?;
		let renderer = match Renderer::new(backend, self.config.blend, &viewport) {
			Ok(renderer) => renderer,
			Err(err) => {
				host.detach_surface();
				return Err(err);
			}
		};
		let scene = Scene::new(&self.config);
		info!(
			target: LOG_TARGET,
			"[{}] created {} primitives, {} connections, {}x{} @{}x",
			self.label,
			scene.primitives().len(),
			scene.connections().len(),
			width,
			height,
			viewport.pixel_ratio
		);

		self.camera = Some(Camera::new(&self.config.camera, &viewport));
		self.viewport = viewport;
		self.scene = Some(scene);
		self.renderer = Some(renderer);
		self.host = Some(host);
		self.phase = Phase::Initialized;
		Ok(self.phase)
	}

	/// Keeps a host listener alive until teardown.
	pub fn add_listener(&mut self, listener: H::Listener) {
		if self.is_live() {
			self.listeners.push(listener);
		}
	}

	/// Draws the frame for `elapsed` seconds. Returns whether the loop
	/// should keep going.
	pub fn frame(&mut self, elapsed: f64) -> bool {
		if self.cancel.is_cancelled() || !self.is_live() {
			return false;
		}
		let (Some(scene), Some(camera), Some(renderer)) =
			(self.scene.as_mut(), self.camera.as_mut(), self.renderer.as_mut())
		else {
			return false;
		};
		let t = elapsed as f32;
		scene.advance(t);
		camera.follow(&self.config.camera, t);
		renderer.draw(scene, camera);
		if self.phase == Phase::Initialized {
			debug!(target: LOG_TARGET, "[{}] animation loop started", self.label);
			self.phase = Phase::Animating;
		}
		true
	}

	/// Re-reads the target size. Returns the new aspect ratio.
	pub fn resize(&mut self) -> Option<f64> {
		if !self.is_live() {
			return None;
		}
		let host = self.host.as_ref()?;
		let (width, height) = host.target_size();
		self.viewport = Viewport::new(width, height, host.pixel_ratio());
		if let Some(renderer) = self.renderer.as_mut() {
			renderer.resize(&self.viewport);
		}
		let aspect = self.camera.as_mut()?.resize(&self.viewport);
		debug!(target: LOG_TARGET, "[{}] resized to {width}x{height}", self.label);
		Some(aspect)
	}

	/// Pointer position in `[-1, 1]`, for parallax.
	pub fn point_at(&mut self, x: f32, y: f32) {
		if let Some(scene) = self.scene.as_mut() {
			scene.point_at(x, y);
		}
	}

	/// Releases everything. Safe to call more than once; only the first call
	/// does work.
	pub fn teardown(&mut self) {
		if self.phase == Phase::TornDown {
			return;
		}
		self.cancel.cancel();
		let listeners = self.listeners.len();
		self.listeners.clear();
		if let Some(mut host) = self.host.take() {
			host.detach_surface();
		}
		let freed = self.renderer.take().map_or(0, |mut r| r.release());
		self.scene = None;
		self.camera = None;
		if self.phase != Phase::Unmounted {
			info!(
				target: LOG_TARGET,
				"[{}] torn down: {listeners} listeners removed, {freed} resources released",
				self.label
			);
		}
		self.phase = Phase::TornDown;
	}

	/// Current phase.
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Handle the frame loop checks before every frame.
	pub fn cancel_handle(&self) -> CancelHandle {
		self.cancel.clone()
	}

	/// Log label.
	pub fn label(&self) -> &str {
		&self.label
	}

	/// The configuration this backdrop was created with.
	pub fn config(&self) -> &BackdropConfig {
		&self.config
	}

	/// The scene, while mounted.
	pub fn scene(&self) -> Option<&Scene> {
		self.scene.as_ref()
	}

	/// The camera, while mounted.
	pub fn camera(&self) -> Option<&Camera> {
		self.camera.as_ref()
	}

	/// Graphics handles still held.
	pub fn live_resources(&self) -> usize {
		self.renderer.as_ref().map_or(0, Renderer::live_resources)
	}

	fn is_live(&self) -> bool {
		matches!(self.phase, Phase::Initialized | Phase::Animating)
	}
}

impl<H: Host> Drop for Backdrop<H> {
	fn drop(&mut self) {
		if self.is_live() {
			self.teardown();
		}
	}
}
