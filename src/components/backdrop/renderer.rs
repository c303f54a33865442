//! Draws a [`Scene`] through a [`GraphicsBackend`] and owns what it allocated.

use anyhow::{Context, Result};

use super::config::BlendMode;
use super::geometry::{FrameGeometry, vertex_count};
use super::gpu::{
	BufferId, GraphicsBackend, POINT_DEPTH_SCALE, ProgramId, ProgramKind, ResourceGroup, Topology,
};
use super::scene::Scene;
use super::viewport::{Camera, Viewport};

struct Handles {
	sprites: ProgramId,
	lines: ProgramId,
	points: BufferId,
	wires: BufferId,
	solids: BufferId,
	links: BufferId,
}

/// Owns the backend and every resource drawn with it.
///
/// Released explicitly through [`Renderer::release`]; dropping an unreleased
/// renderer releases it as well.
pub struct Renderer<B: GraphicsBackend> {
	backend: B,
	resources: ResourceGroup<B>,
	handles: Handles,
	geometry: FrameGeometry,
	links_version: Option<u64>,
	blend: BlendMode,
	pixel_ratio: f32,
	visible: bool,
	released: bool,
}

impl<B: GraphicsBackend> Renderer<B> {
	/// Allocates programs and buffers. On failure everything allocated so far
	/// is released before the error is returned.
	pub fn new(mut backend: B, blend: BlendMode, viewport: &Viewport) -> Result<Self> {
		let mut resources = ResourceGroup::new();
		let handles = match allocate(&mut backend, &mut resources) {
			Ok(handles) => handles,
			Err(err) => {
				resources.release(&mut backend);
				backend.release();
				return Err(err);
			}
		};
		let mut renderer = Self {
			backend,
			resources,
			handles,
			geometry: FrameGeometry::default(),
			links_version: None,
			blend,
			pixel_ratio: 1.0,
			visible: false,
			released: false,
		};
		renderer.resize(viewport);
		Ok(renderer)
	}

	/// Follows the viewport's device-pixel size.
	pub fn resize(&mut self, viewport: &Viewport) {
		if self.released {
			return;
		}
		let (width, height) = viewport.backing_size();
		self.backend.resize(width, height);
		self.pixel_ratio = viewport.pixel_ratio as f32;
		self.visible = !viewport.is_degenerate();
	}

	/// Submits the scene. A degenerate viewport draws nothing.
	pub fn draw(&mut self, scene: &Scene, camera: &Camera) {
		if self.released || !self.visible {
			return;
		}
		self.geometry.rebuild_primitives(scene);
		if self.links_version != Some(scene.connections_version()) {
			self.geometry.rebuild_links(scene);
			if let Some(buffer) = self.resources.buffer(self.handles.links) {
				self.backend.upload(buffer, &self.geometry.links);
			}
			self.links_version = Some(scene.connections_version());
		}

		let mvp = camera.view_projection() * scene.model_matrix();
		self.backend.begin_frame(self.blend);
		// links keep the buffer uploaded at the last recompute
		let passes: [(BufferId, ProgramId, Topology, &[f32], bool); 4] = [
			(
				self.handles.links,
				self.handles.lines,
				Topology::Lines,
				self.geometry.links.as_slice(),
				false,
			),
			(
				self.handles.solids,
				self.handles.lines,
				Topology::Triangles,
				self.geometry.solids.as_slice(),
				true,
			),
			(
				self.handles.wires,
				self.handles.lines,
				Topology::Lines,
				self.geometry.wires.as_slice(),
				true,
			),
			(
				self.handles.points,
				self.handles.sprites,
				Topology::Points,
				self.geometry.points.as_slice(),
				true,
			),
		];
		let point_scale = self.pixel_ratio * POINT_DEPTH_SCALE;
		for (buffer_id, program_id, topology, stream, upload) in passes {
			let vertices = vertex_count(stream);
			if vertices == 0 {
				continue;
			}
			let (Some(buffer), Some(program)) = (
				self.resources.buffer(buffer_id),
				self.resources.program(program_id),
			) else {
				continue;
			};
			if upload {
				self.backend.upload(buffer, stream);
			}
			self.backend
				.draw(program, buffer, topology, vertices, &mvp, point_scale);
		}
	}

	/// Handles not yet released.
	pub fn live_resources(&self) -> usize {
		self.resources.live()
	}

	/// Whether [`Renderer::release`] already ran.
	pub fn is_released(&self) -> bool {
		self.released
	}

	/// Frees every buffer and program, then the context. Later calls are
	/// no-ops. Returns the number of handles freed.
	pub fn release(&mut self) -> usize {
		if self.released {
			return 0;
		}
		self.released = true;
		let freed = self.resources.release(&mut self.backend);
		self.backend.release();
		freed
	}
}

impl<B: GraphicsBackend> Drop for Renderer<B> {
	fn drop(&mut self) {
		self.release();
	}
}

fn allocate<B: GraphicsBackend>(
	backend: &mut B,
	resources: &mut ResourceGroup<B>,
) -> Result<Handles> {
	Ok(Handles {
		sprites: resources
			.create_program(backend, ProgramKind::Sprites)
			.context("building sprite program")?,
		lines: resources
			.create_program(backend, ProgramKind::Lines)
			.context("building line program")?,
		points: resources.create_buffer(backend).context("allocating point buffer")?,
		wires: resources.create_buffer(backend).context("allocating wire buffer")?,
		solids: resources.create_buffer(backend).context("allocating solid buffer")?,
		links: resources.create_buffer(backend).context("allocating link buffer")?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::backdrop::config::BackdropConfig;
	use crate::components::backdrop::testing::{Ledger, RecordingBackend};

	#[test]
	fn draws_each_non_empty_pass() {
		let ledger = Ledger::shared();
		let config = BackdropConfig::floating_geometry().with_seed(1);
		let viewport = Viewport::new(640.0, 480.0, 1.0);
		let mut renderer =
			Renderer::new(RecordingBackend::new(ledger.clone()), config.blend, &viewport).unwrap();
		let mut scene = Scene::new(&config);
		let camera = Camera::new(&config.camera, &viewport);
		scene.advance(0.5);
		renderer.draw(&scene, &camera);

		let ledger = ledger.borrow();
		assert_eq!(ledger.frames, 1);
		assert_eq!(ledger.backing, (640, 480));
		assert!(ledger.draws.iter().all(|(_, n)| *n > 0));
		assert!(ledger.draws.iter().any(|(t, _)| *t == Topology::Lines));
		assert!(ledger.draws.iter().any(|(t, _)| *t == Topology::Triangles));
		assert!(!ledger.draws.iter().any(|(t, _)| *t == Topology::Points));
	}

	#[test]
	fn point_scale_follows_pixel_ratio() {
		let ledger = Ledger::shared();
		let config = BackdropConfig::network().with_seed(3);
		let viewport = Viewport::new(400.0, 300.0, 2.0);
		let mut renderer =
			Renderer::new(RecordingBackend::new(ledger.clone()), config.blend, &viewport).unwrap();
		let mut scene = Scene::new(&config);
		let camera = Camera::new(&config.camera, &viewport);
		scene.advance(0.1);
		renderer.draw(&scene, &camera);
		assert_eq!(ledger.borrow().point_scale, 2.0 * POINT_DEPTH_SCALE);
	}

	#[test]
	fn links_upload_only_when_recomputed() {
		let ledger = Ledger::shared();
		let config = BackdropConfig::network().with_seed(3);
		let viewport = Viewport::new(800.0, 600.0, 1.0);
		let mut renderer =
			Renderer::new(RecordingBackend::new(ledger.clone()), config.blend, &viewport).unwrap();
		let mut scene = Scene::new(&config);
		let camera = Camera::new(&config.camera, &viewport);
		for frame in 1..=10 {
			scene.advance(frame as f32 * 0.016);
			renderer.draw(&scene, &camera);
		}
		// one link upload, then one point upload per frame
		assert_eq!(ledger.borrow().uploads, 1 + 10);
	}

	#[test]
	fn zero_sized_target_draws_nothing() {
		let ledger = Ledger::shared();
		let config = BackdropConfig::hero().with_seed(2);
		let viewport = Viewport::new(0.0, 0.0, 1.0);
		let mut renderer =
			Renderer::new(RecordingBackend::new(ledger.clone()), config.blend, &viewport).unwrap();
		let mut scene = Scene::new(&config);
		let camera = Camera::new(&config.camera, &viewport);
		scene.advance(1.0);
		renderer.draw(&scene, &camera);

		assert_eq!(renderer.live_resources(), 6);
		let ledger = ledger.borrow();
		assert_eq!(ledger.frames, 0);
		assert!(ledger.draws.is_empty());
	}

	#[test]
	fn release_is_idempotent_and_drop_safe() {
		let ledger = Ledger::shared();
		let viewport = Viewport::new(100.0, 100.0, 1.0);
		let backend = RecordingBackend::new(ledger.clone());
		let mut renderer = Renderer::new(backend, BlendMode::Alpha, &viewport).unwrap();
		assert_eq!(renderer.release(), 6);
		assert_eq!(renderer.release(), 0);
		drop(renderer);

		let ledger = ledger.borrow();
		assert!(ledger.live.is_empty());
		assert_eq!(ledger.double_frees, 0);
		assert_eq!(ledger.contexts_released, 1);
	}

	#[test]
	fn failed_setup_releases_partial_allocations() {
		let ledger = Ledger::shared();
		ledger.borrow_mut().fail_programs = true;
		let viewport = Viewport::new(100.0, 100.0, 1.0);
		let backend = RecordingBackend::new(ledger.clone());
		let result = Renderer::new(backend, BlendMode::Alpha, &viewport);
		assert!(result.is_err());
		let ledger = ledger.borrow();
		assert!(ledger.live.is_empty());
		assert_eq!(ledger.contexts_released, 1);
	}
}
