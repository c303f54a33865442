//! Graphics backend seam and the resource group that owns every handle a
//! backdrop allocates.

use anyhow::Result;
use glam::Mat4;

use super::config::BlendMode;

/// Shader programs a backdrop needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgramKind {
	/// Round, depth-attenuated point sprites.
	Sprites,
	/// Flat colored line segments and triangles.
	Lines,
}

/// Primitive topology of a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
	/// One vertex per point.
	Points,
	/// Two vertices per segment.
	Lines,
	/// Three vertices per filled triangle.
	Triangles,
}

/// Floats per vertex: position (3), rgba (4), point size (1).
pub const FLOATS_PER_VERTEX: usize = 8;

/// CSS pixels covered by a sprite of size 1 at clip depth 1. A sprite's
/// on-screen size is `size * POINT_DEPTH_SCALE / depth`, times the device
/// pixel ratio.
pub const POINT_DEPTH_SCALE: f32 = 300.0;

/// What a backdrop needs from the graphics API.
///
/// Buffers and programs must be handed back through `delete_*`; the API does
/// not reclaim them on its own.
pub trait GraphicsBackend {
	/// Vertex buffer handle.
	type Buffer;
	/// Linked program handle.
	type Program;

	/// Compiles and links a program.
	fn create_program(&mut self, kind: ProgramKind) -> Result<Self::Program>;
	/// Allocates an empty vertex buffer.
	fn create_buffer(&mut self) -> Result<Self::Buffer>;
	/// Replaces the buffer contents with `vertices`.
	fn upload(&mut self, buffer: &Self::Buffer, vertices: &[f32]);
	/// Resizes the drawing buffer, in device pixels.
	fn resize(&mut self, width: u32, height: u32);
	/// Clears the surface and sets blending for the frame.
	fn begin_frame(&mut self, blend: BlendMode);
	/// Draws `vertex_count` vertices from `buffer`.
	fn draw(
		&mut self,
		program: &Self::Program,
		buffer: &Self::Buffer,
		topology: Topology,
		vertex_count: usize,
		mvp: &Mat4,
		point_scale: f32,
	);
	/// Frees a buffer.
	fn delete_buffer(&mut self, buffer: Self::Buffer);
	/// Frees a program.
	fn delete_program(&mut self, program: Self::Program);
	/// Releases the context itself. Nothing may be called afterwards.
	fn release(&mut self);
}

/// Handle to a buffer owned by a [`ResourceGroup`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(usize);

/// Handle to a program owned by a [`ResourceGroup`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(usize);

/// Every buffer and program a backdrop created, released as a unit.
pub struct ResourceGroup<B: GraphicsBackend> {
	buffers: Vec<Option<B::Buffer>>,
	programs: Vec<Option<B::Program>>,
}

impl<B: GraphicsBackend> Default for ResourceGroup<B> {
	fn default() -> Self {
		Self {
			buffers: Vec::new(),
			programs: Vec::new(),
		}
	}
}

impl<B: GraphicsBackend> ResourceGroup<B> {
	/// An empty group.
	pub fn new() -> Self {
		Self::default()
	}

	/// Allocates a buffer and records it.
	pub fn create_buffer(&mut self, backend: &mut B) -> Result<BufferId> {
		let buffer = backend.create_buffer()?;
		self.buffers.push(Some(buffer));
		Ok(BufferId(self.buffers.len() - 1))
	}

	/// Builds a program and records it.
	pub fn create_program(&mut self, backend: &mut B, kind: ProgramKind) -> Result<ProgramId> {
		let program = backend.create_program(kind)?;
		self.programs.push(Some(program));
		Ok(ProgramId(self.programs.len() - 1))
	}

	/// Looks up a live buffer.
	pub fn buffer(&self, id: BufferId) -> Option<&B::Buffer> {
		self.buffers.get(id.0).and_then(Option::as_ref)
	}

	/// Looks up a live program.
	pub fn program(&self, id: ProgramId) -> Option<&B::Program> {
		self.programs.get(id.0).and_then(Option::as_ref)
	}

	/// Number of handles not yet released.
	pub fn live(&self) -> usize {
		self.buffers.iter().flatten().count() + self.programs.iter().flatten().count()
	}

	/// Hands every live handle back to the backend, each exactly once.
	/// Returns how many were released.
	pub fn release(&mut self, backend: &mut B) -> usize {
		let mut released = 0;
		for buffer in self.buffers.iter_mut().filter_map(Option::take) {
			backend.delete_buffer(buffer);
			released += 1;
		}
		for program in self.programs.iter_mut().filter_map(Option::take) {
			backend.delete_program(program);
			released += 1;
		}
		released
	}
}
