//! In-memory backend and host that record every call.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use anyhow::{Result, bail};
use glam::Mat4;

use super::config::BlendMode;
use super::gpu::{GraphicsBackend, ProgramKind, Topology};
use super::lifecycle::Host;

#[derive(Debug, Default)]
pub struct Ledger {
	pub next_id: usize,
	pub created: usize,
	pub live: BTreeSet<usize>,
	pub double_frees: usize,
	pub contexts_released: usize,
	pub uploads: usize,
	pub draws: Vec<(Topology, usize)>,
	pub point_scale: f32,
	pub frames: usize,
	pub backing: (u32, u32),
	pub surfaces_attached: usize,
	pub events: Vec<&'static str>,
	pub fail_programs: bool,
}

impl Ledger {
	pub fn shared() -> Rc<RefCell<Ledger>> {
		Rc::new(RefCell::new(Ledger::default()))
	}

	fn allocate(&mut self) -> usize {
		self.next_id += 1;
		self.created += 1;
		self.live.insert(self.next_id);
		self.next_id
	}

	fn free(&mut self, id: usize) {
		if !self.live.remove(&id) {
			self.double_frees += 1;
		}
		self.events.push("free");
	}

	pub fn position(&self, event: &str) -> Option<usize> {
		self.events.iter().position(|e| *e == event)
	}
}

pub struct RecordingBackend {
	ledger: Rc<RefCell<Ledger>>,
}

impl RecordingBackend {
	pub fn new(ledger: Rc<RefCell<Ledger>>) -> Self {
		Self { ledger }
	}
}

impl GraphicsBackend for RecordingBackend {
	type Buffer = usize;
	type Program = usize;

	fn create_program(&mut self, _kind: ProgramKind) -> Result<usize> {
		let mut ledger = self.ledger.borrow_mut();
		if ledger.fail_programs {
			bail!("shader compile failed: test");
		}
		Ok(ledger.allocate())
	}

	fn create_buffer(&mut self) -> Result<usize> {
		Ok(self.ledger.borrow_mut().allocate())
	}

	fn upload(&mut self, _buffer: &usize, _vertices: &[f32]) {
		self.ledger.borrow_mut().uploads += 1;
	}

	fn resize(&mut self, width: u32, height: u32) {
		self.ledger.borrow_mut().backing = (width, height);
	}

	fn begin_frame(&mut self, _blend: BlendMode) {
		self.ledger.borrow_mut().frames += 1;
	}

	fn draw(
		&mut self,
		_program: &usize,
		_buffer: &usize,
		topology: Topology,
		vertex_count: usize,
		_mvp: &Mat4,
		point_scale: f32,
	) {
		let mut ledger = self.ledger.borrow_mut();
		ledger.draws.push((topology, vertex_count));
		ledger.point_scale = point_scale;
	}

	fn delete_buffer(&mut self, buffer: usize) {
		self.ledger.borrow_mut().free(buffer);
	}

	fn delete_program(&mut self, program: usize) {
		self.ledger.borrow_mut().free(program);
	}

	fn release(&mut self) {
		let mut ledger = self.ledger.borrow_mut();
		ledger.contexts_released += 1;
		ledger.events.push("release_context");
	}
}

pub struct FakeListener {
	ledger: Rc<RefCell<Ledger>>,
}

impl FakeListener {
	pub fn new(ledger: Rc<RefCell<Ledger>>) -> Self {
		ledger.borrow_mut().events.push("listen");
		Self { ledger }
	}
}

impl Drop for FakeListener {
	fn drop(&mut self) {
		self.ledger.borrow_mut().events.push("unlisten");
	}
}

pub struct FakeHost {
	pub ledger: Rc<RefCell<Ledger>>,
	pub size: Rc<RefCell<(f64, f64)>>,
	pub reduced_motion: bool,
}

impl FakeHost {
	pub fn new(ledger: Rc<RefCell<Ledger>>, width: f64, height: f64) -> Self {
		Self {
			ledger,
			size: Rc::new(RefCell::new((width, height))),
			reduced_motion: false,
		}
	}
}

impl Host for FakeHost {
	type Backend = RecordingBackend;
	type Listener = FakeListener;

	fn target_size(&self) -> (f64, f64) {
		*self.size.borrow()
	}

	fn pixel_ratio(&self) -> f64 {
		2.0
	}

	fn prefers_reduced_motion(&self) -> bool {
		self.reduced_motion
	}

	fn attach_surface(&mut self) -> Result<RecordingBackend> {
		let mut ledger = self.ledger.borrow_mut();
		ledger.surfaces_attached += 1;
		ledger.events.push("attach");
		Ok(RecordingBackend::new(self.ledger.clone()))
	}

	fn detach_surface(&mut self) {
		let mut ledger = self.ledger.borrow_mut();
		ledger.surfaces_attached -= 1;
		ledger.events.push("detach");
	}
}
