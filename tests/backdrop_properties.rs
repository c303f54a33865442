//! Backdrop behaviour through the public API, with a counting backend standing
//! in for WebGL.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;
use crok_site::components::backdrop::config::BlendMode;
use crok_site::components::backdrop::connections::ConnectionSet;
use crok_site::components::backdrop::gpu::{ProgramKind, Topology};
use crok_site::components::backdrop::{
	Backdrop, BackdropConfig, GraphicsBackend, Host, Phase, Scene,
};
use glam::{Mat4, Vec3};

#[derive(Default)]
struct Counts {
	next: u32,
	// handle -> times released
	released: HashMap<u32, u32>,
	contexts: u32,
	attached: i32,
}

type Shared = Rc<RefCell<Counts>>;

struct CountingBackend(Shared);

impl CountingBackend {
	fn allocate(&mut self) -> u32 {
		let mut counts = self.0.borrow_mut();
		counts.next += 1;
		let id = counts.next;
		counts.released.insert(id, 0);
		id
	}

	fn free(&mut self, id: u32) {
		*self.0.borrow_mut().released.entry(id).or_default() += 1;
	}
}

impl GraphicsBackend for CountingBackend {
	type Buffer = u32;
	type Program = u32;

	fn create_program(&mut self, _kind: ProgramKind) -> Result<u32> {
		Ok(self.allocate())
	}

	fn create_buffer(&mut self) -> Result<u32> {
		Ok(self.allocate())
	}

	fn upload(&mut self, _buffer: &u32, _vertices: &[f32]) {}

	fn resize(&mut self, _width: u32, _height: u32) {}

	fn begin_frame(&mut self, _blend: BlendMode) {}

	fn draw(&mut self, _: &u32, _: &u32, _: Topology, _: usize, _: &Mat4, _: f32) {}

	fn delete_buffer(&mut self, buffer: u32) {
		self.free(buffer);
	}

	fn delete_program(&mut self, program: u32) {
		self.free(program);
	}

	fn release(&mut self) {
		self.0.borrow_mut().contexts += 1;
	}
}

struct StubHost {
	counts: Shared,
	size: Rc<RefCell<(f64, f64)>>,
}

impl StubHost {
	fn new(counts: &Shared, width: f64, height: f64) -> Self {
		Self {
			counts: counts.clone(),
			size: Rc::new(RefCell::new((width, height))),
		}
	}
}

impl Host for StubHost {
	type Backend = CountingBackend;
	type Listener = ();

	fn target_size(&self) -> (f64, f64) {
		*self.size.borrow()
	}

	fn pixel_ratio(&self) -> f64 {
		1.0
	}

	fn prefers_reduced_motion(&self) -> bool {
		false
	}

	fn attach_surface(&mut self) -> Result<CountingBackend> {
		self.counts.borrow_mut().attached += 1;
		Ok(CountingBackend(self.counts.clone()))
	}

	fn detach_surface(&mut self) {
		self.counts.borrow_mut().attached -= 1;
	}
}

fn presets() -> [BackdropConfig; 4] {
	[
		BackdropConfig::hero(),
		BackdropConfig::network(),
		BackdropConfig::particle_wave(),
		BackdropConfig::floating_geometry(),
	]
}

#[test]
fn creates_exactly_count_primitives_inside_the_box() {
	for config in presets() {
		let config = config.with_seed(11);
		let scene = Scene::new(&config);
		assert_eq!(scene.primitives().len(), config.count);
		let [hx, hy, hz] = config.half_extents;
		for p in scene.primitives() {
			assert!(p.origin.x.abs() <= hx && p.origin.y.abs() <= hy && p.origin.z.abs() <= hz);
		}
	}
}

#[test]
fn same_seed_same_frame() {
	for config in presets() {
		let config = config.with_seed(42);
		let mut a = Scene::new(&config);
		let mut b = Scene::new(&config);
		a.advance(3.25);
		b.advance(3.25);
		assert_eq!(a.primitives(), b.primitives());
	}
}

#[test]
fn connections_are_strictly_within_threshold() {
	let config = BackdropConfig::network().with_seed(5);
	let threshold = config.connections.as_ref().map(|c| c.threshold).unwrap();
	let scene = Scene::new(&config);
	assert!(!scene.connections().is_empty());
	for &(a, b) in scene.connections().pairs() {
		assert_ne!(a, b);
		let (pa, pb) = (scene.primitives()[a].position, scene.primitives()[b].position);
		assert!(pa.distance_squared(pb) < threshold * threshold);
	}

	let positions = [Vec3::ZERO, Vec3::X * 2.0, Vec3::X * 4.0];
	let mut set = ConnectionSet::new();
	set.recompute(&positions, &[0, 1, 2], 2.0);
	assert!(set.is_empty());
}

#[test]
fn repeated_mount_cycles_release_everything_once() {
	let counts = Shared::default();
	for _ in 0..8 {
		let mut backdrop = Backdrop::new("cycle", BackdropConfig::particle_wave().with_seed(9));
		assert_eq!(
			backdrop.mount(Some(StubHost::new(&counts, 640.0, 360.0))).unwrap(),
			Phase::Initialized
		);
		backdrop.add_listener(());
		for frame in 0..30 {
			backdrop.frame(frame as f64 / 60.0);
		}
		backdrop.teardown();
	}
	let counts = counts.borrow();
	assert!(counts.next > 0);
	assert!(counts.released.values().all(|&n| n == 1));
	assert_eq!(counts.contexts, 8);
	assert_eq!(counts.attached, 0);
}

#[test]
fn aspect_tracks_every_resize() {
	let counts = Shared::default();
	let host = StubHost::new(&counts, 1280.0, 720.0);
	let size = host.size.clone();
	let mut backdrop = Backdrop::new("resize", BackdropConfig::network().with_seed(1));
	backdrop.mount(Some(host)).unwrap();
	assert_eq!(backdrop.camera().map(|c| c.aspect()), Some(1280.0 / 720.0));
	for (w, h) in [(300.0, 600.0), (1920.0, 1080.0), (777.0, 333.0), (1.0, 2.0)] {
		*size.borrow_mut() = (w, h);
		assert_eq!(backdrop.resize(), Some(w / h));
		assert_eq!(backdrop.camera().map(|c| c.aspect()), Some(w / h));
	}
}

#[test]
fn missing_target_creates_nothing() {
	let mut backdrop: Backdrop<StubHost> = Backdrop::new("absent", BackdropConfig::hero());
	assert_eq!(backdrop.mount(None).unwrap(), Phase::Unmounted);
	assert!(backdrop.scene().is_none());
	assert_eq!(backdrop.live_resources(), 0);
	backdrop.teardown();
	assert_eq!(backdrop.phase(), Phase::TornDown);
}

#[test]
fn config_round_trips_through_json() {
	let config = BackdropConfig::floating_geometry().with_seed(3);
	let json = serde_json::to_string(&config).unwrap();
	let back: BackdropConfig = serde_json::from_str(&json).unwrap();
	assert_eq!(back, config);
	assert!(back.validate().is_ok());
}
