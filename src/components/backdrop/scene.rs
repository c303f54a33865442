//! Primitive collection of one backdrop: spawned inside the configured box,
//! then posed in closed form from elapsed time each frame.

use std::f32::consts::TAU;

use glam::{Mat4, Vec2, Vec3};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::{
	BackdropConfig, ConnectionConfig, MotionModel, PrimitiveKind, Refresh, Rgb, Swatch,
};
use super::connections::ConnectionSet;
use super::shapes::ShapeKind;

const PARALLAX_EASING: f32 = 0.05;

/// Animation parameters fixed when a primitive is created.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Motion {
	/// Phase offset added to every oscillation.
	pub phase: f32,
	/// Angular speed of the main oscillation.
	pub speed: f32,
	/// Amplitude of the main oscillation.
	pub amplitude: f32,
	/// Spin rate, radians per second.
	pub spin: f32,
}

/// One decorative object.
#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
	/// Spawn position; motion is expressed relative to it.
	pub origin: Vec3,
	/// Current position.
	pub position: Vec3,
	/// Spawn orientation as XYZ Euler angles.
	pub base_rotation: Vec3,
	/// Current orientation.
	pub rotation: Vec3,
	/// Spawn scale.
	pub base_scale: f32,
	/// Current scale.
	pub scale: f32,
	/// Opacity.
	pub opacity: f32,
	/// Color.
	pub color: Rgb,
	/// Sprite size, unused for shapes.
	pub size: f32,
	/// Solid, when the backdrop draws shapes.
	pub shape: Option<ShapeKind>,
	/// Whether the solid is filled rather than outlined.
	pub filled: bool,
	/// Fixed animation parameters.
	pub motion: Motion,
}

/// The primitive collection of one backdrop plus its derived connection set.
pub struct Scene {
	config: BackdropConfig,
	primitives: Vec<Primitive>,
	connections: ConnectionSet,
	connections_version: u64,
	frame: u64,
	elapsed: f32,
	pointer: Vec2,
	offset: Vec3,
	rng: StdRng,
}

impl Scene {
	/// Builds the scene, seeding from the config or from entropy.
	pub fn new(config: &BackdropConfig) -> Self {
		let rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};
		Self::with_rng(config, rng)
	}

	/// Builds `config.count` primitives inside the spawn box.
	pub fn with_rng(config: &BackdropConfig, mut rng: StdRng) -> Self {
		let [hx, hy, hz] = config.half_extents;
		let colors = palette_picker(&config.palette);
		let mut primitives = Vec::with_capacity(config.count);

		for index in 0..config.count {
			let origin = Vec3::new(
				symmetric(&mut rng, hx),
				symmetric(&mut rng, hy),
				symmetric(&mut rng, hz),
			);
			let (color, opacity, wireframe) = if config.materials.is_empty() {
				let color = colors
					.as_ref()
					.map(|dist| config.palette[dist.sample(&mut rng)].color)
					.unwrap_or(config.palette.first().map_or(Rgb(0xffffff), |s| s.color));
				(color, config.opacity.sample(&mut rng), true)
			} else {
				let m = config.materials[rng.gen_range(0..config.materials.len())];
				(m.color, m.opacity, m.wireframe)
			};
			let shape = match &config.primitives {
				PrimitiveKind::Points => None,
				PrimitiveKind::Shapes(shapes) if shapes.is_empty() => None,
				PrimitiveKind::Shapes(shapes) => Some(shapes[rng.gen_range(0..shapes.len())]),
			};
			let base_rotation = if shape.is_some() {
				Vec3::new(
					rng.gen_range(0.0..TAU),
					rng.gen_range(0.0..TAU),
					rng.gen_range(0.0..TAU),
				)
			} else {
				Vec3::ZERO
			};
			let base_scale = config.scale.sample(&mut rng);
			let motion = sample_motion(&config.motion, index, &mut rng);

			primitives.push(Primitive {
				origin,
				position: origin,
				base_rotation,
				rotation: base_rotation,
				base_scale,
				scale: base_scale,
				opacity,
				color,
				size: config.point_size.sample(&mut rng),
				shape,
				filled: shape.is_some() && !wireframe,
				motion,
			});
		}

		let mut scene = Self {
			config: config.clone(),
			primitives,
			connections: ConnectionSet::new(),
			connections_version: 0,
			frame: 0,
			elapsed: 0.0,
			pointer: Vec2::ZERO,
			offset: Vec3::ZERO,
			rng,
		};
		scene.refresh_connections();
		scene
	}

	/// The primitive collection, in creation order.
	pub fn primitives(&self) -> &[Primitive] {
		&self.primitives
	}

	/// The most recently computed connection set.
	pub fn connections(&self) -> &ConnectionSet {
		&self.connections
	}

	/// Line style, if this backdrop draws connections.
	pub fn connection_style(&self) -> Option<&ConnectionConfig> {
		self.config.connections.as_ref()
	}

	/// Bumped every time the connection set is rebuilt.
	pub fn connections_version(&self) -> u64 {
		self.connections_version
	}

	/// Number of `advance` calls so far.
	pub fn frame(&self) -> u64 {
		self.frame
	}

	/// Elapsed time passed to the last `advance`.
	pub fn elapsed(&self) -> f32 {
		self.elapsed
	}

	/// Configuration the scene was built from.
	pub fn config(&self) -> &BackdropConfig {
		&self.config
	}

	/// Pointer position in `[-1, 1]` on both axes, y up.
	pub fn point_at(&mut self, x: f32, y: f32) {
		self.pointer = Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
	}

	/// Poses every primitive for `elapsed` seconds since the animation
	/// started. Returns `true` when the connection set was rebuilt.
	pub fn advance(&mut self, elapsed: f32) -> bool {
		self.frame += 1;
		self.elapsed = elapsed;

		for (index, primitive) in self.primitives.iter_mut().enumerate() {
			pose(&self.config.motion, primitive, index, elapsed);
		}

		if self.config.parallax > 0.0 {
			let target = (self.pointer * self.config.parallax).extend(0.0);
			self.offset += (target - self.offset) * PARALLAX_EASING;
		}

		match self.config.connections.as_ref().map(|c| c.refresh) {
			Some(Refresh::EveryFrames(n)) if n > 0 && self.frame % u64::from(n) == 0 => {
				self.refresh_connections();
				true
			}
			_ => false,
		}
	}

	/// Field-level transform: parallax offset and spin around Y.
	pub fn model_matrix(&self) -> Mat4 {
		let spin = Mat4::from_rotation_y(self.elapsed * self.config.spin_y);
		Mat4::from_translation(self.offset) * spin
	}

	fn refresh_connections(&mut self) {
		let Some(style) = self.config.connections.as_ref() else {
			return;
		};
		let positions: Vec<Vec3> = self.primitives.iter().map(|p| p.position).collect();
		let total = positions.len();
		let candidates: Vec<usize> = match style.sample {
			Some(amount) => {
				rand::seq::index::sample(&mut self.rng, total, amount.min(total)).into_vec()
			}
			None => (0..positions.len()).collect(),
		};
		self.connections
			.recompute(&positions, &candidates, style.threshold);
		self.connections_version += 1;
	}
}

fn symmetric<R: Rng + ?Sized>(rng: &mut R, half: f32) -> f32 {
	if half > 0.0 {
		rng.gen_range(-half..=half)
	} else {
		0.0
	}
}

fn palette_picker(palette: &[Swatch]) -> Option<WeightedIndex<f32>> {
	WeightedIndex::new(palette.iter().map(|s| s.weight)).ok()
}

fn sample_motion<R: Rng + ?Sized>(model: &MotionModel, index: usize, rng: &mut R) -> Motion {
	let i = index as f32;
	match model {
		MotionModel::Shimmer { amplitude, .. } => Motion {
			phase: 0.0,
			speed: 1.0,
			amplitude: *amplitude,
			spin: 0.0,
		},
		MotionModel::Wave { height, speed, .. } => Motion {
			phase: i * 0.01,
			speed: *speed,
			amplitude: *height,
			spin: 0.0,
		},
		MotionModel::Float {
			speed,
			amplitude,
			spin,
			..
		} => Motion {
			phase: i,
			speed: speed.sample(rng),
			amplitude: amplitude.sample(rng),
			spin: spin.sample(rng),
		},
		MotionModel::Pulse { wander, .. } => Motion {
			phase: i,
			speed: 1.0,
			amplitude: *wander,
			spin: 0.0,
		},
	}
}

/// Closed-form pose of one primitive at time `t`.
fn pose(model: &MotionModel, p: &mut Primitive, index: usize, t: f32) {
	let m = p.motion;
	let o = p.origin;
	match model {
		MotionModel::Shimmer { speed, .. } => {
			p.position = o + Vec3::new(
				(t * speed[0] + o.y).sin() * m.amplitude,
				(t * speed[1] + o.x).cos() * m.amplitude,
				0.0,
			);
		}
		MotionModel::Wave {
			frequency,
			depth,
			drift,
			..
		} => {
			let along = o.x * frequency;
			p.position = Vec3::new(
				o.x + (t * 0.1 + m.phase).sin() * drift,
				o.y + (along + t * m.speed).sin() * m.amplitude,
				o.z + (along + t * m.speed * 0.7).cos() * depth,
			);
		}
		MotionModel::Float { drift, pulse, .. } => {
			p.position = Vec3::new(
				o.x + (t * 0.1 + m.phase).sin() * drift,
				o.y + (t * m.speed + m.phase).sin() * m.amplitude,
				o.z + (t * 0.15 + m.phase).cos() * drift * 0.6,
			);
			p.rotation = p.base_rotation + Vec3::new(1.0, 0.7, 0.5) * (m.spin * t);
			p.scale = p.base_scale * (1.0 + (t * 2.0 + index as f32 * 0.5).sin() * pulse);
		}
		MotionModel::Pulse { pulse, .. } => {
			p.position = Vec3::new(
				o.x + (t * 0.5 + m.phase).sin() * m.amplitude,
				o.y + (t * 0.3 + m.phase).cos() * m.amplitude,
				o.z,
			);
			p.scale = p.base_scale * (1.0 + (t * 3.0 + m.phase).sin() * pulse);
		}
	}
}
