//! Backdrop configuration and the presets used across the site.
//!
//! One configuration drives every variant: the hero sparkle field, the careers
//! network, the case-studies particle wave and the blog's floating geometry.

use anyhow::{Result, ensure};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::shapes::ShapeKind;

/// Brand teal.
pub const TEAL: Rgb = Rgb(0x4a_db_c8);
/// Brand purple.
pub const PURPLE: Rgb = Rgb(0x6c_22_d9);
/// Plain white, used as a highlight in the particle wave.
pub const WHITE: Rgb = Rgb(0xff_ff_ff);

/// Closed `[min, max]` interval sampled uniformly at initialization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
	/// Lower bound, inclusive.
	pub min: f32,
	/// Upper bound, inclusive.
	pub max: f32,
}

impl Band {
	/// A band spanning `min..=max`.
	pub const fn new(min: f32, max: f32) -> Self {
		Self { min, max }
	}

	/// A degenerate band that always yields `value`.
	pub const fn fixed(value: f32) -> Self {
		Self {
			min: value,
			max: value,
		}
	}

	/// Draws a value from the band.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
		if self.max > self.min {
			rng.gen_range(self.min..=self.max)
		} else {
			self.min
		}
	}

	/// Whether `value` lies inside the band.
	pub fn contains(&self, value: f32) -> bool {
		value >= self.min && value <= self.max
	}

	fn is_ordered(&self) -> bool {
		self.min.is_finite() && self.max.is_finite() && self.min <= self.max
	}
}

/// Packed `0xRRGGBB` color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u32);

impl Rgb {
	/// Normalized channels with the given alpha.
	pub fn rgba(self, alpha: f32) -> [f32; 4] {
		let channel = |shift: u32| ((self.0 >> shift) & 0xff) as f32 / 255.0;
		[channel(16), channel(8), channel(0), alpha]
	}
}

/// A palette entry; `weight` is the relative chance of being picked.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Swatch {
	/// Color of the entry.
	pub color: Rgb,
	/// Relative weight, must be positive.
	pub weight: f32,
}

impl Swatch {
	/// Shorthand constructor.
	pub const fn new(color: Rgb, weight: f32) -> Self {
		Self { color, weight }
	}
}

/// Color and opacity picked together for a primitive, and whether a shape is
/// drawn as a wireframe or a filled solid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
	/// Color.
	pub color: Rgb,
	/// Opacity in `[0, 1]`.
	pub opacity: f32,
	/// Outline only. Ignored for point sprites.
	#[serde(default)]
	pub wireframe: bool,
}

impl Material {
	/// Wireframe material.
	pub const fn wire(color: Rgb, opacity: f32) -> Self {
		Self {
			color,
			opacity,
			wireframe: true,
		}
	}

	/// Filled material.
	pub const fn solid(color: Rgb, opacity: f32) -> Self {
		Self {
			color,
			opacity,
			wireframe: false,
		}
	}
}

/// What each primitive is drawn as.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveKind {
	/// Round point sprites.
	Points,
	/// Solids, one picked at random per primitive. Drawn filled or as
	/// wireframes depending on the primitive's material.
	Shapes(Vec<ShapeKind>),
}

/// Closed-form motion applied by the frame updater.
///
/// Every variant is a function of elapsed time and the primitive's fixed
/// parameters only, never of the previous frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MotionModel {
	/// Small xy oscillation keyed on the primitive's origin.
	Shimmer {
		/// Offset amplitude in world units.
		amplitude: f32,
		/// Angular speed of the x and y oscillation.
		speed: [f32; 2],
	},
	/// Height and depth waves travelling along X, plus slow drift.
	Wave {
		/// Spatial frequency along X.
		frequency: f32,
		/// Vertical amplitude.
		height: f32,
		/// Depth amplitude.
		depth: f32,
		/// Temporal speed of the wave.
		speed: f32,
		/// Horizontal drift amplitude.
		drift: f32,
	},
	/// Vertical float, drift, spin and a subtle scale pulse.
	Float {
		/// Angular speed of the float, per primitive.
		speed: Band,
		/// Float amplitude, per primitive.
		amplitude: Band,
		/// Spin rate in radians per second, per primitive.
		spin: Band,
		/// Drift amplitude in the XZ plane.
		drift: f32,
		/// Relative scale pulse.
		pulse: f32,
	},
	/// Wander around the origin with a scale pulse.
	Pulse {
		/// Wander amplitude.
		wander: f32,
		/// Relative scale pulse.
		pulse: f32,
	},
}

/// How often the connection set is rebuilt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Refresh {
	/// Built once when the scene is initialized.
	Once,
	/// Rebuilt every N frames.
	EveryFrames(u32),
}

/// Lines drawn between nearby primitives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
	/// Pairs closer than this (strictly) are connected.
	pub threshold: f32,
	/// Rebuild cadence.
	pub refresh: Refresh,
	/// Only consider a random sample of this many distinct primitives.
	pub sample: Option<usize>,
	/// Line color.
	pub color: Rgb,
	/// Line opacity.
	pub opacity: f32,
}

/// Perspective camera with a gentle sway around the origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraRig {
	/// Vertical field of view in degrees.
	pub fov_deg: f32,
	/// Near clip plane.
	pub near: f32,
	/// Far clip plane.
	pub far: f32,
	/// Distance from the origin along +Z.
	pub distance: f32,
	/// Sway amplitude on X and Y.
	pub sway: [f32; 2],
	/// Sway angular speed on X and Y.
	pub sway_speed: [f32; 2],
}

/// Blending used when compositing primitives over the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
	/// Regular alpha blending.
	#[default]
	Alpha,
	/// Additive blending, for glowing sparkles.
	Additive,
}

fn default_true() -> bool {
	true
}

/// Full description of one animated backdrop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackdropConfig {
	/// Primitive representation.
	pub primitives: PrimitiveKind,
	/// Fixed number of primitives.
	pub count: usize,
	/// Half-extents of the spawn box, centred on the origin.
	pub half_extents: [f32; 3],
	/// Base scale band.
	pub scale: Band,
	/// Opacity band.
	pub opacity: Band,
	/// Point sprite size band, in CSS pixels at unit depth scale.
	pub point_size: Band,
	/// Weighted colors.
	pub palette: Vec<Swatch>,
	/// Materials picked uniformly per primitive. When set, they replace
	/// `palette` and `opacity`, and shapes are wireframes only if the picked
	/// material says so. When empty, shapes are wireframes.
	#[serde(default)]
	pub materials: Vec<Material>,
	/// Per-frame motion.
	pub motion: MotionModel,
	/// Optional connection lines.
	pub connections: Option<ConnectionConfig>,
	/// Camera.
	pub camera: CameraRig,
	/// Spin of the whole field around Y, radians per second.
	#[serde(default)]
	pub spin_y: f32,
	/// How far the field leans toward the pointer (0 disables).
	#[serde(default)]
	pub parallax: f32,
	/// Blend mode.
	#[serde(default)]
	pub blend: BlendMode,
	/// Skip the animation entirely when the user prefers reduced motion.
	#[serde(default = "default_true")]
	pub respect_reduced_motion: bool,
	/// Fixed RNG seed for reproducible layouts.
	#[serde(default)]
	pub seed: Option<u64>,
}

impl Default for BackdropConfig {
	fn default() -> Self {
		Self::hero()
	}
}

impl BackdropConfig {
	/// Sparkle field behind the landing hero, leaning toward the pointer.
	pub fn hero() -> Self {
		Self {
			primitives: PrimitiveKind::Points,
			count: 1_000,
			half_extents: [10.0, 10.0, 10.0],
			scale: Band::fixed(1.0),
			opacity: Band::fixed(0.8),
			point_size: Band::fixed(0.6),
			palette: vec![Swatch::new(TEAL, 1.0), Swatch::new(PURPLE, 1.0)],
			materials: Vec::new(),
			motion: MotionModel::Shimmer {
				amplitude: 0.12,
				speed: [0.3, 0.25],
			},
			connections: None,
			camera: CameraRig {
				fov_deg: 60.0,
				near: 0.1,
				far: 100.0,
				distance: 6.0,
				sway: [0.0, 0.0],
				sway_speed: [0.0, 0.0],
			},
			spin_y: 0.0,
			parallax: 0.5,
			blend: BlendMode::Additive,
			respect_reduced_motion: true,
			seed: None,
		}
	}

	/// Pulsing nodes with static links, for the careers page.
	pub fn network() -> Self {
		Self {
			primitives: PrimitiveKind::Points,
			count: 30,
			half_extents: [12.5, 7.5, 5.0],
			scale: Band::fixed(1.0),
			opacity: Band::fixed(1.0),
			point_size: Band::fixed(0.5),
			palette: vec![Swatch::new(TEAL, 1.0)],
			materials: Vec::new(),
			motion: MotionModel::Pulse {
				wander: 1.0,
				pulse: 0.3,
			},
			connections: Some(ConnectionConfig {
				threshold: 8.0,
				refresh: Refresh::Once,
				sample: None,
				color: PURPLE,
				opacity: 0.6,
			}),
			camera: CameraRig {
				fov_deg: 75.0,
				near: 0.1,
				far: 1000.0,
				distance: 15.0,
				sway: [3.0, 2.0],
				sway_speed: [0.2, 0.15],
			},
			spin_y: 0.0,
			parallax: 0.0,
			blend: BlendMode::Alpha,
			respect_reduced_motion: true,
			seed: None,
		}
	}

	/// Dense particle wave with sampled links, for the case studies page.
	pub fn particle_wave() -> Self {
		Self {
			primitives: PrimitiveKind::Points,
			count: 2_000,
			half_extents: [30.0, 20.0, 20.0],
			scale: Band::fixed(1.0),
			opacity: Band::fixed(0.8),
			point_size: Band::new(1.0, 4.0),
			palette: vec![
				Swatch::new(TEAL, 0.4),
				Swatch::new(PURPLE, 0.3),
				Swatch::new(WHITE, 0.3),
			],
			materials: Vec::new(),
			motion: MotionModel::Wave {
				frequency: 0.1,
				height: 2.0,
				depth: 1.5,
				speed: 0.5,
				drift: 0.5,
			},
			connections: Some(ConnectionConfig {
				threshold: 12.0,
				refresh: Refresh::EveryFrames(10),
				sample: Some(150),
				color: TEAL,
				opacity: 0.1,
			}),
			camera: CameraRig {
				fov_deg: 75.0,
				near: 0.1,
				far: 1000.0,
				distance: 25.0,
				sway: [3.0, 2.0],
				sway_speed: [0.05, 0.03],
			},
			spin_y: 0.02,
			parallax: 0.0,
			blend: BlendMode::Alpha,
			respect_reduced_motion: true,
			seed: None,
		}
	}

	/// Spinning solids, some outlined and some filled, with live links, for
	/// the blog.
	pub fn floating_geometry() -> Self {
		Self {
			primitives: PrimitiveKind::Shapes(ShapeKind::ALL.to_vec()),
			count: 25,
			half_extents: [20.0, 15.0, 10.0],
			scale: Band::new(0.5, 2.0),
			opacity: Band::new(0.3, 0.6),
			point_size: Band::fixed(1.0),
			palette: vec![Swatch::new(TEAL, 2.0), Swatch::new(PURPLE, 1.0)],
			materials: vec![
				Material::wire(TEAL, 0.6),
				Material::solid(PURPLE, 0.4),
				Material::solid(TEAL, 0.3),
			],
			motion: MotionModel::Float {
				speed: Band::new(0.01, 0.03),
				amplitude: Band::new(2.0, 5.0),
				spin: Band::new(0.3, 0.9),
				drift: 0.05,
				pulse: 0.1,
			},
			connections: Some(ConnectionConfig {
				threshold: 8.0,
				refresh: Refresh::EveryFrames(5),
				sample: None,
				color: TEAL,
				opacity: 0.15,
			}),
			camera: CameraRig {
				fov_deg: 60.0,
				near: 0.1,
				far: 1000.0,
				distance: 20.0,
				sway: [2.0, 1.0],
				sway_speed: [0.05, 0.03],
			},
			spin_y: 0.0,
			parallax: 0.0,
			blend: BlendMode::Alpha,
			respect_reduced_motion: true,
			seed: None,
		}
	}

	/// Same configuration with a fixed seed.
	pub fn with_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	/// Rejects configurations the initializer cannot honor.
	pub fn validate(&self) -> Result<()> {
		ensure!(!self.palette.is_empty(), "palette is empty");
		ensure!(
			self.palette
				.iter()
				.all(|s| s.weight.is_finite() && s.weight > 0.0),
			"palette weights must be positive"
		);
		for material in &self.materials {
			ensure!(
				(0.0..=1.0).contains(&material.opacity),
				"material opacity must be within [0, 1], got {}",
				material.opacity
			);
		}
		ensure!(
			self.half_extents
				.iter()
				.all(|h| h.is_finite() && *h >= 0.0),
			"half extents must be non-negative, got {:?}",
			self.half_extents
		);
		for (name, band) in [
			("scale", self.scale),
			("opacity", self.opacity),
			("point_size", self.point_size),
		] {
			ensure!(band.is_ordered(), "{name} band is inverted: {band:?}");
		}
		if let MotionModel::Float {
			speed,
			amplitude,
			spin,
			..
		} = &self.motion
		{
			for band in [speed, amplitude, spin] {
				ensure!(band.is_ordered(), "motion band is inverted: {band:?}");
			}
		}
		if let PrimitiveKind::Shapes(shapes) = &self.primitives {
			ensure!(!shapes.is_empty(), "shape list is empty");
		}
		if let Some(links) = &self.connections {
			ensure!(
				links.threshold.is_finite() && links.threshold > 0.0,
				"connection threshold must be positive, got {}",
				links.threshold
			);
			if let Refresh::EveryFrames(n) = links.refresh {
				ensure!(n >= 2, "connection refresh cadence must be at least two frames, got {n}");
			}
		}
		let cam = &self.camera;
		ensure!(
			cam.near > 0.0 && cam.far > cam.near,
			"camera clip planes are invalid: near={} far={}",
			cam.near,
			cam.far
		);
		ensure!(
			cam.fov_deg > 0.0 && cam.fov_deg < 180.0,
			"camera field of view out of range: {}",
			cam.fov_deg
		);
		Ok(())
	}
}
