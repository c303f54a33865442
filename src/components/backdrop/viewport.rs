//! Mount target size and the perspective camera that follows it.

use glam::{Mat4, Vec3};

use super::config::CameraRig;

/// Layout size of the mount target in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Width in CSS pixels.
	pub width: f64,
	/// Height in CSS pixels.
	pub height: f64,
	/// Device pixels per CSS pixel.
	pub pixel_ratio: f64,
}

impl Viewport {
	/// Builds a viewport, falling back to a pixel ratio of 1 when the host
	/// reports nonsense.
	pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
		let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
			pixel_ratio
		} else {
			1.0
		};
		Self {
			width,
			height,
			pixel_ratio,
		}
	}

	/// A zero (or invalid) sized target shows nothing.
	pub fn is_degenerate(&self) -> bool {
		let finite = self.width.is_finite() && self.height.is_finite();
		!(finite && self.width > 0.0 && self.height > 0.0)
	}

	/// `width / height`, if the target has an area.
	pub fn aspect(&self) -> Option<f64> {
		(!self.is_degenerate()).then(|| self.width / self.height)
	}

	/// Size of the drawing buffer in device pixels.
	pub fn backing_size(&self) -> (u32, u32) {
		if self.is_degenerate() {
			return (0, 0);
		}
		(
			(self.width * self.pixel_ratio).round() as u32,
			(self.height * self.pixel_ratio).round() as u32,
		)
	}
}

/// Perspective camera looking at the origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
	fov_y: f32,
	near: f32,
	far: f32,
	aspect: f64,
	eye: Vec3,
}

impl Camera {
	/// Camera for `rig`, sized to `viewport`.
	pub fn new(rig: &CameraRig, viewport: &Viewport) -> Self {
		let mut camera = Self {
			fov_y: rig.fov_deg.to_radians(),
			near: rig.near,
			far: rig.far,
			aspect: 1.0,
			eye: Vec3::new(0.0, 0.0, rig.distance),
		};
		camera.resize(viewport);
		camera
	}

	/// Matches the aspect ratio to the viewport and returns it. A degenerate
	/// viewport leaves the previous aspect untouched.
	pub fn resize(&mut self, viewport: &Viewport) -> f64 {
		if let Some(aspect) = viewport.aspect() {
			self.aspect = aspect;
		}
		self.aspect
	}

	/// Current aspect ratio.
	pub fn aspect(&self) -> f64 {
		self.aspect
	}

	/// Eye position.
	pub fn eye(&self) -> Vec3 {
		self.eye
	}

	/// Places the eye on its sway path for elapsed time `t`.
	pub fn follow(&mut self, rig: &CameraRig, t: f32) {
		self.eye = Vec3::new(
			(t * rig.sway_speed[0]).sin() * rig.sway[0],
			(t * rig.sway_speed[1]).cos() * rig.sway[1],
			rig.distance,
		);
	}

	/// Combined projection and view matrix.
	pub fn view_projection(&self) -> Mat4 {
		let aspect = self.aspect as f32;
		let projection = Mat4::perspective_rh_gl(self.fov_y, aspect, self.near, self.far);
		let view = Mat4::look_at_rh(self.eye, Vec3::ZERO, Vec3::Y);
		projection * view
	}
}
