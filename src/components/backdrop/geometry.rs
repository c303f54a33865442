//! Per-frame vertex streams built from a posed [`Scene`].

use glam::{EulerRot, Quat, Vec3};

use super::gpu::FLOATS_PER_VERTEX;
use super::scene::Scene;

/// CPU-side vertex streams for one frame.
#[derive(Debug, Default)]
pub struct FrameGeometry {
	/// Point sprites.
	pub points: Vec<f32>,
	/// Shape wireframes, as segment pairs.
	pub wires: Vec<f32>,
	/// Filled shapes, as triangle lists.
	pub solids: Vec<f32>,
	/// Connection lines, as segment pairs.
	pub links: Vec<f32>,
}

impl FrameGeometry {
	/// Rebuilds sprites, wireframes and solids from the current pose.
	pub fn rebuild_primitives(&mut self, scene: &Scene) {
		self.points.clear();
		self.wires.clear();
		self.solids.clear();
		for p in scene.primitives() {
			let color = p.color.rgba(p.opacity);
			let Some(shape) = p.shape else {
				push_vertex(&mut self.points, p.position, color, p.size * p.scale);
				continue;
			};
			let r = p.rotation;
			let rotation = Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z);
			let place = |v: Vec3| p.position + rotation * (v * p.scale);
			if p.filled {
				for face in shape.faces() {
					for v in face {
						push_vertex(&mut self.solids, place(v), color, 1.0);
					}
				}
			} else {
				for (a, b) in shape.edges() {
					push_vertex(&mut self.wires, place(a), color, 1.0);
					push_vertex(&mut self.wires, place(b), color, 1.0);
				}
			}
		}
	}

	/// Rebuilds connection lines from the current connection set.
	pub fn rebuild_links(&mut self, scene: &Scene) {
		self.links.clear();
		let Some(style) = scene.connection_style() else {
			return;
		};
		let color = style.color.rgba(style.opacity);
		let primitives = scene.primitives();
		for &(a, b) in scene.connections().pairs() {
			let (Some(pa), Some(pb)) = (primitives.get(a), primitives.get(b)) else {
				continue;
			};
			push_vertex(&mut self.links, pa.position, color, 1.0);
			push_vertex(&mut self.links, pb.position, color, 1.0);
		}
	}
}

/// Vertices in a stream built by [`FrameGeometry`].
pub fn vertex_count(stream: &[f32]) -> usize {
	stream.len() / FLOATS_PER_VERTEX
}

fn push_vertex(out: &mut Vec<f32>, p: Vec3, [r, g, b, a]: [f32; 4], size: f32) {
	out.extend_from_slice(&[p.x, p.y, p.z, r, g, b, a, size]);
}
