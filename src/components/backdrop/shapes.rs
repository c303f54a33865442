//! Local-space geometry of the solids drawn by shape backdrops, as wireframe
//! edges and as filled triangles.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Solids used by the floating-geometry backdrop.
///
/// Sizes are in world units before the primitive's own scale is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
	/// Cube with 0.5 edges.
	Cube,
	/// Sphere of radius 0.3; three great circles as a wireframe.
	Sphere,
	/// Cone of radius 0.3 and height 0.8.
	Cone,
	/// Cylinder of radius 0.2 and height 0.8.
	Cylinder,
	/// Tetrahedron with circumradius 0.4.
	Tetrahedron,
	/// Octahedron with circumradius 0.4.
	Octahedron,
}

const RING_SEGMENTS: usize = 8;
const SPHERE_STACKS: usize = 6;

impl ShapeKind {
	/// Every shape, in a stable order.
	pub const ALL: [ShapeKind; 6] = [
		ShapeKind::Cube,
		ShapeKind::Sphere,
		ShapeKind::Cone,
		ShapeKind::Cylinder,
		ShapeKind::Tetrahedron,
		ShapeKind::Octahedron,
	];

	/// Line segments of the wireframe in local space, centred on the origin.
	pub fn edges(self) -> Vec<(Vec3, Vec3)> {
		match self {
			ShapeKind::Cube => cube(0.25),
			ShapeKind::Sphere => {
				let mut edges = ring(0.3, 0.0, Plane::Xz);
				edges.extend(ring(0.3, 0.0, Plane::Xy));
				edges.extend(ring(0.3, 0.0, Plane::Yz));
				edges
			}
			ShapeKind::Cone => {
				let apex = Vec3::new(0.0, 0.4, 0.0);
				let mut edges = ring(0.3, -0.4, Plane::Xz);
				edges.extend(
					spokes(0.3, -0.4)
						.into_iter()
						.map(|base| (base, apex)),
				);
				edges
			}
			ShapeKind::Cylinder => {
				let mut edges = ring(0.2, -0.4, Plane::Xz);
				edges.extend(ring(0.2, 0.4, Plane::Xz));
				edges.extend(
					spokes(0.2, -0.4)
						.into_iter()
						.map(|base| (base, base + Vec3::new(0.0, 0.8, 0.0))),
				);
				edges
			}
			ShapeKind::Tetrahedron => {
				let r = 0.4 / 3f32.sqrt();
				let v = [
					Vec3::new(r, r, r),
					Vec3::new(-r, -r, r),
					Vec3::new(-r, r, -r),
					Vec3::new(r, -r, -r),
				];
				all_pairs(&v)
			}
			ShapeKind::Octahedron => {
				let r = 0.4;
				let poles = [Vec3::new(0.0, r, 0.0), Vec3::new(0.0, -r, 0.0)];
				let equator = [
					Vec3::new(r, 0.0, 0.0),
					Vec3::new(0.0, 0.0, r),
					Vec3::new(-r, 0.0, 0.0),
					Vec3::new(0.0, 0.0, -r),
				];
				let mut edges = Vec::with_capacity(12);
				for (i, &a) in equator.iter().enumerate() {
					edges.push((a, equator[(i + 1) % equator.len()]));
					for &pole in &poles {
						edges.push((a, pole));
					}
				}
				edges
			}
		}
	}
}

impl ShapeKind {
	/// Triangles of the filled solid in local space, centred on the origin.
	pub fn faces(self) -> Vec<[Vec3; 3]> {
		match self {
			ShapeKind::Cube => cube_faces(0.25),
			ShapeKind::Sphere => sphere_faces(0.3),
			ShapeKind::Cone => {
				let apex = Vec3::new(0.0, 0.4, 0.0);
				let base = ring_points(0.3, -0.4);
				let mut faces = fan(&base, Vec3::new(0.0, -0.4, 0.0));
				faces.extend(fan(&base, apex));
				faces
			}
			ShapeKind::Cylinder => {
				let bottom = ring_points(0.2, -0.4);
				let top = ring_points(0.2, 0.4);
				let mut faces = fan(&bottom, Vec3::new(0.0, -0.4, 0.0));
				faces.extend(fan(&top, Vec3::new(0.0, 0.4, 0.0)));
				for k in 0..RING_SEGMENTS {
					let next = (k + 1) % RING_SEGMENTS;
					faces.push([bottom[k], bottom[next], top[next]]);
					faces.push([bottom[k], top[next], top[k]]);
				}
				faces
			}
			ShapeKind::Tetrahedron => {
				let r = 0.4 / 3f32.sqrt();
				let v = [
					Vec3::new(r, r, r),
					Vec3::new(-r, -r, r),
					Vec3::new(-r, r, -r),
					Vec3::new(r, -r, -r),
				];
				vec![
					[v[0], v[1], v[2]],
					[v[0], v[3], v[1]],
					[v[0], v[2], v[3]],
					[v[1], v[3], v[2]],
				]
			}
			ShapeKind::Octahedron => {
				let r = 0.4;
				let equator = [
					Vec3::new(r, 0.0, 0.0),
					Vec3::new(0.0, 0.0, r),
					Vec3::new(-r, 0.0, 0.0),
					Vec3::new(0.0, 0.0, -r),
				];
				let mut faces = fan(&equator, Vec3::new(0.0, r, 0.0));
				faces.extend(fan(&equator, Vec3::new(0.0, -r, 0.0)));
				faces
			}
		}
	}
}

#[derive(Clone, Copy)]
enum Plane {
	Xy,
	Xz,
	Yz,
}

fn ring(radius: f32, offset: f32, plane: Plane) -> Vec<(Vec3, Vec3)> {
	let point = |k: usize| {
		let a = k as f32 * TAU / RING_SEGMENTS as f32;
		let (s, c) = (a.sin() * radius, a.cos() * radius);
		match plane {
			Plane::Xy => Vec3::new(c, s, offset),
			Plane::Xz => Vec3::new(c, offset, s),
			Plane::Yz => Vec3::new(offset, c, s),
		}
	};
	(0..RING_SEGMENTS).map(|k| (point(k), point(k + 1))).collect()
}

fn ring_points(radius: f32, y: f32) -> Vec<Vec3> {
	(0..RING_SEGMENTS)
		.map(|k| {
			let a = k as f32 * TAU / RING_SEGMENTS as f32;
			Vec3::new(a.cos() * radius, y, a.sin() * radius)
		})
		.collect()
}

// closed ring of triangles sharing `tip`
fn fan(ring: &[Vec3], tip: Vec3) -> Vec<[Vec3; 3]> {
	(0..ring.len())
		.map(|k| [ring[k], ring[(k + 1) % ring.len()], tip])
		.collect()
}

fn cube_faces(h: f32) -> Vec<[Vec3; 3]> {
	let mut faces = Vec::with_capacity(12);
	for axis in 0..3 {
		for sign in [-h, h] {
			let corner = |u: f32, v: f32| {
				let mut p = [0.0; 3];
				p[axis] = sign;
				p[(axis + 1) % 3] = u;
				p[(axis + 2) % 3] = v;
				Vec3::from(p)
			};
			let (a, b, c, d) = (corner(-h, -h), corner(h, -h), corner(h, h), corner(-h, h));
			faces.push([a, b, c]);
			faces.push([a, c, d]);
		}
	}
	faces
}

fn sphere_faces(radius: f32) -> Vec<[Vec3; 3]> {
	let point = |stack: usize, slice: usize| {
		let phi = stack as f32 * PI / SPHERE_STACKS as f32;
		let theta = slice as f32 * TAU / RING_SEGMENTS as f32;
		Vec3::new(
			phi.sin() * theta.cos() * radius,
			phi.cos() * radius,
			phi.sin() * theta.sin() * radius,
		)
	};
	let mut faces = Vec::with_capacity(SPHERE_STACKS * RING_SEGMENTS * 2);
	for stack in 0..SPHERE_STACKS {
		for slice in 0..RING_SEGMENTS {
			let (a, b) = (point(stack, slice), point(stack, slice + 1));
			let (c, d) = (point(stack + 1, slice + 1), point(stack + 1, slice));
			// the pole rows collapse to a single triangle
			if stack != 0 {
				faces.push([a, b, c]);
			}
			if stack != SPHERE_STACKS - 1 {
				faces.push([a, c, d]);
			}
		}
	}
	faces
}

fn spokes(radius: f32, y: f32) -> Vec<Vec3> {
	(0..4)
		.map(|k| {
			let a = k as f32 * TAU / 4.0;
			Vec3::new(a.cos() * radius, y, a.sin() * radius)
		})
		.collect()
}

fn cube(h: f32) -> Vec<(Vec3, Vec3)> {
	let mut edges = Vec::with_capacity(12);
	for &a in &[-h, h] {
		for &b in &[-h, h] {
			edges.push((Vec3::new(-h, a, b), Vec3::new(h, a, b)));
			edges.push((Vec3::new(a, -h, b), Vec3::new(a, h, b)));
			edges.push((Vec3::new(a, b, -h), Vec3::new(a, b, h)));
		}
	}
	edges
}

fn all_pairs(vertices: &[Vec3]) -> Vec<(Vec3, Vec3)> {
	let mut edges = Vec::new();
	for (i, &a) in vertices.iter().enumerate() {
		for &b in &vertices[i + 1..] {
			edges.push((a, b));
		}
	}
	edges
}
