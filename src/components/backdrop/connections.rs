//! Proximity pairs between primitives.

use glam::Vec3;

/// Pairs of primitives close enough to be joined by a line.
///
/// Rebuilt from scratch on every recompute; nothing carries over.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectionSet {
	pairs: Vec<(usize, usize)>,
}

impl ConnectionSet {
	/// An empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Index pairs, lower index first.
	pub fn pairs(&self) -> &[(usize, usize)] {
		&self.pairs
	}

	/// Number of pairs.
	pub fn len(&self) -> usize {
		self.pairs.len()
	}

	/// Whether no pair is connected.
	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}

	/// Replaces the set with every candidate pair whose distance is strictly
	/// below `threshold`.
	///
	/// `candidates` index into `positions`; out-of-range and repeated indices
	/// are skipped.
	pub fn recompute(&mut self, positions: &[Vec3], candidates: &[usize], threshold: f32) {
		self.pairs.clear();
		if threshold.is_nan() || threshold <= 0.0 {
			return;
		}
		let limit = threshold * threshold;
		for (slot, &a) in candidates.iter().enumerate() {
			let Some(pa) = positions.get(a) else {
				continue;
			};
			for &b in &candidates[slot + 1..] {
				if a == b {
					continue;
				}
				let Some(pb) = positions.get(b) else {
					continue;
				};
				if pa.distance_squared(*pb) < limit {
					self.pairs.push((a.min(b), a.max(b)));
				}
			}
		}
		self.pairs.sort_unstable();
		self.pairs.dedup();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn line(n: usize, spacing: f32) -> Vec<Vec3> {
		(0..n)
			.map(|i| Vec3::new(i as f32 * spacing, 0.0, 0.0))
			.collect()
	}

	#[test]
	fn threshold_is_strict() {
		let positions = line(3, 2.0);
		let mut set = ConnectionSet::new();
		set.recompute(&positions, &[0, 1, 2], 2.0);
		assert!(set.is_empty());

		set.recompute(&positions, &[0, 1, 2], 2.01);
		assert_eq!(set.pairs(), &[(0, 1), (1, 2)]);
	}

	#[test]
	fn never_pairs_a_primitive_with_itself() {
		let positions = line(4, 1.0);
		let mut set = ConnectionSet::new();
		set.recompute(&positions, &[2, 2, 3, 3, 0], 10.0);
		assert!(set.pairs().iter().all(|(a, b)| a != b));
		assert_eq!(set.pairs(), &[(0, 2), (0, 3), (2, 3)]);
	}

	#[test]
	fn stale_pairs_are_discarded() {
		let mut positions = line(2, 1.0);
		let mut set = ConnectionSet::new();
		set.recompute(&positions, &[0, 1], 1.5);
		assert_eq!(set.len(), 1);

		positions[1] = Vec3::new(50.0, 0.0, 0.0);
		set.recompute(&positions, &[0, 1], 1.5);
		assert!(set.is_empty());
	}

	#[test]
	fn ignores_out_of_range_candidates_and_bad_thresholds() {
		let positions = line(2, 1.0);
		let mut set = ConnectionSet::new();
		set.recompute(&positions, &[0, 1, 9], 5.0);
		assert_eq!(set.pairs(), &[(0, 1)]);

		set.recompute(&positions, &[0, 1], -5.0);
		assert!(set.is_empty());
		set.recompute(&positions, &[0, 1], f32::NAN);
		assert!(set.is_empty());
	}
}
