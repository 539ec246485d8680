use plate_core::{Descriptor, Feature, Match};
use rayon::prelude::*;

/// Number of differing bits between two 256-bit descriptors
#[inline]
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// Brute-force nearest-neighbour matcher under Hamming distance.
///
/// Every query descriptor gets exactly one match: the train descriptor
/// closest to it, lowest train index on ties. No cross-check is done.
#[derive(Debug, Clone, Copy, Default)]
pub struct HammingMatcher;

impl HammingMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Match raw descriptor lists; indices refer to positions in the slices
    pub fn match_descriptors(&self, query: &[Descriptor], train: &[Descriptor]) -> Vec<Match> {
        if query.is_empty() || train.is_empty() {
            return Vec::new();
        }

        query
            .par_iter()
            .enumerate()
            .map(|(query_idx, q)| {
                let mut best = Match { query_idx, train_idx: 0, distance: u32::MAX };
                for (train_idx, t) in train.iter().enumerate() {
                    let distance = hamming_distance(q, t);
                    if distance < best.distance {
                        best.train_idx = train_idx;
                        best.distance = distance;
                    }
                }
                best
            })
            .collect()
    }

    /// Match two feature sets by their descriptors
    pub fn match_features(&self, query: &[Feature], train: &[Feature]) -> Vec<Match> {
        let q: Vec<Descriptor> = query.iter().map(|f| f.descriptor).collect();
        let t: Vec<Descriptor> = train.iter().map(|f| f.descriptor).collect();
        let matches = self.match_descriptors(&q, &t);
        log::debug!("matched {} query features against {} train features", q.len(), t.len());
        matches
    }
}
