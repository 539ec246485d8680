use plate_core::{Feature, Match};

/// Keep the best `floor(len * keep_fraction)` matches, lowest distance first.
///
/// The sort is stable, so equal distances keep their incoming order.
/// `keep_fraction` is clamped to `[0, 1]`; NaN keeps nothing.
pub fn retain_best(matches: &[Match], keep_fraction: f32) -> Vec<Match> {
    let fraction = if keep_fraction.is_nan() { 0.0 } else { keep_fraction.clamp(0.0, 1.0) };
    // Single precision, so 10 * 0.7 is 7 and not 6.99..
    let keep = ((matches.len() as f32) * fraction).floor() as usize;

    let mut sorted = matches.to_vec();
    sorted.sort_by_key(|m| m.distance);
    sorted.truncate(keep.min(matches.len()));

    log::debug!("kept {} of {} matches (fraction {})", sorted.len(), matches.len(), fraction);
    sorted
}

/// Point pairs `(query, train)` for each match, in match order.
///
/// Matches whose indices fall outside either feature set are skipped.
pub fn correspondences(query: &[Feature], train: &[Feature], matches: &[Match]) -> (Vec<[f64; 2]>, Vec<[f64; 2]>) {
    matches
        .iter()
        .filter_map(|m| {
            let q = query.get(m.query_idx)?;
            let t = train.get(m.train_idx)?;
            Some((q.keypoint.point(), t.keypoint.point()))
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plate_core::Keypoint;
    use proptest::prelude::*;

    fn m(query_idx: usize, distance: u32) -> Match {
        Match { query_idx, train_idx: query_idx, distance }
    }

    fn feature(x: f32, y: f32) -> Feature {
        Feature { keypoint: Keypoint::new(x, y), descriptor: [0; 32] }
    }

    #[test]
    fn test_sorted_and_truncated() {
        let matches: Vec<Match> = (0..10).map(|i| m(i, (10 - i) as u32)).collect();
        let kept = retain_best(&matches, 0.35);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept.iter().map(|m| m.distance).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_floor_of_count() {
        let matches: Vec<Match> = (0..39).map(|i| m(i, 5)).collect();
        assert_eq!(retain_best(&matches, 0.1).len(), 3);
        assert!(retain_best(&matches[..9], 0.1).is_empty());
    }

    #[test]
    fn test_decimal_fractions_floor_exactly() {
        let matches: Vec<Match> = (0..10).map(|i| m(i, i as u32)).collect();
        assert_eq!(retain_best(&matches, 0.7).len(), 7);
        assert_eq!(retain_best(&matches, 0.9).len(), 9);
        assert_eq!(retain_best(&matches, 0.3).len(), 3);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let matches = vec![m(0, 4), m(1, 2), m(2, 4), m(3, 2)];
        let kept = retain_best(&matches, 1.0);
        let order: Vec<usize> = kept.iter().map(|m| m.query_idx).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_fraction_is_clamped() {
        let matches: Vec<Match> = (0..5).map(|i| m(i, i as u32)).collect();
        assert_eq!(retain_best(&matches, 2.0).len(), 5);
        assert!(retain_best(&matches, -1.0).is_empty());
        assert!(retain_best(&matches, f32::NAN).is_empty());
        assert!(retain_best(&[], 0.5).is_empty());
    }

    #[test]
    fn test_correspondences() {
        let query = vec![feature(1.0, 2.0), feature(3.0, 4.0)];
        let train = vec![feature(10.0, 20.0)];
        let matches = vec![
            Match { query_idx: 1, train_idx: 0, distance: 0 },
            Match { query_idx: 0, train_idx: 5, distance: 0 },
        ];
        let (src, dst) = correspondences(&query, &train, &matches);
        assert_eq!(src, vec![[3.0, 4.0]]);
        assert_eq!(dst, vec![[10.0, 20.0]]);
    }

    fn arb_matches() -> impl Strategy<Value = Vec<Match>> {
        prop::collection::vec(0u32..64, 0..200)
            .prop_map(|ds| ds.into_iter().enumerate().map(|(i, d)| m(i, d)).collect())
    }

    proptest! {
        #[test]
        fn prop_refilter_is_prefix(matches in arb_matches(), fraction in 0.0f32..=1.0) {
            let once = retain_best(&matches, fraction);
            let twice = retain_best(&once, fraction);
            prop_assert!(twice.len() <= once.len());
            prop_assert_eq!(&once[..twice.len()], &twice[..]);
        }

        #[test]
        fn prop_full_fraction_is_fixed_point(matches in arb_matches()) {
            let once = retain_best(&matches, 1.0);
            prop_assert_eq!(retain_best(&once, 1.0), once.clone());
            prop_assert!(once.windows(2).all(|w| w[0].distance <= w[1].distance));
        }

        #[test]
        fn prop_kept_are_the_best(matches in arb_matches(), fraction in 0.0f32..=1.0) {
            let kept = retain_best(&matches, fraction);
            if let Some(worst_kept) = kept.last() {
                let dropped = matches.len() - kept.len();
                let worse = matches.iter().filter(|m| m.distance >= worst_kept.distance).count();
                prop_assert!(worse >= dropped);
            }
        }
    }
}
