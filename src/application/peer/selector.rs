//! Size-adjacent peer selection.

use std::cmp::Ordering;

use crate::domain::{InstitutionId, PeerCohort, SizePoint};

/// Select up to `n` closest larger and `n` closest smaller peers.
///
/// Institutions whose size equals the target's exactly land on neither
/// side. Non-finite sizes never qualify. Equal sizes on one side are
/// ordered by institution id so selection is reproducible.
#[must_use]
pub fn select_peers(
    population: &[SizePoint],
    target: &InstitutionId,
    target_size: f64,
    n: usize,
) -> PeerCohort {
    if !target_size.is_finite() || n == 0 {
        return PeerCohort::default();
    }

    let mut larger: Vec<&SizePoint> = Vec::new();
    let mut smaller: Vec<&SizePoint> = Vec::new();
    for point in population {
        if &point.institution_id == target || !point.size.is_finite() {
            continue;
        }
        match point.size.total_cmp(&target_size) {
            Ordering::Greater => larger.push(point),
            Ordering::Less => smaller.push(point),
            Ordering::Equal => {}
        }
    }

    larger.sort_by(|a, b| {
        a.size
            .total_cmp(&b.size)
            .then_with(|| a.institution_id.cmp(&b.institution_id))
    });
    smaller.sort_by(|a, b| {
        b.size
            .total_cmp(&a.size)
            .then_with(|| a.institution_id.cmp(&b.institution_id))
    });

    PeerCohort {
        larger: larger
            .into_iter()
            .take(n)
            .map(|p| p.institution_id.clone())
            .collect(),
        smaller: smaller
            .into_iter()
            .take(n)
            .map(|p| p.institution_id.clone())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn population(sizes: &[(&str, f64)]) -> Vec<SizePoint> {
        sizes.iter().map(|&(id, size)| SizePoint::new(id, size)).collect()
    }

    fn ids(list: &[InstitutionId]) -> Vec<&str> {
        list.iter().map(InstitutionId::as_str).collect()
    }

    #[test]
    fn picks_closest_on_each_side() {
        let pop = population(&[
            ("t", 100.0),
            ("l1", 110.0),
            ("l2", 150.0),
            ("l3", 300.0),
            ("s1", 95.0),
            ("s2", 50.0),
            ("s3", 10.0),
        ]);
        let cohort = select_peers(&pop, &"t".into(), 100.0, 2);
        assert_eq!(ids(&cohort.larger), vec!["l1", "l2"]);
        assert_eq!(ids(&cohort.smaller), vec!["s1", "s2"]);
    }

    #[test]
    fn twelve_each_side_truncates_to_ten() {
        let mut pop = vec![SizePoint::new("t", 1000.0)];
        for i in 1..=12 {
            pop.push(SizePoint::new(format!("big{i:02}"), 1000.0 + i as f64));
            pop.push(SizePoint::new(format!("small{i:02}"), 1000.0 - i as f64));
        }

        let target = InstitutionId::new("t");
        let cohort = select_peers(&pop, &target, 1000.0, 10);
        assert_eq!(cohort.larger.len(), 10);
        assert_eq!(cohort.smaller.len(), 10);
        assert!(!cohort.contains(&target));
        assert_eq!(cohort.larger.first().unwrap().as_str(), "big01");
        assert_eq!(cohort.smaller.first().unwrap().as_str(), "small01");
        assert_eq!(cohort.larger.last().unwrap().as_str(), "big10");
    }

    #[test]
    fn short_side_is_not_padded() {
        let mut pop = vec![SizePoint::new("t", 500.0), SizePoint::new("big", 900.0)];
        for i in 1..=15 {
            pop.push(SizePoint::new(format!("s{i:02}"), 500.0 - i as f64));
        }

        let cohort = select_peers(&pop, &"t".into(), 500.0, 10);
        assert_eq!(ids(&cohort.larger), vec!["big"]);
        assert_eq!(cohort.smaller.len(), 10);
        assert_eq!(cohort.len(), 11);
    }

    #[test]
    fn exact_size_ties_are_excluded_from_both_sides() {
        let pop = population(&[("t", 100.0), ("twin", 100.0), ("up", 120.0), ("down", 80.0)]);
        let twin = InstitutionId::new("twin");
        let cohort = select_peers(&pop, &"t".into(), 100.0, 10);
        assert!(!cohort.contains(&twin));
        assert_eq!(ids(&cohort.larger), vec!["up"]);
        assert_eq!(ids(&cohort.smaller), vec!["down"]);
    }

    #[test]
    fn target_is_excluded_even_with_a_different_reported_size() {
        let pop = population(&[("t", 200.0), ("a", 150.0)]);
        let target = InstitutionId::new("t");
        let cohort = select_peers(&pop, &target, 100.0, 10);
        assert!(!cohort.contains(&target));
        assert_eq!(ids(&cohort.larger), vec!["a"]);
    }

    #[test]
    fn empty_population_gives_empty_cohort() {
        let cohort = select_peers(&[], &"t".into(), 100.0, 10);
        assert!(cohort.is_empty());
    }

    #[test]
    fn non_finite_sizes_never_qualify() {
        let pop = population(&[("nan", f64::NAN), ("inf", f64::INFINITY), ("ok", 50.0)]);
        let cohort = select_peers(&pop, &"t".into(), 100.0, 10);
        assert!(cohort.larger.is_empty());
        assert_eq!(ids(&cohort.smaller), vec!["ok"]);

        let none = select_peers(&pop, &"t".into(), f64::NAN, 10);
        assert!(none.is_empty());
    }

    #[test]
    fn equal_sizes_on_one_side_order_by_id() {
        let pop = population(&[("c", 120.0), ("a", 120.0), ("b", 120.0)]);
        let cohort = select_peers(&pop, &"t".into(), 100.0, 2);
        assert_eq!(ids(&cohort.larger), vec!["a", "b"]);
    }
}
