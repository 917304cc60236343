//! Single-linkage clustering within one partition
//!

use super::distance::{DistanceMetric, get_evidence_distance};
use super::partition::PositionedEvidence;
use super::union_find::UnionFind;
use crate::log_utils::debug_msg;

pub struct LinkageSettings {
    pub metric: DistanceMetric,
    pub normalizer: f64,
    pub max_distance: f64,
}

/// Cluster the members of one partition
///
/// Two members are linked when their distance is at most `max_distance`, and clusters are the
/// connected components of the resulting graph. This is the same partition produced by
/// repeatedly merging the closest pair of single-linkage clusters until no pair is within the
/// threshold.
///
/// Returned clusters are sorted by locus, and ordered by their first member.
///
pub fn cluster_partition(
    settings: &LinkageSettings,
    partition: &[PositionedEvidence],
) -> Vec<Vec<PositionedEvidence>> {
    let debug = false;

    let mut partition = partition.to_vec();
    partition.sort();

    let count = partition.len();
    let mut uf = UnionFind::new(count);
    for i in 0..count {
        for j in (i + 1)..count {
            let dist = get_evidence_distance(
                settings.metric,
                settings.normalizer,
                &partition[i].segment,
                &partition[j].segment,
            );
            if let Some(dist) = dist
                && dist <= settings.max_distance
            {
                debug_msg!(
                    debug,
                    "linking {:?} and {:?} at distance {dist}",
                    partition[i],
                    partition[j]
                );
                uf.union(i, j);
            }
        }
    }

    uf.components()
        .into_iter()
        .map(|component| component.into_iter().map(|x| partition[x]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome_segment::GenomeSegment;

    fn pe(start: i64, end: i64, evidence_index: usize) -> PositionedEvidence {
        PositionedEvidence {
            segment: GenomeSegment::new(0, start, end),
            evidence_index,
        }
    }

    fn position_settings(max_distance: f64) -> LinkageSettings {
        LinkageSettings {
            metric: DistanceMetric::Position,
            normalizer: 900.0,
            max_distance,
        }
    }

    #[test]
    fn test_two_close_deletions() {
        let partition = vec![pe(1000, 1050, 0), pe(1020, 1070, 1)];
        let clusters = cluster_partition(&position_settings(100.0), &partition);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
    }

    #[test]
    fn test_single_linkage_chain() {
        // 0-1 and 1-2 are within threshold, 0-2 is not, all three still form one cluster
        let partition = vec![pe(1000, 1000, 0), pe(1080, 1080, 1), pe(1160, 1160, 2)];
        let clusters = cluster_partition(&position_settings(100.0), &partition);
        assert_eq!(clusters.len(), 1);

        let clusters = cluster_partition(&position_settings(79.0), &partition);
        assert_eq!(clusters.len(), 3);
    }

    #[test]
    fn test_size_aware_metric_splits_different_sizes() {
        let partition = vec![pe(1000, 1100, 0), pe(1000, 3000, 1)];
        let settings = LinkageSettings {
            metric: DistanceMetric::SpanPosition,
            normalizer: 900.0,
            max_distance: 0.7,
        };
        assert_eq!(cluster_partition(&settings, &partition).len(), 2);
        assert_eq!(
            cluster_partition(&position_settings(1000.0), &partition).len(),
            1
        );
    }

    #[test]
    fn test_threshold_monotonicity() {
        let partition = (0..30)
            .map(|i| {
                let start = (i * 37 % 101) as i64 * 23;
                pe(start, start + (i % 7) as i64 * 40, i)
            })
            .collect::<Vec<_>>();

        let mut last_count = usize::MAX;
        for max_distance in [0.0, 10.0, 25.0, 50.0, 100.0, 200.0, 400.0, 5000.0] {
            let clusters = cluster_partition(&position_settings(max_distance), &partition);
            assert!(clusters.len() <= last_count);
            assert_eq!(clusters.iter().map(|x| x.len()).sum::<usize>(), 30);
            last_count = clusters.len();
        }
        assert_eq!(last_count, 1);
    }

    #[test]
    fn test_order_independence() {
        let partition = vec![
            pe(100, 150, 0),
            pe(130, 170, 1),
            pe(900, 950, 2),
            pe(400, 420, 3),
            pe(470, 480, 4),
        ];
        let mut reversed = partition.clone();
        reversed.reverse();

        let settings = position_settings(100.0);
        assert_eq!(
            cluster_partition(&settings, &partition),
            cluster_partition(&settings, &reversed)
        );
    }
}
