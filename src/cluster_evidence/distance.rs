//! Pairwise distance metrics between evidence loci
//!

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::genome_segment::{GenomeSegment, get_segment_center_distance};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, ValueEnum)]
pub enum DistanceMetric {
    /// Distance between interval centers, in bases
    Position,

    /// Normalized center distance plus relative span difference
    #[default]
    SpanPosition,

    /// Gowda-Diday symbolic interval distance: position, span and content components
    GowdaDiday,
}

/// Relative difference of two sizes over the given denominator, defined as 0 for an empty
/// denominator
fn relative_term(numerator: i64, denominator: i64) -> f64 {
    if denominator <= 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Get the distance between two evidence loci under the selected metric
///
/// Returns None if the loci are on different chromosomes, such loci can never be linked.
///
/// # Arguments
/// * `normalizer` - Divisor applied to the position component of the size-aware metrics
///
pub fn get_evidence_distance(
    metric: DistanceMetric,
    normalizer: f64,
    a: &GenomeSegment,
    b: &GenomeSegment,
) -> Option<f64> {
    let center_distance = get_segment_center_distance(a, b)?;
    let (ra, rb) = (&a.range, &b.range);
    let dist = match metric {
        DistanceMetric::Position => center_distance as f64,
        DistanceMetric::SpanPosition => {
            let position_dist = center_distance as f64 / normalizer;
            let span_dist = relative_term(
                (ra.size() - rb.size()).abs(),
                std::cmp::max(ra.size(), rb.size()),
            );
            position_dist + span_dist
        }
        DistanceMetric::GowdaDiday => {
            let union_span = ra.union_size(rb);
            let position_dist = (ra.start - rb.start).abs() as f64 / normalizer;
            let span_dist = relative_term((ra.size() - rb.size()).abs(), union_span);
            let content_dist =
                relative_term(ra.size() + rb.size() - 2 * ra.overlap_size(rb), union_span);
            position_dist + span_dist + content_dist
        }
    };
    Some(dist)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_position_distance() {
        let a = GenomeSegment::new(0, 1000, 1050);
        let b = GenomeSegment::new(0, 1020, 1070);
        let d = get_evidence_distance(DistanceMetric::Position, 900.0, &a, &b).unwrap();
        assert_abs_diff_eq!(d, 20.0);
    }

    #[test]
    fn test_different_chromosomes() {
        let a = GenomeSegment::new(0, 1000, 1050);
        let b = GenomeSegment::new(1, 1000, 1050);
        for metric in [
            DistanceMetric::Position,
            DistanceMetric::SpanPosition,
            DistanceMetric::GowdaDiday,
        ] {
            assert_eq!(get_evidence_distance(metric, 900.0, &a, &b), None);
        }
    }

    #[test]
    fn test_span_position_distance() {
        let a = GenomeSegment::new(0, 1000, 1100);
        let b = GenomeSegment::new(0, 1000, 1300);
        // centers 1050 and 1150, spans 100 and 300
        let d = get_evidence_distance(DistanceMetric::SpanPosition, 900.0, &a, &b).unwrap();
        assert_abs_diff_eq!(d, 100.0 / 900.0 + 200.0 / 300.0, epsilon = 1e-12);

        // Identical loci
        let d = get_evidence_distance(DistanceMetric::SpanPosition, 900.0, &a, &a).unwrap();
        assert_abs_diff_eq!(d, 0.0);
    }

    #[test]
    fn test_span_position_empty_spans() {
        let a = GenomeSegment::new(0, 5000, 5000);
        let b = GenomeSegment::new(0, 5090, 5090);
        let d = get_evidence_distance(DistanceMetric::SpanPosition, 900.0, &a, &b).unwrap();
        assert_abs_diff_eq!(d, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_gowda_diday_distance() {
        let a = GenomeSegment::new(0, 1000, 1100);
        let b = GenomeSegment::new(0, 1050, 1250);
        // union span 250, overlap 50
        let d = get_evidence_distance(DistanceMetric::GowdaDiday, 1000.0, &a, &b).unwrap();
        let expected = 50.0 / 1000.0 + 100.0 / 250.0 + (300.0 - 100.0) / 250.0;
        assert_abs_diff_eq!(d, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_symmetry() {
        let a = GenomeSegment::new(0, 1000, 1100);
        let b = GenomeSegment::new(0, 1400, 2250);
        for metric in [
            DistanceMetric::Position,
            DistanceMetric::SpanPosition,
            DistanceMetric::GowdaDiday,
        ] {
            let ab = get_evidence_distance(metric, 900.0, &a, &b).unwrap();
            let ba = get_evidence_distance(metric, 900.0, &b, &a).unwrap();
            assert_abs_diff_eq!(ab, ba, epsilon = 1e-12);
        }
    }
}
