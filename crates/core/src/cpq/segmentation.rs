use crate::domain::segment::SegmentId;

/// Maps a client size onto a segment using ordered, inclusive upper bounds.
/// Bounds are evaluated low to high; sizes above the last bound fall into `overflow`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentClassifier {
    bounds: Vec<(u64, SegmentId)>,
    overflow: SegmentId,
}

impl SegmentClassifier {
    pub fn new(mut bounds: Vec<(u64, SegmentId)>, overflow: SegmentId) -> Self {
        bounds.sort_by_key(|(upper, _)| *upper);
        Self { bounds, overflow }
    }

    /// Headcount thresholds: ≤50 startups, ≤200 small, ≤1000 medium, above that large.
    pub fn workforce() -> Self {
        Self::new(
            vec![(50, SegmentId::Startups), (200, SegmentId::Small), (1_000, SegmentId::Medium)],
            SegmentId::Large,
        )
    }

    pub fn classify(&self, size: u64) -> SegmentId {
        self.bounds
            .iter()
            .find(|(upper, _)| size <= *upper)
            .map(|(_, segment)| *segment)
            .unwrap_or(self.overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::SegmentClassifier;
    use crate::domain::segment::SegmentId;

    #[test]
    fn boundaries_belong_to_the_lower_segment() {
        let classifier = SegmentClassifier::workforce();
        let cases = [
            (0, SegmentId::Startups),
            (50, SegmentId::Startups),
            (51, SegmentId::Small),
            (200, SegmentId::Small),
            (201, SegmentId::Medium),
            (1_000, SegmentId::Medium),
            (1_001, SegmentId::Large),
            (u64::MAX, SegmentId::Large),
        ];

        for (size, expected) in cases {
            assert_eq!(classifier.classify(size), expected, "size {size}");
        }
    }

    #[test]
    fn classification_is_a_non_decreasing_step_function() {
        let classifier = SegmentClassifier::workforce();
        let rank = |segment: SegmentId| match segment {
            SegmentId::Startups => 0,
            SegmentId::Small => 1,
            SegmentId::Medium => 2,
            _ => 3,
        };

        let mut previous = rank(classifier.classify(0));
        for size in 1..=1_500 {
            let current = rank(classifier.classify(size));
            assert!(current >= previous, "classification decreased at {size}");
            assert!(current - previous <= 1, "classification skipped a segment at {size}");
            previous = current;
        }
    }

    #[test]
    fn unsorted_bounds_are_normalized() {
        let classifier = SegmentClassifier::new(
            vec![(1_000, SegmentId::Medium), (50, SegmentId::Startups)],
            SegmentId::Large,
        );
        assert_eq!(classifier.classify(10), SegmentId::Startups);
        assert_eq!(classifier.classify(500), SegmentId::Medium);
    }
}
