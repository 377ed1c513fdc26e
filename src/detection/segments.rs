use std::f32::consts::PI;

use crate::models::LineSegment;

/// Keeps mid-length, roughly horizontal segments, ordered top to bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentFilter {
    /// Exclusive lower bound on segment length in pixels
    pub min_length: f32,
    /// Exclusive upper bound on segment length in pixels
    pub max_length: f32,
    /// Largest deviation from horizontal, in radians
    pub max_tilt: f32,
}

impl Default for SegmentFilter {
    fn default() -> Self {
        Self {
            min_length: 25.0,
            max_length: 65.0,
            max_tilt: 0.6,
        }
    }
}

impl SegmentFilter {
    pub fn accepts(&self, seg: &LineSegment) -> bool {
        let len = seg.length();
        if len <= self.min_length || len >= self.max_length {
            return false;
        }
        // Fold the direction onto [0, π) so both drawing orders compare alike
        let angle = seg.angle() % PI;
        let tilt = angle.min(PI - angle);
        tilt < self.max_tilt
    }

    pub fn apply(&self, segments: &[LineSegment]) -> Vec<LineSegment> {
        let mut kept: Vec<LineSegment> = segments.iter().filter(|s| self.accepts(s)).copied().collect();
        kept.sort_by_key(|s| s.y1);
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_horizontal_mid_length() {
        let filter = SegmentFilter::default();
        assert!(filter.accepts(&LineSegment::new(0, 10, 40, 10)));
        assert!(filter.accepts(&LineSegment::new(40, 10, 0, 10)));
        assert!(filter.accepts(&LineSegment::new(0, 10, 40, 20)));
    }

    #[test]
    fn test_rejects_by_length() {
        let filter = SegmentFilter::default();
        assert!(!filter.accepts(&LineSegment::new(0, 0, 20, 0)));
        assert!(!filter.accepts(&LineSegment::new(0, 0, 25, 0)));
        assert!(!filter.accepts(&LineSegment::new(0, 0, 80, 0)));
    }

    #[test]
    fn test_rejects_steep_segments() {
        let filter = SegmentFilter::default();
        assert!(!filter.accepts(&LineSegment::new(10, 0, 10, 40)));
        assert!(!filter.accepts(&LineSegment::new(0, 0, 30, 30)));
    }

    #[test]
    fn test_apply_sorts_by_y() {
        let filter = SegmentFilter::default();
        let segments = vec![
            LineSegment::new(0, 90, 40, 90),
            LineSegment::new(0, 5, 5, 200),
            LineSegment::new(0, 12, 40, 12),
            LineSegment::new(0, 50, 40, 52),
        ];

        let kept = filter.apply(&segments);

        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].y1, 12);
        assert_eq!(kept[1].y1, 50);
        assert_eq!(kept[2].y1, 90);
    }
}
