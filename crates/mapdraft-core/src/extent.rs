//! Axis-aligned extents and their boundary segments.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned box in map coordinates.
///
/// Always normalized: `min_x <= max_x` and `min_y <= max_y`. The only way to
/// build one is [`Extent::from_points`], which takes the bounding box of two
/// arbitrary corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    rect: Rect,
}

impl Extent {
    /// Bounding box of two points, in any corner order.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            rect: Rect::from_points(a, b),
        }
    }

    pub fn min_x(&self) -> f64 {
        self.rect.x0
    }

    pub fn min_y(&self) -> f64 {
        self.rect.y0
    }

    pub fn max_x(&self) -> f64 {
        self.rect.x1
    }

    pub fn max_y(&self) -> f64 {
        self.rect.y1
    }

    pub fn width(&self) -> f64 {
        self.rect.width()
    }

    pub fn height(&self) -> f64 {
        self.rect.height()
    }

    pub fn area(&self) -> f64 {
        self.rect.area()
    }

    /// Whether the box has collapsed to a point or a line.
    pub fn is_zero_area(&self) -> bool {
        self.rect.is_zero_area()
    }

    /// The extent as a plain `kurbo::Rect`.
    pub fn as_rect(&self) -> Rect {
        self.rect
    }

    /// The 4 corners in ring order: bottom-left, top-left, top-right,
    /// bottom-right.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x(), self.min_y()),
            Point::new(self.min_x(), self.max_y()),
            Point::new(self.max_x(), self.max_y()),
            Point::new(self.max_x(), self.min_y()),
        ]
    }

    /// Closed ring for the extent overlay (first corner repeated at the end).
    pub fn polygon(&self) -> Vec<Point> {
        let [bl, tl, tr, br] = self.corners();
        vec![bl, tl, tr, br, bl]
    }

    /// The 4 boundary segments in fixed order: left, top, right, bottom.
    /// Each corner appears in exactly two segments.
    pub fn segments(&self) -> [Segment; 4] {
        let [bl, tl, tr, br] = self.corners();
        [
            Segment::new(bl, tl),
            Segment::new(tl, tr),
            Segment::new(tr, br),
            Segment::new(br, bl),
        ]
    }

    /// The corner diagonally opposite `vertex`, or `None` when `vertex` does
    /// not coincide exactly, per axis, with one of the 4 corners.
    ///
    /// Comparison is exact: snapped corners are copies of extent coordinates,
    /// not recomputed values.
    pub fn opposite_vertex(&self, vertex: Point) -> Option<Point> {
        let x = if vertex.x == self.min_x() {
            Some(self.max_x())
        } else if vertex.x == self.max_x() {
            Some(self.min_x())
        } else {
            None
        };
        let y = if vertex.y == self.min_y() {
            Some(self.max_y())
        } else if vertex.y == self.max_y() {
            Some(self.min_y())
        } else {
            None
        };
        match (x, y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }
}

/// An ordered pair of map coordinates, one side of an extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Closest point on the segment (not the infinite line) to `point`.
    pub fn closest_point(&self, point: Point) -> Point {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        if dx == 0.0 && dy == 0.0 {
            return self.start;
        }
        let t = ((point.x - self.start.x) * dx + (point.y - self.start.y) * dy)
            / (dx * dx + dy * dy);
        if t <= 0.0 {
            self.start
        } else if t >= 1.0 {
            self.end
        } else {
            Point::new(self.start.x + t * dx, self.start.y + t * dy)
        }
    }

    /// Squared distance from `point` to the segment.
    pub fn squared_distance(&self, point: Point) -> f64 {
        self.closest_point(point).distance_squared(point)
    }
}

/// The segment closest to `coordinate` by squared point-to-segment distance.
/// Ties go to the earliest segment in the list.
pub fn closest_segment(coordinate: Point, segments: &[Segment]) -> Option<&Segment> {
    let mut best: Option<(&Segment, f64)> = None;
    for segment in segments {
        let distance = segment.squared_distance(coordinate);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((segment, distance));
        }
    }
    best.map(|(segment, _)| segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_normalizes() {
        let extent = Extent::from_points(Point::new(8.0, 2.0), Point::new(3.0, 6.0));
        assert!((extent.min_x() - 3.0).abs() < f64::EPSILON);
        assert!((extent.min_y() - 2.0).abs() < f64::EPSILON);
        assert!((extent.max_x() - 8.0).abs() < f64::EPSILON);
        assert!((extent.max_y() - 6.0).abs() < f64::EPSILON);
        assert!((extent.area() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_area() {
        let point = Extent::from_points(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        assert!(point.is_zero_area());
        let line = Extent::from_points(Point::new(0.0, 5.0), Point::new(9.0, 5.0));
        assert!(line.is_zero_area());
        let box_ = Extent::from_points(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        assert!(!box_.is_zero_area());
    }

    #[test]
    fn test_segments_cover_each_corner_twice() {
        let extent = Extent::from_points(Point::new(0.0, 0.0), Point::new(10.0, 4.0));
        let segments = extent.segments();
        assert_eq!(segments.len(), 4);
        for corner in extent.corners() {
            let touching = segments
                .iter()
                .filter(|s| s.start == corner || s.end == corner)
                .count();
            assert_eq!(touching, 2, "corner {corner:?}");
        }
    }

    #[test]
    fn test_segment_order_left_top_right_bottom() {
        let extent = Extent::from_points(Point::new(1.0, 2.0), Point::new(5.0, 8.0));
        let [left, top, right, bottom] = extent.segments();
        assert!((left.start.x - 1.0).abs() < f64::EPSILON);
        assert!((left.end.x - 1.0).abs() < f64::EPSILON);
        assert!((top.start.y - 8.0).abs() < f64::EPSILON);
        assert!((top.end.y - 8.0).abs() < f64::EPSILON);
        assert!((right.start.x - 5.0).abs() < f64::EPSILON);
        assert!((right.end.x - 5.0).abs() < f64::EPSILON);
        assert!((bottom.start.y - 2.0).abs() < f64::EPSILON);
        assert!((bottom.end.y - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_opposite_vertex_for_all_corners() {
        let extent = Extent::from_points(Point::new(0.0, 0.0), Point::new(10.0, 6.0));
        let [bl, tl, tr, br] = extent.corners();
        assert_eq!(extent.opposite_vertex(bl), Some(tr));
        assert_eq!(extent.opposite_vertex(tr), Some(bl));
        assert_eq!(extent.opposite_vertex(tl), Some(br));
        assert_eq!(extent.opposite_vertex(br), Some(tl));
    }

    #[test]
    fn test_opposite_vertex_rejects_non_corners() {
        let extent = Extent::from_points(Point::new(0.0, 0.0), Point::new(10.0, 6.0));
        // Interior point.
        assert_eq!(extent.opposite_vertex(Point::new(5.0, 3.0)), None);
        // Edge midpoints share only one axis with a corner.
        assert_eq!(extent.opposite_vertex(Point::new(5.0, 0.0)), None);
        assert_eq!(extent.opposite_vertex(Point::new(10.0, 3.0)), None);
        // Outside entirely.
        assert_eq!(extent.opposite_vertex(Point::new(-1.0, -1.0)), None);
    }

    #[test]
    fn test_closest_point_clamps_to_endpoints() {
        let segment = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(segment.closest_point(Point::new(5.0, 3.0)), Point::new(5.0, 0.0));
        assert_eq!(segment.closest_point(Point::new(-4.0, 2.0)), Point::new(0.0, 0.0));
        assert_eq!(segment.closest_point(Point::new(14.0, 2.0)), Point::new(10.0, 0.0));
    }

    #[test]
    fn test_closest_segment_tie_goes_to_first() {
        let extent = Extent::from_points(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let segments = extent.segments();
        // The center is equidistant from all four sides; the left segment is
        // listed first.
        let closest = closest_segment(Point::new(5.0, 5.0), &segments).unwrap();
        assert_eq!(*closest, segments[0]);
    }

    #[test]
    fn test_polygon_ring_is_closed() {
        let extent = Extent::from_points(Point::new(0.0, 0.0), Point::new(2.0, 3.0));
        let ring = extent.polygon();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
    }

    #[test]
    fn test_extent_survives_serialization() {
        let extent = Extent::from_points(Point::new(1.5, -2.0), Point::new(4.0, 3.0));
        let json = serde_json::to_string(&extent).unwrap();
        let back: Extent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, extent);
    }
}
