//! Pixel-tolerance snapping of a pointer position onto an extent boundary.

use crate::event::PointerEvent;
use crate::extent::{closest_segment, Segment};

/// Snap tolerance in pixels when the host supplies none.
pub const DEFAULT_PIXEL_TOLERANCE: f64 = 10.0;

/// Snap a pointer position onto the nearest boundary segment.
///
/// The closest segment is picked by distance in map coordinates; whether the
/// pointer is close enough is decided in pixel space, so the editing feel
/// does not change with zoom. Within a successful edge check, an endpoint
/// within the same tolerance of the snapped point wins over the edge
/// interior, ties going to the segment start.
///
/// Returns the snapped map coordinate, or `None` when the pointer is farther
/// than `pixel_tolerance` from every segment.
pub fn snap_to_extent(
    event: &PointerEvent,
    segments: &[Segment],
    pixel_tolerance: f64,
) -> Option<kurbo::Point> {
    let segment = closest_segment(event.coordinate, segments)?;
    let vertex = segment.closest_point(event.coordinate);
    let vertex_pixel = event.map.pixel_from_coordinate(vertex);

    if event.pixel.distance(vertex_pixel) > pixel_tolerance {
        return None;
    }

    let start_pixel = event.map.pixel_from_coordinate(segment.start);
    let end_pixel = event.map.pixel_from_coordinate(segment.end);
    let to_start = vertex_pixel.distance_squared(start_pixel);
    let to_end = vertex_pixel.distance_squared(end_pixel);

    if to_start.min(to_end).sqrt() <= pixel_tolerance {
        if to_start > to_end {
            Some(segment.end)
        } else {
            Some(segment.start)
        }
    } else {
        Some(vertex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PointerEventType;
    use crate::extent::Extent;
    use crate::map::{IdentityMap, MapHandle, ScaledMap};
    use kurbo::Point;

    fn move_event(map: &MapHandle, pixel: Point) -> PointerEvent {
        PointerEvent::new(PointerEventType::PointerMove, pixel, map.clone())
    }

    #[test]
    fn test_edge_snap_at_midpoint() {
        let map = MapHandle::new(IdentityMap);
        let extent = Extent::from_points(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let event = move_event(&map, Point::new(10.0, 5.0));
        // 5 units from both corners of the right edge: edge snap, not vertex.
        let snapped = snap_to_extent(&event, &extent.segments(), 1.0);
        assert_eq!(snapped, Some(Point::new(10.0, 5.0)));
    }

    #[test]
    fn test_vertex_snap_wins_near_corner() {
        let map = MapHandle::new(IdentityMap);
        let extent = Extent::from_points(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let event = move_event(&map, Point::new(10.0, 0.5));
        let snapped = snap_to_extent(&event, &extent.segments(), 1.0);
        assert_eq!(snapped, Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn test_no_snap_beyond_tolerance() {
        let map = MapHandle::new(IdentityMap);
        let extent = Extent::from_points(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let event = move_event(&map, Point::new(15.0, 5.0));
        assert_eq!(snap_to_extent(&event, &extent.segments(), 1.0), None);
    }

    #[test]
    fn test_edge_point_pulled_onto_boundary() {
        let map = MapHandle::new(IdentityMap);
        let extent = Extent::from_points(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        // Just off the right edge, mid-height.
        let event = move_event(&map, Point::new(10.6, 5.0));
        let snapped = snap_to_extent(&event, &extent.segments(), 1.0);
        assert_eq!(snapped, Some(Point::new(10.0, 5.0)));
    }

    #[test]
    fn test_tolerance_is_measured_in_pixels() {
        // 1 pixel = 2 map units: a 3-map-unit miss is only 1.5 pixels.
        let map = MapHandle::new(ScaledMap::new(2.0));
        let extent = Extent::from_points(Point::new(0.0, 0.0), Point::new(20.0, 20.0));
        let event = PointerEvent::new(
            PointerEventType::PointerMove,
            Point::new(11.5, 5.0),
            map.clone(),
        );
        assert_eq!(event.coordinate, Point::new(23.0, 10.0));
        assert_eq!(snap_to_extent(&event, &extent.segments(), 1.0), None);
        let snapped = snap_to_extent(&event, &extent.segments(), 2.0);
        assert_eq!(snapped, Some(Point::new(20.0, 10.0)));
    }

    #[test]
    fn test_equidistant_endpoints_snap_to_segment_start() {
        let map = MapHandle::new(IdentityMap);
        let segments = [Segment::new(Point::new(0.0, 0.0), Point::new(2.0, 0.0))];
        let event = move_event(&map, Point::new(1.0, 0.0));
        let snapped = snap_to_extent(&event, &segments, 5.0);
        assert_eq!(snapped, Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_no_segments_means_no_snap() {
        let map = MapHandle::new(IdentityMap);
        let event = move_event(&map, Point::new(1.0, 1.0));
        assert_eq!(snap_to_extent(&event, &[], 10.0), None);
    }
}
