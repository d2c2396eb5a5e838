//! Drag handlers: closures that turn a pointer coordinate into a new extent.

use crate::extent::Extent;
use kurbo::Point;

/// Rebuilds the extent for a pointer coordinate during a drag. `None` means
/// the drag cannot produce an extent in this configuration.
pub type DragHandler = Box<dyn Fn(Point) -> Option<Extent>>;

/// Handler keeping `anchor` fixed: the extent is the bounding box of the
/// anchor and the pointer.
pub fn point_handler(anchor: Point) -> DragHandler {
    Box::new(move |coordinate| Some(Extent::from_points(anchor, coordinate)))
}

/// Handler for dragging the edge opposite the fixed edge `a`-`b`.
///
/// The anchors must share exactly one axis. A shared x means the fixed edge
/// is vertical and the pointer moves the opposite vertical edge; a shared y
/// is the horizontal case. Anchors sharing neither axis yield a handler that
/// always returns `None`.
pub fn edge_handler(a: Point, b: Point) -> DragHandler {
    if a.x == b.x {
        Box::new(move |coordinate| {
            Some(Extent::from_points(a, Point::new(coordinate.x, b.y)))
        })
    } else if a.y == b.y {
        Box::new(move |coordinate| {
            Some(Extent::from_points(a, Point::new(b.x, coordinate.y)))
        })
    } else {
        Box::new(|_| None)
    }
}

/// Pick the handler for a press at `coordinate`.
///
/// With an extent and a snapped `vertex` on its boundary, a corner grab
/// anchors the diagonally opposite corner and an edge grab anchors the
/// opposite edge. Without either, the press starts a fresh box anchored at
/// `coordinate`.
pub fn drag_handler(
    extent: Option<&Extent>,
    vertex: Option<Point>,
    coordinate: Point,
) -> DragHandler {
    match (extent, vertex) {
        (Some(extent), Some(vertex)) => {
            classify(extent, vertex).unwrap_or_else(|| point_handler(coordinate))
        }
        _ => point_handler(coordinate),
    }
}

fn classify(extent: &Extent, vertex: Point) -> Option<DragHandler> {
    let on_x = vertex.x == extent.min_x() || vertex.x == extent.max_x();
    let on_y = vertex.y == extent.min_y() || vertex.y == extent.max_y();

    if on_x && on_y {
        let anchor = extent.opposite_vertex(vertex)?;
        Some(point_handler(anchor))
    } else if on_x {
        let opposite_x = if vertex.x == extent.min_x() {
            extent.max_x()
        } else {
            extent.min_x()
        };
        Some(edge_handler(
            Point::new(opposite_x, extent.min_y()),
            Point::new(opposite_x, extent.max_y()),
        ))
    } else if on_y {
        let opposite_y = if vertex.y == extent.min_y() {
            extent.max_y()
        } else {
            extent.min_y()
        };
        Some(edge_handler(
            Point::new(extent.min_x(), opposite_y),
            Point::new(extent.max_x(), opposite_y),
        ))
    } else {
        None
    }
}
