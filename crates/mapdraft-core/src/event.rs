//! Pointer events delivered by the host.

use crate::map::MapHandle;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four pointer event types the editor consumes. Any other host event is
/// simply not delivered to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerEventType {
    PointerMove,
    PointerDown,
    PointerDrag,
    PointerUp,
}

/// One pointer event: a screen position, its map-space counterpart and the
/// map it happened on.
#[derive(Clone)]
pub struct PointerEvent {
    pub event_type: PointerEventType,
    /// Screen-space position.
    pub pixel: Point,
    /// Map-space position.
    pub coordinate: Point,
    pub map: MapHandle,
}

impl PointerEvent {
    /// Build an event from a pixel position, deriving the coordinate through
    /// the map.
    pub fn new(event_type: PointerEventType, pixel: Point, map: MapHandle) -> Self {
        let coordinate = map.coordinate_from_pixel(pixel);
        Self {
            event_type,
            pixel,
            coordinate,
            map,
        }
    }

    /// Build an event with both positions supplied by the host.
    pub fn with_coordinate(
        event_type: PointerEventType,
        pixel: Point,
        coordinate: Point,
        map: MapHandle,
    ) -> Self {
        Self {
            event_type,
            pixel,
            coordinate,
            map,
        }
    }
}

impl fmt::Debug for PointerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerEvent")
            .field("event_type", &self.event_type)
            .field("pixel", &self.pixel)
            .field("coordinate", &self.coordinate)
            .finish_non_exhaustive()
    }
}
