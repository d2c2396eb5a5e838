//! Map collaborator seam: coordinate conversions and the per-map context.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// What the core needs from the host map: the two conversions between screen
/// pixels and map coordinates, plus a read-only view description. The core
/// never mutates the map.
pub trait MapAdapter {
    fn coordinate_from_pixel(&self, pixel: Point) -> Point;
    fn pixel_from_coordinate(&self, coordinate: Point) -> Point;
    fn view(&self) -> View;
}

/// Read-only description of the map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub center: Point,
    /// Map units per pixel.
    pub resolution: f64,
    /// View rotation in radians.
    pub rotation: f64,
}

impl Default for View {
    fn default() -> Self {
        Self {
            center: Point::ZERO,
            resolution: 1.0,
            rotation: 0.0,
        }
    }
}

/// Cheap cloneable reference to a host map with reference identity.
#[derive(Clone)]
pub struct MapHandle(Rc<dyn MapAdapter>);

impl MapHandle {
    pub fn new(adapter: impl MapAdapter + 'static) -> Self {
        Self(Rc::new(adapter))
    }

    pub fn coordinate_from_pixel(&self, pixel: Point) -> Point {
        self.0.coordinate_from_pixel(pixel)
    }

    pub fn pixel_from_coordinate(&self, coordinate: Point) -> Point {
        self.0.pixel_from_coordinate(coordinate)
    }

    pub fn view(&self) -> View {
        self.0.view()
    }

    /// Whether both handles point at the same map instance.
    pub fn same(&self, other: &MapHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for MapHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MapHandle").finish()
    }
}

/// Conversion context bound to one attached map.
///
/// Rebuilt only when the attached map reference changes, never per event; it
/// flows through the signal graph as a plain value instead of being captured
/// as mutable state.
#[derive(Debug, Clone)]
pub struct MapContext {
    map: MapHandle,
    view: View,
}

impl MapContext {
    pub fn new(map: MapHandle) -> Self {
        let view = map.view();
        Self { map, view }
    }

    pub fn coordinate_from_pixel(&self, pixel: Point) -> Point {
        self.map.coordinate_from_pixel(pixel)
    }

    pub fn pixel_from_coordinate(&self, coordinate: Point) -> Point {
        self.map.pixel_from_coordinate(coordinate)
    }

    /// The view captured when the map was attached.
    pub fn view(&self) -> View {
        self.view
    }

    pub fn map(&self) -> &MapHandle {
        &self.map
    }
}

/// Rebind a context to a new map, keeping the old context when the reference
/// is unchanged.
pub fn set_map(context: Option<MapContext>, map: Option<MapHandle>) -> Option<MapContext> {
    match map {
        Some(map) => match context {
            Some(context) if context.map.same(&map) => Some(context),
            _ => Some(MapContext::new(map)),
        },
        None => None,
    }
}

/// Map where 1 map unit is 1 pixel. For headless hosts and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMap;

impl MapAdapter for IdentityMap {
    fn coordinate_from_pixel(&self, pixel: Point) -> Point {
        pixel
    }

    fn pixel_from_coordinate(&self, coordinate: Point) -> Point {
        coordinate
    }

    fn view(&self) -> View {
        View::default()
    }
}

/// Map with a uniform resolution: `coordinate = pixel * resolution`.
#[derive(Debug, Clone, Copy)]
pub struct ScaledMap {
    pub resolution: f64,
}

impl ScaledMap {
    pub fn new(resolution: f64) -> Self {
        Self { resolution }
    }
}

impl MapAdapter for ScaledMap {
    fn coordinate_from_pixel(&self, pixel: Point) -> Point {
        Point::new(pixel.x * self.resolution, pixel.y * self.resolution)
    }

    fn pixel_from_coordinate(&self, coordinate: Point) -> Point {
        Point::new(coordinate.x / self.resolution, coordinate.y / self.resolution)
    }

    fn view(&self) -> View {
        View {
            resolution: self.resolution,
            ..View::default()
        }
    }
}
